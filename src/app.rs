//! Entry point for running the bot in-process.
//!
//! ```no_run
//! # async fn example() -> Result<(), anyhow::Error> {
//! use tutorbot_core::{app, config::{Config, SharedConfig}};
//!
//! let config = Config::load(None)?;
//! app::run(SharedConfig::new(config)).await;
//! # Ok(())
//! # }
//! ```

use anyhow::Error;
use teloxide::prelude::*;

use crate::{
    config::{BotMode, Config, SharedConfig},
    dispatcher::build_dispatcher,
    module_mgr::ModuleManager,
    modules::{openai::OpenAI, plain::Plain, tutor::Tutor},
};

async fn init_bot(config: &Config) -> Result<Bot, Error> {
    let bot = Bot::new(&config.telegram_bot_token);
    let me = bot.get_me().await?;
    info!("Logged in as @{}", me.username());

    if config.drop_pending_updates {
        bot.delete_webhook().drop_pending_updates(true).await?;
        debug!("Pending updates are dropped");
    }
    Ok(bot)
}

fn init_modules(config: &SharedConfig) -> ModuleManager {
    let mut module_mgr = ModuleManager::new();
    module_mgr.register_module(crate::modules::config::Config::new(config.clone()));
    module_mgr.register_module(OpenAI);
    match config.mode {
        BotMode::Tutor => module_mgr.register_module(Tutor),
        BotMode::Plain => module_mgr.register_module(Plain),
    }
    module_mgr
}

/// Runs the bot until it is interrupted with Ctrl-C. Startup failures are
/// logged and make this function return early.
pub async fn run(config: SharedConfig) {
    debug!("Initializing modules...");
    let mut module_mgr = init_modules(&config);
    let mut dep_map = DependencyMap::new();
    if let Err(err) = module_mgr.register_dependencies(&mut dep_map).await {
        error!("Failed to init modules: {}", err);
        return;
    }

    info!("Initializing bot...");
    let bot = match init_bot(&config).await {
        Ok(bot) => bot,
        Err(err) => {
            error!("Failed to init bot: {}", err);
            return;
        }
    };

    let mut built_dispatcher = build_dispatcher(bot, &module_mgr, dep_map);
    info!("Bot is started in {:?} mode!", config.mode);
    built_dispatcher.dispatch().await;
}
