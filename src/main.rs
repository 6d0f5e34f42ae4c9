#[macro_use]
extern crate log;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tutorbot_core::{
    app,
    config::{BotMode, Config, SharedConfig},
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Tutor,
    Plain,
}

impl From<Mode> for BotMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Tutor => BotMode::Tutor,
            Mode::Plain => BotMode::Plain,
        }
    }
}

/// A Telegram language tutor bot.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the JSON config file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Overrides the `mode` set in the config file.
    #[arg(long, value_enum)]
    mode: Option<Mode>,
}

fn init_logger() {
    let mut builder = pretty_env_logger::formatted_timed_builder();
    builder.filter_level(log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let dotenv = dotenvy::dotenv();
    init_logger();

    if let Ok(path) = dotenv {
        debug!("Loaded environment from {}", path.display());
    }

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            error!("Failed to load config: {}", err);
            std::process::exit(1);
        }
    };
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }

    info!("Bot is starting...");
    app::run(SharedConfig::new(config)).await;
}
