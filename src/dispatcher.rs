use anyhow::Error;
use teloxide::dispatching::DefaultKey;
use teloxide::prelude::*;

use crate::module_mgr::{HandlerResult, ModuleManager};

pub(crate) type TeloxideDispatcher = Dispatcher<Bot, Error, DefaultKey>;

async fn message_filter(msg: Message) -> bool {
    let from = msg
        .from()
        .map(|u| {
            let full_name = u.full_name();
            if full_name.is_empty() {
                u.id.to_string()
            } else {
                full_name
            }
        })
        .unwrap_or("<unknown>".to_owned());

    if let Some(text) = msg.text() {
        info!("{} sent a message: {}", from, text);
    } else if msg.voice().is_some() {
        info!("{} sent a voice message", from);
    } else {
        info!("{} sent a message: {:#?}", from, msg.kind);
    }

    true
}

async fn default_handler(msg: Message) -> HandlerResult {
    warn!("Message ({}) is not handled!", msg.id);
    Ok(())
}

/// Builds the dispatcher from the registered modules.
///
/// Updates are distributed by chat id: different chats are served
/// concurrently while the messages of one chat are answered one by one.
pub(crate) fn build_dispatcher(
    bot: Bot,
    module_mgr: &ModuleManager,
    dep_map: DependencyMap,
) -> TeloxideDispatcher {
    let biz_handler = module_mgr
        .handler_chains()
        .fold(dptree::entry(), |handler, chain| handler.branch(chain))
        .branch(dptree::endpoint(default_handler));
    let handler = Update::filter_message()
        .chain(dptree::filter_async(message_filter))
        .chain(biz_handler);

    Dispatcher::builder(bot, handler)
        .dependencies(dep_map)
        .enable_ctrlc_handler()
        .build()
}
