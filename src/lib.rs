//! A Telegram language tutor bot.
//!
//! tutorbot is a Telegram bot based on [`teloxide`](https://docs.rs/teloxide/latest/teloxide/)
//! framework and [`async_openai`](https://docs.rs/async-openai/latest/async_openai/). It
//! answers text and voice messages as a friendly tutor, correcting grammar along the way,
//! and sends a spoken rendition of every answer.
//!
//! ## Getting Started
//!
//! ### Using via CLI
//!
//! Export the credentials and run the binary:
//!
//! ```shell
//! $ export TELEGRAM_TOKEN=8888888888:XXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX
//! $ export OPENAI_API_KEY=sk-xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx
//! $ /path/to/tutorbot -c your_config.json
//! ```
//!
//! The configuration file is optional and is described in [`config`] module. Passing
//! `--mode plain` turns the bot into a bare chat relay without persona and voice support.
//!
//! ### Using via library
//!
//! The bot can also be run along with your code in the same process. Checkout the
//! [`app`] module to learn more about it.

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate async_trait;

pub mod app;
pub mod config;
mod dispatcher;
mod message;
mod module_mgr;
mod modules;
mod pipeline;
#[cfg(test)]
mod test_support;
mod transport;
mod utils;
