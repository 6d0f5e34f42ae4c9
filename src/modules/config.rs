use anyhow::Error;
use teloxide::prelude::*;

use crate::{config::SharedConfig, module_mgr::Module};

pub(crate) struct Config {
    config: Option<SharedConfig>,
}

impl Config {
    pub(crate) fn new(config: SharedConfig) -> Self {
        Self {
            config: Some(config),
        }
    }
}

#[async_trait]
impl Module for Config {
    async fn register_dependency(&mut self, dep_map: &mut DependencyMap) -> Result<(), Error> {
        let config = self
            .config
            .take()
            .ok_or_else(|| anyhow!("Config is already registered"))?;
        config.validate()?;

        info!(
            "Chat model: {}, speech: {}",
            config.openai_gpt_model,
            if config.enable_speech {
                config.speech_model.as_str()
            } else {
                "disabled"
            }
        );
        dep_map.insert(config);
        Ok(())
    }
}
