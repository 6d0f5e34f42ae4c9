#![doc(hidden)]

use anyhow::Error;
use teloxide::dispatching::DpHandlerDescription;
use teloxide::prelude::*;

pub(crate) type HandlerResult = Result<(), Error>;
pub(crate) type TeloxideHandler =
    Handler<'static, DependencyMap, HandlerResult, DpHandlerDescription>;

#[async_trait]
pub(crate) trait Module: Send {
    async fn register_dependency(&mut self, dep_map: &mut DependencyMap) -> Result<(), Error>;

    fn handler_chain(&self) -> TeloxideHandler {
        dptree::entry()
    }
}

pub(crate) struct ModuleManager {
    modules: Vec<Box<dyn Module + 'static>>,
}

impl ModuleManager {
    pub fn new() -> Self {
        Self { modules: vec![] }
    }

    pub fn register_module<M>(&mut self, module: M)
    where
        M: Module + 'static,
    {
        self.modules.push(Box::new(module));
    }

    pub fn handler_chains(&self) -> impl Iterator<Item = TeloxideHandler> + '_ {
        self.modules.iter().map(|module| module.handler_chain())
    }

    /// Lets every module insert its dependencies, in registration order.
    pub async fn register_dependencies(&mut self, dep_map: &mut DependencyMap) -> Result<(), Error> {
        for module in self.modules.iter_mut() {
            module.register_dependency(dep_map).await?;
        }
        Ok(())
    }
}
