pub(crate) mod config;
pub(crate) mod openai;
pub(crate) mod plain;
pub(crate) mod tutor;
