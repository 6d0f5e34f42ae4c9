#![doc(hidden)]

pub(crate) mod retry;
pub(crate) mod scratch;

pub(crate) use retry::RetryPolicy;
pub(crate) use scratch::ScratchDir;
