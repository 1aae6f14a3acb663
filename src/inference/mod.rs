mod engine;
mod error;
mod retriever;

pub(crate) use engine::{Answer, Engine};
pub(crate) use error::QueryEngineError;
pub(crate) use retriever::Retriever;
