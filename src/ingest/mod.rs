pub(crate) mod download;
pub(crate) mod pipeline;

pub(crate) use pipeline::RetrievalResult;
