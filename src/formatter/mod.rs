mod document;
mod provenance;

pub(crate) use document::TextFormatter;
pub(crate) use provenance::Provenance;
