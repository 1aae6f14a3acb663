mod deflist;
mod listitems;
mod nodes;
mod regexes;
mod tables;
mod template_params;

pub(super) use nodes::process_to_article;
pub(crate) use regexes::Regexes;
