use parse_wiki_text::{Node, Parameter};

use super::{
    nodes::{nodes_to_string, ParseResult},
    Regexes,
};

pub(super) fn refn_parameters_to_string(
    parameters: &[Parameter<'_>],
    regexes: &Regexes,
) -> ParseResult {
    let mut documents = vec![];
    for p in parameters.iter() {
        documents.push(refn_parameter_to_string(p, regexes)?)
    }
    Ok(documents.join(""))
}

pub(super) fn refn_parameter_to_string(
    Parameter { value, .. }: &Parameter<'_>,
    regexes: &Regexes,
) -> ParseResult {
    nodes_to_string(value, regexes)
}

/// Travel listings (`{{see|name=...|content=...}}`) become `name: content`.
pub(super) fn listing_to_string(parameters: &[Parameter<'_>], regexes: &Regexes) -> ParseResult {
    let name = named_parameter(parameters, "name", regexes)?;
    let content = named_parameter(parameters, "content", regexes)?;
    let listing = match (name, content) {
        (Some(name), Some(content)) => format!("{name}: {content}"),
        (Some(name), None) => name,
        (None, Some(content)) => content,
        (None, None) => String::new(),
    };
    Ok(listing)
}

fn named_parameter(
    parameters: &[Parameter<'_>],
    wanted: &str,
    regexes: &Regexes,
) -> Result<Option<String>, super::super::WikiMarkupProcessingError> {
    for Parameter { name, value, .. } in parameters.iter() {
        if let Some(name) = name {
            if parameter_name(name, regexes)? == wanted {
                let value = nodes_to_string(value, regexes)?;
                let value = value.trim();
                return Ok((!value.is_empty()).then(|| value.to_string()));
            }
        }
    }
    Ok(None)
}

fn parameter_name(name: &[Node<'_>], regexes: &Regexes) -> ParseResult {
    Ok(nodes_to_string(name, regexes)?.trim().to_lowercase())
}
