use parse_wiki_text::{DefinitionListItem, DefinitionListItemType};

use super::{
    nodes::{nodes_to_string, ParseResult},
    Regexes,
};

/// Terms and their details render as `term: details` lines.
pub(super) fn definition_list_items_to_string(
    definition_list_items: &[DefinitionListItem<'_>],
    regexes: &Regexes,
) -> ParseResult {
    let mut lines: Vec<String> = vec![];
    let mut pending_term: Option<String> = None;
    for DefinitionListItem { type_, nodes, .. } in definition_list_items.iter() {
        let text = nodes_to_string(nodes, regexes)?.trim().to_string();
        match type_ {
            DefinitionListItemType::Term => {
                if let Some(term) = pending_term.replace(text) {
                    lines.push(term);
                }
            }
            DefinitionListItemType::Details => match pending_term.take() {
                Some(term) => lines.push(format!("{term}: {text}")),
                None => lines.push(text),
            },
        }
    }
    if let Some(term) = pending_term {
        lines.push(term);
    }
    Ok(format!("\n{}\n", lines.join("\n")))
}
