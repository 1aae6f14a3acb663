use parse_wiki_text::Node;

use super::{
    deflist::definition_list_items_to_string,
    listitems::{ordered_list_items_to_string, unordered_list_items_to_string},
    tables::table_to_string,
    template_params::{listing_to_string, refn_parameters_to_string},
    Regexes,
};
use crate::ingest::pipeline::wikipedia::markup_processor::WikiMarkupProcessingError;

pub(crate) const STOP_PHRASES: [&str; 6] = [
    "References",
    "Bibliography",
    "See also",
    "Further reading",
    "External links",
    "Notes and references",
];

/// Extension tags whose content is prose rather than metadata.
const TRANSPARENT_TAGS: [&str; 2] = ["nowiki", "poem"];

pub(crate) type ParseResult = Result<String, WikiMarkupProcessingError>;

pub(crate) fn process_to_article(nodes: &[Node<'_>], regexes: &Regexes) -> ParseResult {
    let mut documents = vec![];
    for n in nodes.iter() {
        if let Node::Heading {
            nodes: heading_nodes,
            ..
        } = n
        {
            let heading_name = nodes_to_string(heading_nodes, regexes)?;

            if STOP_PHRASES.contains(&heading_name.trim()) {
                break;
            }
        }

        documents.push(node_to_string(n, regexes)?);
    }

    Ok(regexes.tidy(&documents.join("")))
}

pub(super) fn nodes_to_string(nodes: &[Node<'_>], regexes: &Regexes) -> ParseResult {
    let mut documents = vec![];
    for n in nodes.iter() {
        documents.push(node_to_string(n, regexes)?);
    }
    Ok(documents.join(""))
}

pub(super) fn node_to_string(node: &Node<'_>, regexes: &Regexes) -> ParseResult {
    match node {
        Node::Bold { .. } => Ok(String::new()),
        Node::BoldItalic { .. } => Ok(String::new()),
        Node::Comment { .. } => Ok(String::new()),
        Node::HorizontalDivider { .. } => Ok(String::new()),
        Node::Italic { .. } => Ok(String::new()),
        Node::MagicWord { .. } => Ok(String::new()),
        Node::Category { .. } => Ok(String::new()),
        Node::Redirect { .. } => Ok(String::new()),
        Node::EndTag { .. } => Ok(String::new()),
        Node::StartTag { .. } => Ok(String::new()),
        Node::Image { .. } => Ok(String::new()),
        Node::ParagraphBreak { .. } => Ok(String::from("\n\n")),
        Node::Heading { nodes, level, .. } => {
            let heading = nodes_to_string(nodes, regexes)?;
            let marker = "=".repeat(*level as usize);
            Ok(format!("\n\n{marker} {} {marker}\n", heading.trim()))
        }
        Node::ExternalLink { nodes, .. } => {
            let document = nodes_to_string(nodes, regexes)?;
            let label = document.split(' ').skip(1).collect::<Vec<_>>().join(" ");
            Ok(label)
        }
        Node::Preformatted { nodes, .. } => nodes_to_string(nodes, regexes),
        Node::Tag { name, nodes, .. } => {
            if TRANSPARENT_TAGS.contains(&name.as_ref()) {
                nodes_to_string(nodes, regexes)
            } else {
                Ok(String::new())
            }
        }

        Node::CharacterEntity { character, .. } => Ok(String::from(*character)),

        Node::Link { text, target, .. } => {
            if text.is_empty() {
                Ok(target.to_string())
            } else {
                nodes_to_string(text, regexes)
            }
        }
        Node::Parameter { default, .. } => match default {
            Some(default) => nodes_to_string(default, regexes),
            None => Ok(String::new()),
        },

        Node::DefinitionList { items, .. } => definition_list_items_to_string(items, regexes),
        Node::UnorderedList { items, .. } => unordered_list_items_to_string(items, regexes),
        Node::OrderedList { items, .. } => ordered_list_items_to_string(items, regexes),
        Node::Table { captions, rows, .. } => table_to_string(captions, rows, regexes),
        Node::Template {
            name, parameters, ..
        } => {
            let name = nodes_to_string(name, regexes)?;
            let name = name.trim();
            if regexes.refn.is_match(name) || regexes.linktext.is_match(name) {
                refn_parameters_to_string(parameters, regexes)
            } else if regexes.language.is_match(name) && !parameters.is_empty() {
                refn_parameters_to_string(&parameters[1..], regexes)
            } else if regexes.listing.is_match(name) {
                listing_to_string(parameters, regexes)
            } else {
                Ok(String::new())
            }
        }
        Node::Text { value, .. } => Ok(String::from(*value)),
    }
}

#[cfg(test)]
mod tests_node_to_string {
    use parse_wiki_text::Configuration;

    use super::process_to_article;
    use crate::ingest::pipeline::wikipedia::markup_processor::parse::Regexes;

    fn render(markup: &str) -> String {
        let configuration = Configuration::default();
        let parse = configuration.parse(markup).nodes;
        process_to_article(&parse, &Regexes::new().unwrap()).unwrap()
    }

    #[test]
    fn strips_emphasis_links_and_references() {
        let text = render(
            "'''Paris''' is the capital of [[France]] and home to the [[Louvre|Louvre Museum]].<ref>A source</ref>",
        );
        assert_eq!(
            text,
            "Paris is the capital of France and home to the Louvre Museum."
        );
    }

    #[test]
    fn headings_render_with_level_markers() {
        let text = render("Intro text.\n\n== Get in ==\nBy train.\n\n=== By plane ===\nCDG airport.");
        assert!(text.contains("\n== Get in ==\n"), "{text}");
        assert!(text.contains("\n=== By plane ===\n"), "{text}");
        assert!(text.starts_with("Intro text."));
    }

    #[test]
    fn stops_at_reference_sections() {
        let text = render("Body text.\n\n== References ==\n* A book\n\n== Later ==\nHidden.");
        assert_eq!(text, "Body text.");
    }

    #[test]
    fn lists_render_one_item_per_line() {
        let text = render("Sights:\n* Eiffel Tower\n* Louvre\n");
        assert!(text.contains("- Eiffel Tower\n- Louvre"), "{text}");
    }

    #[test]
    fn unknown_templates_and_categories_are_dropped() {
        let text = render("{{Infobox city|name=Paris}}Paris is large.[[Category:Cities]]");
        assert_eq!(text, "Paris is large.");
    }

    #[test]
    fn listing_templates_keep_name_and_content() {
        let text = render("{{see|name=Louvre|content=The world's largest art museum.}}");
        assert_eq!(text, "Louvre: The world's largest art museum.");
    }

    #[test]
    fn external_links_keep_their_label() {
        let text = render("Visit [https://example.org the official site] today.");
        assert_eq!(text, "Visit the official site today.");
    }
}
