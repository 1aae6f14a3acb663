use parse_wiki_text::{TableCaption, TableRow};

use super::{
    nodes::{nodes_to_string, ParseResult},
    Regexes,
};

pub(super) fn table_to_string(
    captions: &[TableCaption<'_>],
    rows: &[TableRow<'_>],
    regexes: &Regexes,
) -> ParseResult {
    let mut lines = vec![];
    for TableCaption { content, .. } in captions.iter() {
        let caption = nodes_to_string(content, regexes)?;
        if !caption.trim().is_empty() {
            lines.push(caption.trim().to_string());
        }
    }
    for row in rows.iter() {
        let row = table_row_to_string(row, regexes)?;
        if !row.is_empty() {
            lines.push(row);
        }
    }
    Ok(format!("\n{}\n", lines.join("\n")))
}

fn table_row_to_string(TableRow { cells, .. }: &TableRow<'_>, regexes: &Regexes) -> ParseResult {
    let mut documents = vec![];
    for cell in cells.iter() {
        let cell = nodes_to_string(&cell.content, regexes)?;
        let cell = cell.trim();
        if !cell.is_empty() {
            documents.push(cell.replace('\n', " "));
        }
    }
    Ok(documents.join(" | "))
}
