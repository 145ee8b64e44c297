//! Scraping the variable-list table out of an HTML page.
//!
//! Only the first `<table>` of the page is read. The fragment is cut out of
//! the document before parsing so scripts and unbalanced markup elsewhere on
//! the page never reach the parser.

use std::borrow::Cow;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;

use nhanes_model::{RawTable, SourceError};

/// Parse the first HTML table in `html` into a [`RawTable`].
///
/// The header is the first row containing `<th>` cells (or the first row if
/// there is none). `origin` names the page in error messages.
pub fn parse_first_table(html: &str, origin: &str) -> Result<RawTable, SourceError> {
    let fragment = first_table_fragment(html)
        .ok_or_else(|| SourceError::parse(origin, "page contains no table"))?;

    let fragment = escape_bare_markup(fragment);
    let mut reader = Reader::from_str(&fragment);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut rows: Vec<ScrapedRow> = Vec::new();
    let mut current_row: Option<ScrapedRow> = None;
    let mut current_cell: Option<String> = None;
    let mut table_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            SourceError::parse(
                origin,
                format!("malformed table at byte {}: {e}", reader.error_position()),
            )
        })?;
        match event {
            Event::Start(tag) => {
                let name = tag.local_name().as_ref().to_ascii_lowercase();
                match name.as_slice() {
                    b"table" => table_depth += 1,
                    _ if table_depth != 1 => {}
                    b"tr" => {
                        finish_row(&mut rows, &mut current_row, &mut current_cell);
                        current_row = Some(ScrapedRow::default());
                    }
                    b"th" | b"td" => {
                        finish_cell(&mut current_row, &mut current_cell);
                        let row = current_row.get_or_insert_with(ScrapedRow::default);
                        row.has_header_cells |= name == b"th";
                        current_cell = Some(String::new());
                    }
                    b"br" | b"p" => push_text(&mut current_cell, " "),
                    _ => {}
                }
            }
            Event::Empty(tag) if table_depth == 1 => {
                let name = tag.local_name().as_ref().to_ascii_lowercase();
                match name.as_slice() {
                    b"th" | b"td" => {
                        finish_cell(&mut current_row, &mut current_cell);
                        let row = current_row.get_or_insert_with(ScrapedRow::default);
                        row.has_header_cells |= name == b"th";
                        row.cells.push(String::new());
                    }
                    b"br" => push_text(&mut current_cell, " "),
                    _ => {}
                }
            }
            Event::End(tag) => {
                let name = tag.local_name().as_ref().to_ascii_lowercase();
                match name.as_slice() {
                    b"table" => {
                        table_depth = table_depth.saturating_sub(1);
                        if table_depth == 0 {
                            break;
                        }
                    }
                    _ if table_depth != 1 => {}
                    b"tr" => finish_row(&mut rows, &mut current_row, &mut current_cell),
                    b"th" | b"td" => finish_cell(&mut current_row, &mut current_cell),
                    _ => {}
                }
            }
            Event::Text(text) if table_depth == 1 => {
                let decoded = text
                    .decode()
                    .map_err(|e| SourceError::parse(origin, e.to_string()))?;
                push_text(&mut current_cell, &decoded);
            }
            Event::CData(data) if table_depth == 1 => {
                let decoded = data
                    .decode()
                    .map_err(|e| SourceError::parse(origin, e.to_string()))?;
                push_text(&mut current_cell, &decoded);
            }
            Event::GeneralRef(reference) if table_depth == 1 => {
                let resolved = match reference.resolve_char_ref() {
                    Ok(Some(ch)) => ch.to_string(),
                    _ => {
                        let name = reference
                            .decode()
                            .map_err(|e| SourceError::parse(origin, e.to_string()))?;
                        resolve_entity(&name)
                    }
                };
                push_text(&mut current_cell, &resolved);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    finish_row(&mut rows, &mut current_row, &mut current_cell);

    let header_idx = rows
        .iter()
        .position(|row| row.has_header_cells)
        .unwrap_or(0);
    let mut rows = rows.into_iter().skip(header_idx);
    let headers = rows
        .next()
        .map(|row| row.cells)
        .ok_or_else(|| SourceError::parse(origin, "table has no rows"))?;
    let body: Vec<Vec<String>> = rows
        .filter(|row| !row.has_header_cells)
        .map(|row| row.cells)
        .collect();

    debug!(origin, columns = headers.len(), rows = body.len(), "parsed HTML table");
    Ok(RawTable::new(headers, body))
}

#[derive(Debug, Default)]
struct ScrapedRow {
    cells: Vec<String>,
    has_header_cells: bool,
}

fn first_table_fragment(html: &str) -> Option<&str> {
    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<table")?;
    let end = lower[start..]
        .find("</table>")
        .map_or(html.len(), |offset| start + offset + "</table>".len());
    Some(&html[start..end])
}

/// Escape `&` that does not open a reference and `<` that does not open a tag.
fn escape_bare_markup(fragment: &str) -> Cow<'_, str> {
    let bytes = fragment.as_bytes();
    let needs_escape = |at: usize| match bytes[at] {
        b'&' => !starts_reference(&bytes[at + 1..]),
        b'<' => !starts_markup(&bytes[at + 1..]),
        _ => false,
    };
    if !(0..bytes.len()).any(needs_escape) {
        return Cow::Borrowed(fragment);
    }

    let mut escaped = String::with_capacity(fragment.len() + 16);
    let mut copied = 0;
    for at in (0..bytes.len()).filter(|&at| needs_escape(at)) {
        escaped.push_str(&fragment[copied..at]);
        escaped.push_str(if bytes[at] == b'&' { "&amp;" } else { "&lt;" });
        copied = at + 1;
    }
    escaped.push_str(&fragment[copied..]);
    Cow::Owned(escaped)
}

/// `&name;`, `&#123;` or `&#x1F;`.
fn starts_reference(rest: &[u8]) -> bool {
    let (body, valid): (&[u8], fn(&u8) -> bool) = match rest {
        [b'#', b'x' | b'X', hex @ ..] => (hex, u8::is_ascii_hexdigit),
        [b'#', dec @ ..] => (dec, u8::is_ascii_digit),
        [first, ..] if first.is_ascii_alphabetic() => (rest, u8::is_ascii_alphanumeric),
        _ => return false,
    };
    let len = body.iter().take_while(|b| valid(b)).count();
    len > 0 && body.get(len) == Some(&b';')
}

fn starts_markup(rest: &[u8]) -> bool {
    matches!(rest.first(), Some(b) if b.is_ascii_alphabetic() || matches!(b, b'/' | b'!' | b'?'))
}

fn push_text(cell: &mut Option<String>, text: &str) {
    if let Some(cell) = cell {
        cell.push_str(text);
    }
}

fn finish_cell(row: &mut Option<ScrapedRow>, cell: &mut Option<String>) {
    if let Some(text) = cell.take() {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        row.get_or_insert_with(ScrapedRow::default)
            .cells
            .push(collapsed);
    }
}

fn finish_row(
    rows: &mut Vec<ScrapedRow>,
    row: &mut Option<ScrapedRow>,
    cell: &mut Option<String>,
) {
    finish_cell(row, cell);
    if let Some(row) = row.take()
        && !row.cells.is_empty()
    {
        rows.push(row);
    }
}

fn resolve_entity(name: &str) -> String {
    match name {
        "nbsp" => " ".to_string(),
        other => resolve_predefined_entity(other)
            .map(str::to_string)
            .unwrap_or_else(|| format!("&{other};")),
    }
}
