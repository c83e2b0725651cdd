//! Term-list codec.
//!
//! A glossary's term pairs are persisted as a single delimited string:
//! pairs joined by `"; "`, each pair rendered as `"origin: target"`.
//! On the way in, pairs arrive as bracket-indexed form fields
//! (`content[0][origin]` / `content[0][target]`); on the way out, the
//! list endpoints and the spreadsheet exporters split the string back
//! apart with slightly different separator assumptions that both match
//! the stored encoding.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermPair {
    pub origin: String,
    pub target: String,
}

const PAIR_SEPARATOR: &str = "; ";
const TERM_SEPARATOR: &str = ": ";

/// Build the stored encoding from an ordered list of form fields.
///
/// Every key matching `content[<index>][origin]` contributes one pair, in
/// the order the keys were received (not sorted by index). The matching
/// target is looked up under `content[<index>][target]` and defaults to
/// the empty string when absent.
pub fn encode_form_fields(fields: &[(String, String)]) -> String {
    let mut pairs = Vec::new();

    for (key, origin) in fields {
        let Some(index) = origin_index(key) else {
            continue;
        };

        let target_key = format!("content[{index}][target]");
        let target = fields
            .iter()
            .find(|(k, _)| k == &target_key)
            .map(|(_, v)| v.as_str())
            .unwrap_or_default();

        pairs.push(format!("{origin}{TERM_SEPARATOR}{target}"));
    }

    pairs.join(PAIR_SEPARATOR)
}

fn origin_index(key: &str) -> Option<&str> {
    let rest = key.strip_prefix("content[")?;
    let (index, tail) = rest.split_once(']')?;
    tail.starts_with("[origin]").then_some(index)
}

/// Decode the stored encoding into term pairs for JSON output.
///
/// Chunks without a `:` are dropped; both sides are trimmed. Empty pairs
/// therefore disappear silently on read.
pub fn decode_pairs(content: &str) -> Vec<TermPair> {
    if content.is_empty() {
        return Vec::new();
    }

    content
        .split(PAIR_SEPARATOR)
        .filter_map(|chunk| {
            let (origin, target) = chunk.split_once(':')?;
            Some(TermPair {
                origin: origin.trim().to_string(),
                target: target.trim().to_string(),
            })
        })
        .collect()
}

/// Decode the stored encoding into spreadsheet rows.
///
/// The export path splits on `";"` and then on the exact `": "` substring,
/// so a chunk without that substring becomes a row with an empty target
/// and any space left over from the `"; "` pair separator is kept as-is.
pub fn decode_export_rows(content: &str) -> Vec<(String, String)> {
    if content.is_empty() {
        return Vec::new();
    }

    content
        .split(';')
        .map(|chunk| match chunk.split_once(TERM_SEPARATOR) {
            Some((origin, target)) => (origin.to_string(), target.to_string()),
            None => (chunk.to_string(), String::new()),
        })
        .collect()
}

/// Build the stored encoding from imported spreadsheet rows.
///
/// The import path joins rows with a bare `";"`, which the export decoder
/// above accepts unchanged.
pub fn encode_import_rows(rows: &[(String, String)]) -> String {
    rows.iter()
        .map(|(origin, target)| format!("{origin}{TERM_SEPARATOR}{target}"))
        .collect::<Vec<_>>()
        .join(";")
}
