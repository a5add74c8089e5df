//! Structural extraction of top-level declarations from source text.
//!
//! Declarations are found by matching the header syntax
//! `[abstract] (contract|library|interface) Name [is Base, ...] {` at the start
//! of a line. This is not a parser: headers that don't have this shape are
//! skipped silently and produce no declaration.

use std::sync::OnceLock;

use keel_common::DeclarationKind;
use regex::Regex;

/// One declaration header found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDeclaration {
    /// Declaration kind.
    pub kind: DeclarationKind,
    /// Declared name.
    pub name: String,
    /// Directly inherited names, in header order.
    pub bases: Vec<String>,
    /// Byte offset of the header keyword within the source.
    pub offset: u32,
}

fn header_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?m)^[ \t]*(?:abstract[ \t]+)?(contract|library|interface)\s+([A-Za-z_$][A-Za-z0-9_$]*)(?:\s+is\b([^{;]*))?\s*\{",
        )
        .expect("valid regex")
    })
}

/// Extracts every top-level declaration header from `source`, in source order.
pub fn extract_declarations(source: &str) -> Vec<ExtractedDeclaration> {
    header_regex()
        .captures_iter(source)
        .filter_map(|caps| {
            let keyword = caps.get(1)?;
            let kind = keyword.as_str().parse().ok()?;
            let name = caps.get(2)?.as_str().to_string();
            let bases = caps.get(3).map(|m| parse_bases(m.as_str())).unwrap_or_default();
            Some(ExtractedDeclaration {
                kind,
                name,
                bases,
                offset: keyword.start() as u32,
            })
        })
        .collect()
}

/// Splits an inheritance list on top-level commas and keeps each base's name.
///
/// Constructor arguments (`Base(1, 2)`) are dropped and qualified names
/// (`Lib.Base`) resolve to their last segment.
fn parse_bases(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&list[start..]);

    items
        .into_iter()
        .filter_map(|item| {
            let item = item.trim_start();
            let end = item
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$' || c == '.'))
                .unwrap_or(item.len());
            let qualified = &item[..end];
            let name = qualified.rsplit('.').next().unwrap_or(qualified);
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}
