//! Rewriting of unresolved library addresses in bytecode.
//!
//! The backend leaves a 20-byte hole in the hex bytecode wherever a library
//! address is needed and lists the hole in the object's link references. Each
//! hole is replaced with a readable marker of the same width, `__Name____...__`,
//! so deployment tooling can find and fill it by library name.

use std::collections::BTreeMap;

use crate::backend::LinkReference;
use crate::error::BuildError;

/// Byte length of a linked address.
pub const ADDRESS_BYTES: usize = 20;

/// Width of a marker in hex characters.
pub const MARKER_WIDTH: usize = ADDRESS_BYTES * 2;

const DELIMITER: &str = "__";
const NAME_WIDTH: usize = MARKER_WIDTH - 2 * DELIMITER.len();

/// Builds the marker for `library`: the name truncated or padded with `_` to
/// 36 characters, between `__` delimiters.
pub fn library_marker(library: &str) -> String {
    let mut end = library.len().min(NAME_WIDTH);
    while !library.is_char_boundary(end) {
        end -= 1;
    }
    let name = &library[..end];
    format!("{DELIMITER}{name:_<width$}{DELIMITER}", width = NAME_WIDTH)
}

/// Recovers the library name from a marker span, if `span` is one.
pub fn placeholder_library(span: &str) -> Option<&str> {
    if span.len() != MARKER_WIDTH {
        return None;
    }
    let inner = span.strip_prefix(DELIMITER)?.strip_suffix(DELIMITER)?;
    let name = inner.trim_end_matches('_');
    (!name.is_empty()).then_some(name)
}

/// Replaces every referenced hole in `object` with its library marker.
///
/// `refs` maps library unit name, then library name, to hole locations.
/// `name` is the declaration owning the bytecode, used in errors. The result
/// always has the same length as `object`.
pub fn rewrite_link_placeholders(
    name: &str,
    object: &str,
    refs: &BTreeMap<String, BTreeMap<String, Vec<LinkReference>>>,
) -> Result<String, BuildError> {
    let mut out = object.to_string();
    for (library, reference) in refs
        .values()
        .flat_map(|libs| libs.iter())
        .flat_map(|(library, list)| list.iter().map(move |r| (library, r)))
    {
        let invalid = || BuildError::InvalidLinkReference {
            name: name.to_string(),
            library: library.clone(),
            start: reference.start,
        };
        if reference.length != ADDRESS_BYTES {
            return Err(invalid());
        }
        let lo = reference.start.checked_mul(2).ok_or_else(invalid)?;
        let hi = lo.checked_add(MARKER_WIDTH).ok_or_else(invalid)?;
        if out.get(lo..hi).is_none() {
            return Err(invalid());
        }
        out.replace_range(lo..hi, &library_marker(library));
    }
    Ok(out)
}
