//! Indexed list fields.
//!
//! NVP encodes lists as families of fields sharing a name and differing by a numeric suffix,
//! e.g. `L_LONGMESSAGE0`, `L_LONGMESSAGE1`. Indices need not start at zero or be contiguous.

use std::collections::BTreeMap;

use crate::types::Fields;

/// Fields of one index, keyed by prefix.
pub type IndexedGroup<'a> = BTreeMap<&'a str, &'a str>;

/// The numeric suffix of `key` when it is exactly `prefix` followed by one or more digits.
pub fn index_suffix(key: &str, prefix: &str) -> Option<u32> {
    let digits = key.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// All values of the `prefix<n>` family, keyed by `n`.
pub fn indexed<'a>(fields: &'a Fields, prefix: &str) -> BTreeMap<u32, &'a str> {
    fields
        .iter()
        .filter_map(|(key, value)| Some((index_suffix(key, prefix)?, value.as_str())))
        .collect()
}

/// Group several indexed families by their shared suffix.
///
/// ```
/// use paypal_nvp::types::{fields, group_indexed};
///
/// let response = fields([
///     ("L_HOSTEDBUTTONID3", "ABC"),
///     ("L_BUTTONTYPE3", "BUYNOW"),
///     ("L_HOSTEDBUTTONID7", "DEF"),
/// ]);
///
/// let groups = group_indexed(&response, &["L_HOSTEDBUTTONID", "L_BUTTONTYPE"]);
/// assert_eq!(groups[&3]["L_BUTTONTYPE"], "BUYNOW");
/// assert!(!groups[&7].contains_key("L_BUTTONTYPE"));
/// ```
pub fn group_indexed<'a>(
    fields: &'a Fields,
    prefixes: &[&'a str],
) -> BTreeMap<u32, IndexedGroup<'a>> {
    let mut groups: BTreeMap<u32, IndexedGroup<'a>> = BTreeMap::new();
    for (key, value) in fields {
        let matched = prefixes
            .iter()
            .find_map(|prefix| Some((*prefix, index_suffix(key, prefix)?)));

        if let Some((prefix, index)) = matched {
            groups.entry(index).or_default().insert(prefix, value.as_str());
        }
    }
    groups
}
