//! Miscellaneous common types used throughout the crate.

use std::collections::BTreeMap;

/// A flat set of NVP fields, keyed by field name.
///
/// Keys are unique; when a response repeats a key, the last occurrence wins.
pub type Fields = BTreeMap<String, String>;

/// Build [`Fields`] from anything yielding key / value pairs.
///
/// ```
/// use paypal_nvp::types::fields;
///
/// let params = fields([("STARTDATE", "1999-01-01T00:00:00Z")]);
/// assert_eq!(params["STARTDATE"], "1999-01-01T00:00:00Z");
/// ```
pub fn fields<I, K, V>(pairs: I) -> Fields
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
