//! NVP wire encoding.
//!
//! Requests carry their fields as an `application/x-www-form-urlencoded` query string and
//! NVP responses come back as a body in the same format.

use url::{Url, form_urlencoded};

use crate::types::Fields;

/// Encode `pairs` as a form-urlencoded query string, keeping their order.
pub fn encode_query<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Return `endpoint` with `pairs` appended to its query string.
pub fn with_query<I, K, V>(endpoint: &Url, pairs: I) -> Url
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url = endpoint.clone();
    url.query_pairs_mut().extend_pairs(pairs);
    url
}

/// Decode a form-urlencoded body into [`Fields`]. Repeated keys keep their last value.
pub fn decode_fields(body: &str) -> Fields {
    form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::types::fields;

    #[test]
    fn test_decode_response_body() {
        let decoded = decode_fields(
            "TIMESTAMP=2015%2d06%2d01T12%3a00%3a00Z&CORRELATIONID=abc123&ACK=Success&VERSION=124%2e0&BUILD=16770825\n",
        );

        assert_eq!(decoded["ACK"], "Success");
        assert_eq!(decoded["TIMESTAMP"], "2015-06-01T12:00:00Z");
        assert_eq!(decoded["VERSION"], "124.0");
        assert_eq!(decoded["BUILD"], "16770825");
    }

    #[test]
    fn test_decode_last_duplicate_wins() {
        let decoded = decode_fields("ACK=Failure&ACK=Success");
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded["ACK"], "Success");
    }

    #[test]
    fn test_encode_keeps_order_and_escapes() {
        let encoded = encode_query([("USER", "a b"), ("PWD", "p&w=d"), ("METHOD", "GetBalance")]);
        assert_eq!(encoded, "USER=a+b&PWD=p%26w%3Dd&METHOD=GetBalance");
    }

    #[test]
    fn test_with_query_appends() {
        let endpoint = Url::parse("https://api-3t.paypal.com/nvp").unwrap();
        let url = with_query(&endpoint, [("METHOD", "GetBalance")]);
        assert_eq!(url.as_str(), "https://api-3t.paypal.com/nvp?METHOD=GetBalance");
        assert_eq!(endpoint.query(), None);
    }

    proptest! {
        #[test]
        fn test_encode_decode_roundtrip(
            pairs in proptest::collection::btree_map("[A-Z_]{1,12}[0-9]{0,2}", "\\PC{0,24}", 0..8),
        ) {
            let original = fields(pairs);
            let decoded = decode_fields(&encode_query(&original));
            prop_assert_eq!(decoded, original);
        }
    }
}
