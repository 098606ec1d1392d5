//! Canonical query-string encoding used for both signing and GET requests

use std::collections::BTreeMap;

/// Encodes flattened parameters as `key=value` pairs joined by `&`.
///
/// Keys are emitted in ascending byte order and left as-is; only values are
/// escaped. Spaces become `%20` and `*` stays literal, since the management
/// server rejects `%2A`.
pub fn encode_values(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| format!("{}={}", key, escape_value(value)))
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn escape_value(value: &str) -> String {
    urlencoding::encode(value).replace("%2A", "*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ParamBag;

    #[test]
    fn empty_params_encode_to_empty_string() {
        assert_eq!(encode_values(&BTreeMap::new()), "");
        assert_eq!(encode_values(&ParamBag::new().to_wire()), "");
    }

    #[test]
    fn insertion_order_does_not_change_encoding() {
        let mut first = ParamBag::new();
        first
            .set("zoneid", "z1")
            .set("name", "web 01")
            .set_bool("listall", true);

        let mut second = ParamBag::new();
        second
            .set_bool("listall", true)
            .set("name", "web 01")
            .set("zoneid", "z1");

        let encoded = encode_values(&first.to_wire());
        assert_eq!(encoded, encode_values(&second.to_wire()));
        assert_eq!(encoded, "listall=true&name=web%2001&zoneid=z1");
    }

    #[test]
    fn space_and_asterisk_are_encoded_for_cloudstack() {
        let mut params = ParamBag::new();
        params.set("keyword", "a b*c");

        let encoded = encode_values(&params.to_wire());
        assert_eq!(encoded, "keyword=a%20b*c");
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains("%2A"));
    }

    #[test]
    fn reserved_characters_are_escaped_in_values_only() {
        let mut params = ParamBag::new();
        params
            .set("userdata", "a+b/c=d&e")
            .set_map("details", [("cpuOvercommitRatio", "2.0")]);

        let encoded = encode_values(&params.to_wire());
        assert_eq!(
            encoded,
            "details[0].key=cpuOvercommitRatio&details[0].value=2.0&userdata=a%2Bb%2Fc%3Dd%26e"
        );
    }
}
