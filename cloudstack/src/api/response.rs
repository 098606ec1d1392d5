//! Response envelope handling for the CloudStack API
//!
//! Every response wraps its payload in a single key named after the
//! command (`{"listhostsresponse": {...}}`). Some payloads use a second
//! convention, a `count` next to a named array, even where only one entity
//! is expected.

use super::error::{ApiError, CsError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Parses a raw response body and extracts its payload.
///
/// A body that is not a JSON object fails to decode.
pub fn unwrap_envelope(body: &[u8]) -> Result<Value> {
    let map: Map<String, Value> = serde_json::from_slice(body)?;
    unwrap_map(map)
}

/// Extracts the payload from an already parsed envelope.
///
/// - `{"count": N, "<entity>": [first, ...]}` yields `first`
/// - `{"<wrapper>": payload}` yields `payload` unchanged
///
/// Anything else is a protocol violation.
pub fn unwrap_value(value: Value) -> Result<Value> {
    match value {
        Value::Object(map) => unwrap_map(map),
        other => Err(ApiError::Envelope(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

fn unwrap_map(map: Map<String, Value>) -> Result<Value> {
    if map.contains_key("count") {
        return unwrap_counted(map);
    }

    if map.len() != 1 {
        return Err(ApiError::Envelope(Value::Object(map).to_string()));
    }

    map.into_iter()
        .next()
        .map(|(_, payload)| payload)
        .ok_or_else(|| ApiError::Envelope("{}".to_string()))
}

fn unwrap_counted(mut map: Map<String, Value>) -> Result<Value> {
    let key = match only_sibling_of_count(&map) {
        Some(key) => key,
        None => return Err(ApiError::Envelope(Value::Object(map).to_string())),
    };

    let items = match map.remove(&key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            map.insert(key.clone(), other);
            return Err(ApiError::Envelope(format!(
                "expected a list under {:?}: {}",
                key,
                Value::Object(map)
            )));
        }
        None => return Err(ApiError::Envelope(Value::Object(map).to_string())),
    };

    match items.into_iter().next() {
        Some(first) => Ok(first),
        None => {
            map.insert(key.clone(), Value::Array(Vec::new()));
            Err(ApiError::Envelope(format!(
                "empty list under {:?} in single-object context: {}",
                key,
                Value::Object(map)
            )))
        }
    }
}

fn only_sibling_of_count(map: &Map<String, Value>) -> Option<String> {
    let mut siblings = map.keys().filter(|key| key.as_str() != "count");
    match (siblings.next(), siblings.next()) {
        (Some(key), None) => Some(key.clone()),
        _ => None,
    }
}

/// Unwraps a `count`-style payload to its first entity, leaving plain
/// entity payloads alone.
pub(crate) fn entity_payload(payload: Value) -> Result<Value> {
    match &payload {
        Value::Object(map) if map.contains_key("count") => unwrap_value(payload),
        _ => Ok(payload),
    }
}

pub(crate) fn decode<T: DeserializeOwned>(payload: Value) -> Result<T> {
    Ok(serde_json::from_value(payload)?)
}

pub(crate) fn decode_error(status: u16, payload: Value) -> ApiError {
    match serde_json::from_value::<CsError>(payload) {
        Ok(error) => ApiError::Api { status, error },
        Err(e) => ApiError::DecodeError(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_single_object_envelope() {
        let payload = unwrap_envelope(br#"{"addhostresponse": {"id":"abc"}}"#).unwrap();
        assert_eq!(payload, json!({"id": "abc"}));
    }

    #[test]
    fn unwraps_scalar_and_list_payloads_verbatim() {
        assert_eq!(
            unwrap_envelope(br#"{"getvmpasswordresponse": "secret"}"#).unwrap(),
            json!("secret")
        );
        assert_eq!(
            unwrap_envelope(br#"{"listhostsresponse": {"count":2,"host":[{"id":"a"},{"id":"b"}]}}"#)
                .unwrap(),
            json!({"count": 2, "host": [{"id": "a"}, {"id": "b"}]})
        );
    }

    #[test]
    fn unwraps_first_element_of_counted_list() {
        let payload = unwrap_envelope(br#"{"count":1, "host":[{"id":"x"}]}"#).unwrap();
        assert_eq!(payload, json!({"id": "x"}));

        let payload = unwrap_envelope(br#"{"count":2, "host":[{"id":"x"},{"id":"y"}]}"#).unwrap();
        assert_eq!(payload, json!({"id": "x"}));
    }

    #[test]
    fn rejects_malformed_envelopes() {
        for body in [
            r#"{}"#,
            r#"{"count":1}"#,
            r#"{"count":1,"host":[],"zone":[]}"#,
            r#"{"a":1,"b":2}"#,
        ] {
            let result = unwrap_envelope(body.as_bytes());
            assert!(
                matches!(result, Err(ApiError::Envelope(_))),
                "expected envelope error for {}",
                body
            );
        }
    }

    #[test]
    fn empty_counted_list_is_an_error() {
        let result = unwrap_envelope(br#"{"count":0,"host":[]}"#);
        match result {
            Err(ApiError::Envelope(message)) => {
                assert!(message.contains("empty list"));
                assert!(message.contains("host"));
            }
            other => panic!("expected envelope error, got {:?}", other),
        }
    }

    #[test]
    fn counted_entry_must_be_a_list() {
        let result = unwrap_envelope(br#"{"count":1,"host":{"id":"x"}}"#);
        assert!(matches!(result, Err(ApiError::Envelope(_))));
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        let result = unwrap_envelope(b"<html>502 Bad Gateway</html>");
        assert!(matches!(result, Err(ApiError::DecodeError(_))));
    }

    #[test]
    fn non_object_body_is_a_decode_error() {
        for body in [r#"[1,2]"#, r#""listhostsresponse""#, "42", "null"] {
            let result = unwrap_envelope(body.as_bytes());
            assert!(
                matches!(result, Err(ApiError::DecodeError(_))),
                "expected decode error for {}",
                body
            );
        }
    }

    #[test]
    fn non_object_job_result_is_an_envelope_error() {
        assert!(matches!(
            unwrap_value(json!([{"id": "x"}])),
            Err(ApiError::Envelope(_))
        ));
    }

    #[test]
    fn entity_payload_only_unwraps_counted_lists() {
        assert_eq!(
            entity_payload(json!({"count":1,"host":[{"id":"x"}]})).unwrap(),
            json!({"id": "x"})
        );
        assert_eq!(
            entity_payload(json!({"id":"x","name":"h1"})).unwrap(),
            json!({"id": "x", "name": "h1"})
        );
    }

    #[test]
    fn error_payload_decodes_to_api_error() {
        let payload = json!({"uuidList":[],"errorcode":431,"cserrorcode":4350,"errortext":"bad zone"});
        match decode_error(431, payload) {
            ApiError::Api { status, error } => {
                assert_eq!(status, 431);
                assert_eq!(error.errorcode, 431);
                assert_eq!(error.cserrorcode, 4350);
                assert_eq!(error.errortext, "bad zone");
            }
            other => panic!("expected API error, got {:?}", other),
        }

        assert!(matches!(
            decode_error(500, json!("oops")),
            ApiError::DecodeError(_)
        ));
    }
}
