//! Share token encoding and decoding.
//!
//! Encode: attach `expiresAt`, serialize to JSON, raw-deflate, base64url
//! without padding. Decode reverses each step and then checks the expiry
//! against the clock.

use std::io::{Read, Write};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use planner_core::traits::clock::{Clock, SystemClock};

use crate::error::ShareError;

/// Field injected into every payload holding the expiry in ms since the epoch.
pub const EXPIRES_AT_FIELD: &str = "expiresAt";

/// Field carrying the record kind inside the payload.
pub const TYPE_FIELD: &str = "type";

/// Default validity window of a token.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Upper bound on the serialized payload, enforced on both sides so every
/// token `encode` produces is one `decode` accepts.
pub const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Result of decoding a token.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    /// Well-formed and within its validity window (or carries no expiry).
    Live(Map<String, Value>),
    /// Well-formed but past its expiry.
    Expired {
        /// Expiry embedded in the token, in ms since the epoch.
        expires_at: i64,
    },
    /// Not a token this codec produced.
    Corrupt,
}

impl DecodeOutcome {
    pub fn is_live(&self) -> bool {
        matches!(self, DecodeOutcome::Live(_))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, DecodeOutcome::Expired { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, DecodeOutcome::Corrupt)
    }

    /// The decoded record when live.
    pub fn live(self) -> Option<Map<String, Value>> {
        match self {
            DecodeOutcome::Live(record) => Some(record),
            _ => None,
        }
    }

    /// Convert into a `Result`, mapping the two failure cases to errors.
    pub fn into_result(self) -> Result<Map<String, Value>, ShareError> {
        match self {
            DecodeOutcome::Live(record) => Ok(record),
            DecodeOutcome::Expired { expires_at } => Err(ShareError::Expired { expires_at }),
            DecodeOutcome::Corrupt => Err(ShareError::Corrupt),
        }
    }
}

/// Stateless encoder/decoder for share tokens.
///
/// The codec only reads the clock; it is `Send + Sync` whenever the clock
/// is, and calls never interfere with each other.
#[derive(Debug, Clone)]
pub struct ShareCodec<C: Clock = SystemClock> {
    clock: C,
    ttl_millis: i64,
}

impl ShareCodec<SystemClock> {
    /// Codec on the system clock with the default 24 hour window.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ShareCodec<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ShareCodec<C> {
    /// Codec reading time from `clock`, with the default window.
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            ttl_millis: DEFAULT_TTL.as_millis() as i64,
        }
    }

    /// Override the validity window.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_millis = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self
    }

    /// The clock this codec reads.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Encode a record into a token valid from now until now + TTL.
    ///
    /// The caller's map is not modified; `expiresAt` is set on a copy and
    /// replaces any value the record already had under that key.
    pub fn encode(&self, data: &Map<String, Value>) -> Result<String, ShareError> {
        let expires_at = self.clock.now_millis().saturating_add(self.ttl_millis);

        let mut payload = data.clone();
        payload.insert(EXPIRES_AT_FIELD.to_string(), Value::from(expires_at));

        let json = serde_json::to_vec(&payload).map_err(|e| ShareError::Encode(e.to_string()))?;
        if json.len() > MAX_PAYLOAD_BYTES {
            return Err(ShareError::Encode(format!(
                "payload too large ({} bytes, limit {MAX_PAYLOAD_BYTES})",
                json.len()
            )));
        }

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(&json)
            .map_err(|e| ShareError::Encode(e.to_string()))?;
        let compressed = encoder
            .finish()
            .map_err(|e| ShareError::Encode(e.to_string()))?;

        // Identical to standard base64 with `+/` swapped for `-_` and the
        // `=` padding stripped.
        Ok(URL_SAFE_NO_PAD.encode(compressed))
    }

    /// Encode any serializable value that serializes to a JSON object.
    pub fn encode_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, ShareError> {
        match serde_json::to_value(value).map_err(|e| ShareError::Encode(e.to_string()))? {
            Value::Object(map) => self.encode(&map),
            other => Err(ShareError::Encode(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Encode, collapsing any failure to `None` for callers that only
    /// need to know whether a link could be produced.
    pub fn encode_or_none(&self, data: &Map<String, Value>) -> Option<String> {
        match self.encode(data) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!(error = %e, "Share encode failed");
                None
            }
        }
    }

    /// Decode a token. Never panics, whatever the input.
    pub fn decode(&self, token: &str) -> DecodeOutcome {
        let record = match unpack(token) {
            Ok(record) => record,
            Err(reason) => {
                debug!(reason, token_len = token.len(), "Rejected share token");
                return DecodeOutcome::Corrupt;
            }
        };

        let expires_at = match record.get(EXPIRES_AT_FIELD) {
            // Tokens minted before expiry existed carry no timestamp.
            None => return DecodeOutcome::Live(record),
            Some(value) => match expiry_millis(value) {
                Some(ms) => ms,
                None => {
                    debug!("Share token has a non-numeric expiry");
                    return DecodeOutcome::Corrupt;
                }
            },
        };

        if self.clock.now_millis() > expires_at {
            DecodeOutcome::Expired { expires_at }
        } else {
            DecodeOutcome::Live(record)
        }
    }
}

/// Encode on the system clock with the default window.
pub fn encode(data: &Map<String, Value>) -> Result<String, ShareError> {
    ShareCodec::new().encode(data)
}

/// Decode on the system clock.
pub fn decode(token: &str) -> DecodeOutcome {
    ShareCodec::new().decode(token)
}

/// Reverse the transport encoding: base64url → inflate → UTF-8 → JSON object.
fn unpack(token: &str) -> Result<Map<String, Value>, &'static str> {
    let mut standard: String = token
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while standard.len() % 4 != 0 {
        standard.push('=');
    }

    let compressed = STANDARD.decode(standard.as_bytes()).map_err(|_| "base64")?;

    let mut inflated = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .take(MAX_PAYLOAD_BYTES as u64 + 1)
        .read_to_end(&mut inflated)
        .map_err(|_| "inflate")?;
    if inflated.len() > MAX_PAYLOAD_BYTES {
        return Err("payload too large");
    }

    let text = String::from_utf8(inflated).map_err(|_| "utf-8")?;
    match serde_json::from_str::<Value>(&text).map_err(|_| "json")? {
        Value::Object(record) => Ok(record),
        _ => Err("not an object"),
    }
}

fn expiry_millis(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_core::traits::clock::FixedClock;
    use serde_json::json;

    const HOUR_MS: i64 = 3_600_000;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    /// Build a token by hand from raw JSON text.
    fn raw_token(json: &str) -> String {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder.write_all(json.as_bytes()).unwrap();
        URL_SAFE_NO_PAD.encode(encoder.finish().unwrap())
    }

    #[test]
    fn test_round_trip_adds_expiry() {
        let data = object(json!({
            "type": "protocol",
            "name": "Recovery stack",
            "doseMcg": 250,
            "days": ["mon", "thu"],
            "nested": {"a": [1, 2, {"b": null}], "ok": true},
        }));

        let before = SystemClock.now_millis();
        let token = encode(&data).unwrap();
        let after = SystemClock.now_millis();

        let mut decoded = decode(&token).live().expect("token should be live");
        let expires_at = decoded
            .remove(EXPIRES_AT_FIELD)
            .and_then(|v| v.as_i64())
            .expect("expiresAt should be an integer");

        assert_eq!(decoded, data);
        assert!(expires_at >= before + 24 * HOUR_MS);
        assert!(expires_at <= after + 24 * HOUR_MS);
    }

    #[test]
    fn test_oversized_payload_is_refused() {
        let codec = ShareCodec::with_clock(FixedClock::at_millis(1_000));
        let huge = object(json!({"type": "protocol", "notes": "x".repeat(2 * 1024 * 1024)}));
        assert!(matches!(codec.encode(&huge), Err(ShareError::Encode(_))));
        assert_eq!(codec.encode_or_none(&huge), None);

        // Just under the limit still round-trips.
        let overhead = serde_json::to_vec(&object(json!({
            "type": "protocol",
            "notes": "",
            "expiresAt": 1_000 + 24 * HOUR_MS,
        })))
        .unwrap()
        .len();
        let fits = object(json!({
            "type": "protocol",
            "notes": "x".repeat(MAX_PAYLOAD_BYTES - overhead),
        }));
        let token = codec.encode(&fits).unwrap();
        let mut decoded = codec.decode(&token).live().expect("token at the limit decodes");
        decoded.remove(EXPIRES_AT_FIELD);
        assert_eq!(decoded, fits);
    }

    #[test]
    fn test_token_is_url_safe() {
        let samples = [
            json!({"type": "vendor", "name": "Acme Labs", "rating": 4}),
            json!({"type": "order", "notes": "ünïcødé ✓ +/= ?&#", "blob": "x".repeat(500)}),
            json!({}),
        ];
        for sample in samples {
            let token = encode(&object(sample)).unwrap();
            assert!(!token.is_empty());
            assert!(
                token
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
                "unexpected character in {token}"
            );
        }
    }

    #[test]
    fn test_deterministic_for_same_instant() {
        let clock = FixedClock::at_millis(1_700_000_000_000);
        let codec = ShareCodec::with_clock(clock);
        let data = object(json!({"type": "vendor", "name": "Acme Labs"}));
        assert_eq!(codec.encode(&data).unwrap(), codec.encode(&data).unwrap());
    }

    #[test]
    fn test_input_not_mutated() {
        let data = object(json!({"type": "vendor"}));
        let _ = encode(&data).unwrap();
        assert!(!data.contains_key(EXPIRES_AT_FIELD));
    }

    #[test]
    fn test_expired_one_millisecond_past() {
        let clock = FixedClock::at_millis(1_700_000_000_000);
        let codec = ShareCodec::with_clock(clock.clone());
        let expires_at = clock.now_millis() - 1;
        let token = raw_token(&format!(
            r#"{{"type":"vendor","name":"Old","expiresAt":{expires_at}}}"#
        ));

        assert_eq!(codec.decode(&token), DecodeOutcome::Expired { expires_at });
    }

    #[test]
    fn test_live_exactly_at_expiry() {
        let clock = FixedClock::at_millis(1_700_000_000_000);
        let codec = ShareCodec::with_clock(clock.clone());
        let token = raw_token(&format!(r#"{{"expiresAt":{}}}"#, clock.now_millis()));
        assert!(codec.decode(&token).is_live());
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let codec = ShareCodec::new();
        assert_eq!(codec.decode("not-a-valid-token!!"), DecodeOutcome::Corrupt);
        assert_eq!(codec.decode(""), DecodeOutcome::Corrupt);
        assert_eq!(codec.decode("a"), DecodeOutcome::Corrupt);
        assert_eq!(codec.decode("____"), DecodeOutcome::Corrupt);
        assert_eq!(codec.decode("🙂🙂🙂"), DecodeOutcome::Corrupt);
    }

    #[test]
    fn test_truncated_token_is_corrupt() {
        let data = object(json!({"type": "vendor", "name": "Acme Labs", "rating": 4}));
        let token = encode(&data).unwrap();
        let truncated = &token[..token.len() / 2];
        assert!(decode(truncated).is_corrupt());
    }

    #[test]
    fn test_non_object_payload_is_corrupt() {
        assert!(decode(&raw_token("[1,2,3]")).is_corrupt());
        assert!(decode(&raw_token("\"vendor\"")).is_corrupt());
        assert!(decode(&raw_token("{not json")).is_corrupt());
    }

    #[test]
    fn test_non_numeric_expiry_is_corrupt() {
        assert!(decode(&raw_token(r#"{"expiresAt":"tomorrow"}"#)).is_corrupt());
        assert!(decode(&raw_token(r#"{"expiresAt":null}"#)).is_corrupt());
    }

    #[test]
    fn test_zlib_framing_is_rejected() {
        let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"type":"vendor"}"#).unwrap();
        let token = URL_SAFE_NO_PAD.encode(encoder.finish().unwrap());
        assert!(decode(&token).is_corrupt());
    }

    #[test]
    fn test_token_is_raw_deflate() {
        let token = encode(&object(json!({"type": "vendor"}))).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(token).unwrap();
        let mut json = String::new();
        DeflateDecoder::new(bytes.as_slice())
            .read_to_string(&mut json)
            .unwrap();
        assert!(json.contains(r#""type":"vendor""#));
        assert!(json.contains(r#""expiresAt":"#));
    }

    #[test]
    fn test_standard_alphabet_tokens_still_decode() {
        let token = raw_token(r#"{"type":"vendor","name":"Acme"}"#);
        let standard = token.replace('-', "+").replace('_', "/");
        assert!(decode(&standard).is_live());
    }

    #[test]
    fn test_missing_expiry_is_live() {
        let token = raw_token(r#"{"type":"vendor","name":"Legacy Labs","rating":3}"#);
        let record = decode(&token).live().expect("legacy token should decode");
        assert_eq!(
            Value::Object(record),
            json!({"type": "vendor", "name": "Legacy Labs", "rating": 3})
        );
    }

    #[test]
    fn test_vendor_scenario_expires_after_25_hours() {
        let clock = FixedClock::now_frozen();
        let codec = ShareCodec::with_clock(clock.clone());
        let data = object(json!({"type": "vendor", "name": "Acme Labs", "rating": 4}));

        let token = codec.encode(&data).unwrap();

        let record = codec.decode(&token).live().expect("fresh token is live");
        assert_eq!(record["type"], "vendor");
        assert_eq!(record["name"], "Acme Labs");
        assert_eq!(record["rating"], 4);
        assert!(record[EXPIRES_AT_FIELD].is_number());

        // Decoding is idempotent inside the window.
        assert_eq!(codec.decode(&token), codec.decode(&token));

        clock.advance_hours(25);
        assert!(codec.decode(&token).is_expired());
    }

    #[test]
    fn test_custom_ttl() {
        let clock = FixedClock::at_millis(0);
        let codec = ShareCodec::with_clock(clock.clone()).with_ttl(Duration::from_secs(60));
        let token = codec.encode(&Map::new()).unwrap();

        clock.set_millis(60_000);
        assert!(codec.decode(&token).is_live());
        clock.set_millis(60_001);
        assert_eq!(
            codec.decode(&token),
            DecodeOutcome::Expired { expires_at: 60_000 }
        );
    }

    #[test]
    fn test_existing_expiry_is_overwritten() {
        let clock = FixedClock::at_millis(1_000);
        let codec = ShareCodec::with_clock(clock);
        let data = object(json!({"expiresAt": 5}));
        let record = codec.decode(&codec.encode(&data).unwrap()).live().unwrap();
        assert_eq!(record[EXPIRES_AT_FIELD], json!(1_000 + 24 * HOUR_MS));
    }

    #[test]
    fn test_encode_value_rejects_non_objects() {
        let codec = ShareCodec::new();
        let err = codec.encode_value(&vec![1, 2, 3]).unwrap_err();
        assert!(matches!(err, ShareError::Encode(_)));

        let mut bad_keys = std::collections::BTreeMap::new();
        bad_keys.insert((1, 2), "tuple keys are not JSON");
        assert!(matches!(
            codec.encode_value(&bad_keys),
            Err(ShareError::Encode(_))
        ));
    }

    #[test]
    fn test_encode_or_none() {
        let codec = ShareCodec::with_clock(FixedClock::at_millis(1_000));
        let token = codec
            .encode_or_none(&object(json!({"type": "vendor", "name": "Acme"})))
            .expect("plain record should encode");
        assert!(codec.decode(&token).is_live());
    }

    #[test]
    fn test_into_result() {
        assert!(matches!(
            DecodeOutcome::Corrupt.into_result(),
            Err(ShareError::Corrupt)
        ));
        assert!(matches!(
            DecodeOutcome::Expired { expires_at: 7 }.into_result(),
            Err(ShareError::Expired { expires_at: 7 })
        ));
    }
}
