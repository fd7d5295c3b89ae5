//! # Init-Data Protocol Properties
//!
//! Black-box tests of the public API against an independent reference
//! computation of the platform's signing contract.
//!
//! ## Test Categories
//!
//! 1. **Canonicalization** - order independence, round-trip under reordering
//! 2. **Tamper Detection** - any flipped signature character is rejected
//! 3. **Freshness** - window boundary, disabled window
//! 4. **End-to-End** - reference-signed payload, right and wrong credential

use hmac::{Hmac, Mac};
use ma_01_init_data::{
    canonicalize, parse, validate, FieldSet, FixedClock, InitDataError,
    InitDataService, InitDataVerificationApi, MalformedReason, PlatformCredential,
};
use proptest::prelude::*;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// TEST HELPERS
// =============================================================================

const T: u64 = 1_700_000_000;

/// Reference signer written directly against the published contract.
fn reference_hash(token: &str, pairs: &[(&str, &str)]) -> String {
    let mut sorted: Vec<_> = pairs.to_vec();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    let data_check_string = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut mac = HmacSha256::new_from_slice(b"WebAppData").unwrap();
    mac.update(token.as_bytes());
    let secret = mac.finalize().into_bytes();

    let mut mac = HmacSha256::new_from_slice(&secret).unwrap();
    mac.update(data_check_string.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn encode(pairs: &[(&str, &str)], hash: &str) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .append_pair("hash", hash)
        .finish()
}

fn scenario_pairs() -> Vec<(&'static str, &'static str)> {
    vec![
        ("user", r#"{"id":42,"first_name":"Ann"}"#),
        ("auth_date", "1700000000"),
        ("query_id", "AAA"),
    ]
}

// =============================================================================
// END-TO-END SCENARIO
// =============================================================================

#[test]
fn test_reference_signed_payload_is_accepted() {
    let pairs = scenario_pairs();
    let raw = encode(&pairs, &reference_hash("BOTTOKEN123", &pairs));

    let claims = validate(&raw, &PlatformCredential::new("BOTTOKEN123"), None, T).unwrap();
    assert_eq!(claims.user_id(), Some(42));
    assert_eq!(claims.user.unwrap().first_name, "Ann");
    assert_eq!(claims.query_id.as_deref(), Some("AAA"));
    assert_eq!(claims.auth_date, Some(T));
}

#[test]
fn test_reference_signed_payload_with_wrong_credential() {
    let pairs = scenario_pairs();
    let raw = encode(&pairs, &reference_hash("BOTTOKEN123", &pairs));

    let result = InitDataService::with_clock(PlatformCredential::new("WRONGTOKEN"), FixedClock(T))
        .verify(&raw, None);
    assert!(!result.valid);
    assert_eq!(result.error, Some(InitDataError::SignatureMismatch));
}

#[test]
fn test_service_signer_matches_reference() {
    let svc = InitDataService::with_clock(PlatformCredential::new("BOTTOKEN123"), FixedClock(T));
    let fields = FieldSet::try_from_pairs(
        scenario_pairs()
            .into_iter()
            .filter(|(k, _)| *k != "auth_date"),
    )
    .unwrap();

    let raw = svc.sign(fields);
    let parsed = parse(&raw).unwrap();
    assert_eq!(
        parsed.signature.as_str(),
        reference_hash("BOTTOKEN123", &scenario_pairs())
    );
}

#[test]
fn test_real_world_shaped_payload() {
    // Percent-encoded JSON, '+' spaces and a third-party signature field
    let pairs = [
        ("query_id", "AAHdF6IQAAAAAN0XohDhrOrc"),
        (
            "user",
            r#"{"id":279058397,"first_name":"Vladislav","last_name":"Kibenko","username":"vdkfrost","language_code":"ru","is_premium":true,"allows_write_to_pm":true,"photo_url":"https:\/\/t.me\/i\/userpic\/320\/x.svg"}"#,
        ),
        ("auth_date", "1662771648"),
        ("signature", "6fbdaab833d39f54518bd5c3eb3f511d"),
        ("start_param", "hello world"),
    ];
    let raw = encode(&pairs, &reference_hash("5768337691:AAH5YkoiEuPk8-FZa32hStHTqXiLPtAEhx8", &pairs));
    assert!(raw.contains("hello+world"));

    let claims = validate(
        &raw,
        &PlatformCredential::new("5768337691:AAH5YkoiEuPk8-FZa32hStHTqXiLPtAEhx8"),
        Some(86_400),
        1_662_771_648 + 10,
    )
    .unwrap();
    assert_eq!(claims.user_id(), Some(279058397));
    assert_eq!(claims.start_param.as_deref(), Some("hello world"));
    assert!(claims.signature.is_some());
}

// =============================================================================
// TAMPER DETECTION
// =============================================================================

#[test]
fn test_any_flipped_signature_character_is_rejected() {
    let pairs = scenario_pairs();
    let hash = reference_hash("BOTTOKEN123", &pairs);
    let credential = PlatformCredential::new("BOTTOKEN123");

    for i in 0..hash.len() {
        let mut chars: Vec<char> = hash.chars().collect();
        chars[i] = if chars[i] == '0' { '1' } else { '0' };
        let tampered: String = chars.into_iter().collect();

        let raw = encode(&pairs, &tampered);
        assert_eq!(
            validate(&raw, &credential, None, T).unwrap_err(),
            InitDataError::SignatureMismatch,
            "flip at position {i} went unnoticed"
        );
    }
}

#[test]
fn test_tampered_field_value_is_rejected() {
    let pairs = scenario_pairs();
    let raw = encode(&pairs, &reference_hash("BOTTOKEN123", &pairs));
    let forged = raw.replace("%22id%22%3A42", "%22id%22%3A43");
    assert_ne!(raw, forged);

    assert_eq!(
        validate(&forged, &PlatformCredential::new("BOTTOKEN123"), None, T).unwrap_err(),
        InitDataError::SignatureMismatch
    );
}

#[test]
fn test_double_encoded_payload_is_rejected() {
    // A proxy that re-encodes the payload changes what the canonical string sees
    let pairs = scenario_pairs();
    let raw = encode(&pairs, &reference_hash("BOTTOKEN123", &pairs));
    let double: String = form_urlencoded::byte_serialize(raw.as_bytes()).collect();

    assert!(validate(&double, &PlatformCredential::new("BOTTOKEN123"), None, T).is_err());
}

#[test]
fn test_unsigned_payload_is_malformed() {
    let pairs = scenario_pairs();
    let raw = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter())
        .finish();

    assert_eq!(
        validate(&raw, &PlatformCredential::new("BOTTOKEN123"), None, T).unwrap_err(),
        InitDataError::MalformedPayload(MalformedReason::MissingHash)
    );
}

// =============================================================================
// FRESHNESS
// =============================================================================

#[test]
fn test_expiry_boundary() {
    let pairs = scenario_pairs();
    let raw = encode(&pairs, &reference_hash("BOTTOKEN123", &pairs));
    let credential = PlatformCredential::new("BOTTOKEN123");

    assert!(validate(&raw, &credential, Some(3600), T + 3600).is_ok());
    assert!(matches!(
        validate(&raw, &credential, Some(3600), T + 3601),
        Err(InitDataError::Expired { auth_date: Some(T), .. })
    ));
    assert!(validate(&raw, &credential, None, T + 10 * 365 * 86_400).is_ok());
}

// =============================================================================
// CANONICALIZATION PROPERTIES
// =============================================================================

fn field_map() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::btree_map("[a-z_]{1,12}", "[ -~]{0,24}", 0..8).prop_map(|m| {
        m.into_iter()
            .filter(|(k, _)| k != "hash")
            .collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn prop_canonical_string_is_order_independent(
        pairs in field_map(),
        seed in any::<u64>(),
    ) {
        let mut shuffled = pairs.clone();
        // Deterministic permutation driven by the seed
        let n = shuffled.len();
        if n > 1 {
            for i in (1..n).rev() {
                let j = (seed.wrapping_mul(i as u64 + 31) % (i as u64 + 1)) as usize;
                shuffled.swap(i, j);
            }
        }

        let a = FieldSet::try_from_pairs(pairs.clone()).unwrap();
        let b = FieldSet::try_from_pairs(shuffled.clone()).unwrap();
        prop_assert_eq!(canonicalize(&a), canonicalize(&b));

        // Same property through the parser on re-serialized payloads
        let raw_a = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs.iter())
            .append_pair("hash", "00")
            .finish();
        let raw_b = form_urlencoded::Serializer::new(String::new())
            .append_pair("hash", "00")
            .extend_pairs(shuffled.iter())
            .finish();
        prop_assert_eq!(parse(&raw_a).unwrap().canonical, parse(&raw_b).unwrap().canonical);
    }

    #[test]
    fn prop_values_survive_encoding_exactly(pairs in field_map()) {
        let raw = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs.iter())
            .append_pair("hash", "00")
            .finish();
        let parsed = parse(&raw).unwrap();
        prop_assert_eq!(parsed.fields.len(), pairs.len());
        for (k, v) in &pairs {
            prop_assert_eq!(parsed.fields.get(k), Some(v.as_str()));
        }
    }

    #[test]
    fn prop_signed_payloads_verify(pairs in field_map(), auth_date in 0u64..4_000_000_000) {
        let credential = PlatformCredential::new("BOTTOKEN123");
        let fields = FieldSet::try_from_pairs(
            pairs.into_iter().filter(|(k, _)| !is_typed_field(k)),
        ).unwrap();
        let raw = ma_01_init_data::sign(fields, &credential, auth_date);
        prop_assert!(validate(&raw, &credential, Some(0), auth_date).is_ok());
    }
}

/// Typed claim fields would need well-formed JSON or integers.
fn is_typed_field(key: &str) -> bool {
    matches!(key, "auth_date" | "can_send_after" | "user" | "receiver" | "chat")
}
