// session-client/src/token.rs
//
// Pure, side-effect-free decoding of bearer tokens. The signature is NOT
// verified here; that is the server's job. The client only needs the
// payload claims for a provisional identity and the expiry check.

use serde_json::{Map, Value};

use common::models::claims::Claims;

use crate::error::DecodeError;

// Claim lookup tables, consulted in fixed preference order: conventional
// short names first, then the long-form namespaced URIs some issuers emit.
// The first key present wins, which keeps the precedence rule testable.
const SUBJECT_KEYS: &[&str] = &[
    "sub",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier",
];
const NAME_KEYS: &[&str] = &[
    "name",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
];
const EMAIL_KEYS: &[&str] = &[
    "email",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress",
];
const ROLE_KEYS: &[&str] = &[
    "role",
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/role",
];
const GROUP_KEYS: &[&str] = &[
    "groupId",
    "group_id",
    "http://schemas.microsoft.com/ws/2008/06/identity/claims/groupsid",
];

/// Decode a bearer token into [`Claims`] without verifying its signature.
///
/// The token must be exactly three dot-separated segments with a
/// base64url-encoded JSON payload in the middle. A missing `exp` claim is
/// treated as malformed (fail-closed), not as "never expires".
///
/// Deterministic, no side effects, safe to call any number of times.
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::MalformedToken(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let payload = decode_segment(segments[1])?;
    let value: Value = serde_json::from_slice(&payload).map_err(|e| {
        DecodeError::MalformedToken(format!("payload is not valid JSON: {}", e))
    })?;
    let claims = value.as_object().ok_or_else(|| {
        DecodeError::MalformedToken("payload is not a JSON object".to_string())
    })?;

    let exp = first_i64(claims, &["exp"]).ok_or_else(|| {
        DecodeError::MalformedToken("missing exp claim".to_string())
    })?;

    let sub = first_string(claims, SUBJECT_KEYS).unwrap_or_default();

    Ok(Claims {
        sub,
        name: first_string(claims, NAME_KEYS),
        email: first_string(claims, EMAIL_KEYS),
        is_admin: admin_flag(claims),
        group_id: first_i64(claims, GROUP_KEYS),
        iat: first_i64(claims, &["iat"]),
        exp,
    })
}

/// Base64url-decode a token segment. Tokens are normally unpadded, but
/// some issuers pad, so both forms are accepted.
fn decode_segment(segment: &str) -> Result<Vec<u8>, DecodeError> {
    base64::decode_config(segment, base64::URL_SAFE_NO_PAD)
        .or_else(|_| base64::decode_config(segment, base64::URL_SAFE))
        .map_err(|e| DecodeError::MalformedToken(format!("payload base64 decode failed: {}", e)))
}

/// First present key wins. String values are taken as-is; numbers are
/// stringified, since some issuers encode the subject as a number.
fn first_string(claims: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match claims.get(*key) {
            Some(Value::String(s)) => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// First present key wins. Accepts numbers and numeric strings.
fn first_i64(claims: &Map<String, Value>, keys: &[&str]) -> Option<i64> {
    for key in keys {
        match claims.get(*key) {
            Some(Value::Number(n)) => return n.as_i64(),
            Some(Value::String(s)) => return s.parse().ok(),
            _ => {}
        }
    }
    None
}

/// Admin flag: an explicit boolean `isAdmin` claim wins; otherwise a role
/// claim (string or array of strings) equal to "admin", case-insensitive.
fn admin_flag(claims: &Map<String, Value>) -> bool {
    if let Some(Value::Bool(flag)) = claims.get("isAdmin") {
        return *flag;
    }
    for key in ROLE_KEYS {
        match claims.get(*key) {
            Some(Value::String(role)) => return role.eq_ignore_ascii_case("admin"),
            Some(Value::Array(roles)) => {
                return roles
                    .iter()
                    .filter_map(Value::as_str)
                    .any(|role| role.eq_ignore_ascii_case("admin"));
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Build a three-segment token around an arbitrary JSON payload.
    /// The signature segment is junk; decode never looks at it.
    fn token_with_payload(payload: &Value) -> String {
        let header = base64::encode_config(
            serde_json::to_vec(&json!({"alg": "HS256", "typ": "JWT"})).unwrap(),
            base64::URL_SAFE_NO_PAD,
        );
        let body = base64::encode_config(
            serde_json::to_vec(payload).unwrap(),
            base64::URL_SAFE_NO_PAD,
        );
        format!("{}.{}.sig", header, body)
    }

    #[test]
    fn test_decode_round_trips_exp() {
        let token = token_with_payload(&json!({"sub": "1", "exp": 1_893_456_000}));
        let claims = decode(&token).unwrap();
        assert_eq!(claims.exp, 1_893_456_000);
    }

    #[test]
    fn test_decode_short_claim_names() {
        let token = token_with_payload(&json!({
            "sub": "42",
            "name": "Ada",
            "email": "ada@example.com",
            "role": "Admin",
            "groupId": 7,
            "iat": 1_700_000_000,
            "exp": 1_893_456_000
        }));

        let claims = decode(&token).unwrap();

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.name.as_deref(), Some("Ada"));
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
        assert!(claims.is_admin);
        assert_eq!(claims.group_id, Some(7));
        assert_eq!(claims.iat, Some(1_700_000_000));
    }

    #[test]
    fn test_decode_long_form_claim_uris() {
        let token = token_with_payload(&json!({
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier": "9",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name": "Grace",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress": "g@x.com",
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/role": "admin",
            "http://schemas.microsoft.com/ws/2008/06/identity/claims/groupsid": "3",
            "exp": 1_893_456_000
        }));

        let claims = decode(&token).unwrap();

        assert_eq!(claims.sub, "9");
        assert_eq!(claims.name.as_deref(), Some("Grace"));
        assert_eq!(claims.email.as_deref(), Some("g@x.com"));
        assert!(claims.is_admin);
        assert_eq!(claims.group_id, Some(3));
    }

    #[test]
    fn test_decode_short_names_win_over_long_form() {
        let token = token_with_payload(&json!({
            "sub": "short",
            "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier": "long",
            "exp": 1_893_456_000
        }));

        assert_eq!(decode(&token).unwrap().sub, "short");
    }

    #[test]
    fn test_decode_numeric_subject_is_stringified() {
        let token = token_with_payload(&json!({"sub": 17, "exp": 1_893_456_000}));
        assert_eq!(decode(&token).unwrap().sub, "17");
    }

    #[test]
    fn test_decode_is_admin_boolean_claim_wins() {
        let token = token_with_payload(&json!({
            "isAdmin": true,
            "role": "viewer",
            "exp": 1_893_456_000
        }));
        assert!(decode(&token).unwrap().is_admin);
    }

    #[test]
    fn test_decode_role_array_detects_admin() {
        let token = token_with_payload(&json!({
            "role": ["viewer", "Admin"],
            "exp": 1_893_456_000
        }));
        assert!(decode(&token).unwrap().is_admin);
    }

    #[test]
    fn test_decode_non_admin_role() {
        let token = token_with_payload(&json!({"role": "viewer", "exp": 1_893_456_000}));
        assert!(!decode(&token).unwrap().is_admin);
    }

    #[test]
    fn test_decode_rejects_wrong_segment_count() {
        for bad in ["", "abc", "a.b", "a.b.c.d"] {
            assert!(
                matches!(decode(bad), Err(DecodeError::MalformedToken(_))),
                "should reject {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_decode_rejects_invalid_base64_payload() {
        let result = decode("header.!!!not-base64!!!.sig");
        assert!(matches!(result, Err(DecodeError::MalformedToken(_))));
    }

    #[test]
    fn test_decode_rejects_non_json_payload() {
        let body = base64::encode_config(b"not json at all", base64::URL_SAFE_NO_PAD);
        let result = decode(&format!("h.{}.s", body));
        assert!(matches!(result, Err(DecodeError::MalformedToken(_))));
    }

    #[test]
    fn test_decode_rejects_non_object_payload() {
        let body = base64::encode_config(b"[1, 2, 3]", base64::URL_SAFE_NO_PAD);
        let result = decode(&format!("h.{}.s", body));
        assert!(matches!(result, Err(DecodeError::MalformedToken(_))));
    }

    #[test]
    fn test_decode_rejects_missing_exp() {
        // Fail-closed: a token without exp is malformed, not "never expires".
        let token = token_with_payload(&json!({"sub": "1", "name": "Ada"}));
        assert!(matches!(decode(&token), Err(DecodeError::MalformedToken(_))));
    }

    #[test]
    fn test_decode_accepts_padded_base64() {
        let body = base64::encode_config(
            serde_json::to_vec(&json!({"sub": "1", "exp": 1_893_456_000})).unwrap(),
            base64::URL_SAFE,
        );
        let claims = decode(&format!("h.{}.s", body)).unwrap();
        assert_eq!(claims.sub, "1");
    }

    #[test]
    fn test_decode_accepts_jsonwebtoken_issued_token() {
        // A token minted by a real JWT library must decode the same way.
        use jsonwebtoken::{encode, EncodingKey, Header};
        use serde::Serialize;

        #[derive(Serialize)]
        struct Minted {
            sub: String,
            email: String,
            exp: i64,
            iat: i64,
        }

        let token = encode(
            &Header::default(),
            &Minted {
                sub: "31".to_string(),
                email: "counsel@example.com".to_string(),
                exp: 1_893_456_000,
                iat: 1_700_000_000,
            },
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        let claims = decode(&token).unwrap();
        assert_eq!(claims.sub, "31");
        assert_eq!(claims.email.as_deref(), Some("counsel@example.com"));
        assert_eq!(claims.exp, 1_893_456_000);
        assert_eq!(claims.iat, Some(1_700_000_000));
    }
}
