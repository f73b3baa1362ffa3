use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{JwtError, JwtResult};

/// The discrete claim fields of the standard claim builder. Field names
/// follow the host parameter store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimFields {
    pub audience: Option<String>,
    /// Lifetime of the token in seconds, turned into `exp = iat + expiresIn`.
    pub expires_in: Option<i64>,
    pub issuer: Option<String>,
    pub jwtid: Option<String>,
    /// Seconds from now before which the token must not be accepted,
    /// turned into `nbf = iat + notBefore`.
    pub not_before: Option<i64>,
    pub subject: Option<String>,
}

/// Where the claims of a token to sign come from: the discrete field
/// builder, or a raw JSON object string (advanced claim builder).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimsSource {
    Fields(ClaimFields),
    Json(String),
}

/// Build the JWT payload from the claim source, stamping `iat` with `now`
/// (Unix seconds). Raw JSON claims keep a caller-provided `iat` if one is
/// present.
///
/// Invalid or non-object raw JSON fails with [`JwtError::ClaimParse`]
/// before any key material is touched.
pub fn build_payload(source: &ClaimsSource, now: i64) -> JwtResult<Map<String, Value>> {
    let mut payload = match source {
        ClaimsSource::Fields(fields) => {
            let mut payload = Map::new();
            if let Some(audience) = &fields.audience {
                payload.insert("aud".to_owned(), json!(audience));
            }
            if let Some(issuer) = &fields.issuer {
                payload.insert("iss".to_owned(), json!(issuer));
            }
            if let Some(jwtid) = &fields.jwtid {
                payload.insert("jti".to_owned(), json!(jwtid));
            }
            if let Some(subject) = &fields.subject {
                payload.insert("sub".to_owned(), json!(subject));
            }
            if let Some(expires_in) = fields.expires_in {
                payload.insert("exp".to_owned(), json!(now + expires_in));
            }
            if let Some(not_before) = fields.not_before {
                payload.insert("nbf".to_owned(), json!(now + not_before));
            }
            payload
        }
        ClaimsSource::Json(raw) => {
            let value: Value = serde_json::from_str(raw)
                .map_err(|e| JwtError::ClaimParse(format!("claims are not valid JSON: {e}")))?;
            match value {
                Value::Object(map) => map,
                other => {
                    return Err(JwtError::ClaimParse(format!(
                        "claims must be a JSON object, got: {other}"
                    )));
                }
            }
        }
    };
    payload
        .entry("iat".to_owned())
        .or_insert_with(|| json!(now));
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{ClaimFields, ClaimsSource, build_payload};
    use crate::JwtError;

    #[test]
    fn discrete_fields_map_to_registered_claims() {
        let fields = ClaimFields {
            audience: Some("aud-1".to_owned()),
            expires_in: Some(3600),
            issuer: Some("iss-1".to_owned()),
            jwtid: Some("jti-1".to_owned()),
            not_before: Some(10),
            subject: Some("sub-1".to_owned()),
        };
        let payload = build_payload(&ClaimsSource::Fields(fields), 1_000).unwrap();
        assert_eq!(payload.get("aud"), Some(&json!("aud-1")));
        assert_eq!(payload.get("iss"), Some(&json!("iss-1")));
        assert_eq!(payload.get("jti"), Some(&json!("jti-1")));
        assert_eq!(payload.get("sub"), Some(&json!("sub-1")));
        assert_eq!(payload.get("exp"), Some(&json!(4_600)));
        assert_eq!(payload.get("nbf"), Some(&json!(1_010)));
        assert_eq!(payload.get("iat"), Some(&json!(1_000)));
    }

    #[test]
    fn empty_fields_only_stamp_iat() {
        let payload =
            build_payload(&ClaimsSource::Fields(ClaimFields::default()), 42).unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload.get("iat"), Some(&json!(42)));
    }

    #[test]
    fn raw_json_keeps_custom_claims_and_explicit_iat() {
        let source = ClaimsSource::Json(r#"{"sub":"abc","role":"admin","iat":7}"#.to_owned());
        let payload = build_payload(&source, 1_000).unwrap();
        assert_eq!(payload.get("sub"), Some(&json!("abc")));
        assert_eq!(payload.get("role"), Some(&json!("admin")));
        assert_eq!(payload.get("iat"), Some(&json!(7)));
    }

    #[test]
    fn invalid_json_claims_are_rejected() {
        let err = build_payload(&ClaimsSource::Json("{not json".to_owned()), 0).unwrap_err();
        assert!(matches!(err, JwtError::ClaimParse(_)));

        let err = build_payload(&ClaimsSource::Json("[1,2]".to_owned()), 0).unwrap_err();
        assert!(matches!(err, JwtError::ClaimParse(_)));
    }
}
