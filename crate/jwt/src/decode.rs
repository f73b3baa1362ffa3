use serde_json::{Value, json};
use tracing::trace;

use crate::{JwtError, JwtResult, b64_decode, split_token};

/// Decode a compact JWS without checking its signature.
///
/// Returns the payload object, or the `{header, payload, signature}`
/// wrapper when `complete` is set (the signature stays in its base64url
/// form). A structurally invalid token fails with
/// [`JwtError::MalformedToken`] rather than producing a null result.
pub fn decode(token: &str, complete: bool) -> JwtResult<Value> {
    let (header_b64, payload_b64, signature_b64) = split_token(token)?;
    let header: Value = serde_json::from_slice(&b64_decode(header_b64)?)
        .map_err(|e| JwtError::MalformedToken(format!("header is not valid JSON: {e}")))?;
    let payload: Value = serde_json::from_slice(&b64_decode(payload_b64)?)
        .map_err(|e| JwtError::MalformedToken(format!("payload is not valid JSON: {e}")))?;
    trace!("decode: decoded token payload, complete: {complete}");
    if complete {
        Ok(json!({
            "header": header,
            "payload": payload,
            "signature": signature_b64,
        }))
    } else {
        Ok(payload)
    }
}
