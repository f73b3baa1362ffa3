//! JWT primitives for workflow execution.
//!
//! This crate provides the cryptographic core of the JWT workflow unit:
//! compact JWS signing, verification and decoding over OpenSSL, claim-set
//! construction, and the lenient PEM normalization that repairs key
//! material mangled by text inputs which collapse newlines into spaces.
//!
//! All twelve JOSE signature algorithms are supported (HS/RS/PS/ES with
//! SHA-256/384/512), including passphrase-encrypted private keys.

mod algorithm;
mod claims;
mod decode;
pub mod error;
mod key;
mod sign;
mod verify;

pub use algorithm::{Algorithm, AlgorithmFamily};
pub use claims::{ClaimFields, ClaimsSource, build_payload};
pub use decode::decode;
pub use error::{JwtError, result::JwtResult};
pub use key::{KeyMaterial, normalize_key_text};
pub use sign::sign;
pub use verify::{VerifyOptions, verify};

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

/// Split a compact JWS into its three dot-separated segments.
pub(crate) fn split_token(token: &str) -> JwtResult<(&str, &str, &str)> {
    let mut segments = token.split('.');
    match (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) {
        (Some(header), Some(payload), Some(signature), None) => Ok((header, payload, signature)),
        _ => Err(JwtError::MalformedToken(format!(
            "expected 3 dot-separated segments, got {}",
            token.split('.').count()
        ))),
    }
}

pub(crate) fn b64_encode(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

pub(crate) fn b64_decode(segment: &str) -> JwtResult<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|e| JwtError::MalformedToken(format!("invalid base64url segment: {e}")))
}
