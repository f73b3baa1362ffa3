use std::str::FromStr;

use openssl::{
    bn::BigNum,
    ecdsa::EcdsaSig,
    memcmp,
    pkey::{HasPublic, Id, PKey},
    rsa::Padding,
    sign::{RsaPssSaltlen, Verifier},
};
use serde_json::{Value, json};
use time::OffsetDateTime;
use tracing::{debug, trace};

use crate::{
    Algorithm, AlgorithmFamily, JwtError, JwtResult, KeyMaterial, b64_decode, jwt_ensure,
    sign::hmac_sign, split_token,
};

/// Options controlling token verification.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// The algorithms the token's `alg` header is allowed to declare.
    pub algorithms: Vec<Algorithm>,
    /// Skip the `exp` claim check.
    pub ignore_expiration: bool,
    /// Skip the `nbf` claim check.
    pub ignore_not_before: bool,
    /// Leeway in seconds applied to both `exp` and `nbf` checks.
    pub clock_tolerance: u32,
    /// Return the `{header, payload, signature}` wrapper instead of the
    /// bare payload.
    pub complete: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            algorithms: vec![Algorithm::default()],
            ignore_expiration: false,
            ignore_not_before: false,
            clock_tolerance: 0,
            complete: false,
        }
    }
}

/// Verify a compact JWS and return its payload (or the complete wrapper).
///
/// Fails with [`JwtError::MalformedToken`] on structural problems,
/// [`JwtError::AlgorithmMismatch`] when the token's `alg` is not in the
/// allow-list, [`JwtError::InvalidSignature`] on a signature mismatch, and
/// [`JwtError::TokenExpired`] / [`JwtError::NotBefore`] on claim-time
/// failures (unless the corresponding option ignores them).
pub fn verify(token: &str, key: &KeyMaterial, options: &VerifyOptions) -> JwtResult<Value> {
    let (header_b64, payload_b64, signature_b64) = split_token(token)?;
    let header: Value = serde_json::from_slice(&b64_decode(header_b64)?)
        .map_err(|e| JwtError::MalformedToken(format!("header is not valid JSON: {e}")))?;
    let alg = header
        .get("alg")
        .and_then(Value::as_str)
        .ok_or_else(|| JwtError::MalformedToken("missing alg header".to_owned()))?;
    let algorithm = Algorithm::from_str(alg)
        .map_err(|_| JwtError::NotSupported(format!("unknown algorithm: {alg}")))?;
    jwt_ensure!(
        options.algorithms.contains(&algorithm),
        JwtError::AlgorithmMismatch(alg.to_owned())
    );
    trace!("verify: algorithm: {algorithm}");

    let signature = b64_decode(signature_b64)?;
    let signing_input = &token[..header_b64.len() + 1 + payload_b64.len()];
    check_signature(key, algorithm, signing_input, &signature)?;

    let payload: Value = serde_json::from_slice(&b64_decode(payload_b64)?)
        .map_err(|e| JwtError::MalformedToken(format!("payload is not valid JSON: {e}")))?;
    let now = OffsetDateTime::now_utc().unix_timestamp();
    check_timestamps(&payload, options, now)?;
    debug!("verify: {algorithm} token verified");

    if options.complete {
        Ok(json!({
            "header": header,
            "payload": payload,
            "signature": signature_b64,
        }))
    } else {
        Ok(payload)
    }
}

fn check_signature(
    key: &KeyMaterial,
    algorithm: Algorithm,
    signing_input: &str,
    signature: &[u8],
) -> JwtResult<()> {
    if algorithm.family() == AlgorithmFamily::Hmac {
        let expected = hmac_sign(key.secret_bytes()?, algorithm, signing_input)?;
        jwt_ensure!(
            expected.len() == signature.len() && memcmp::eq(&expected, signature),
            JwtError::InvalidSignature
        );
        return Ok(());
    }
    match key {
        KeyMaterial::PublicKey { pem } => {
            let pkey = PKey::public_key_from_pem(pem.as_bytes())
                .map_err(|e| JwtError::InvalidKey(format!("cannot parse PEM public key: {e}")))?;
            asymmetric_verify(&pkey, algorithm, signing_input, signature)
        }
        // a private key carries its public part, verification works too
        KeyMaterial::PrivateKey { .. } => {
            let pkey = key.signing_pkey()?;
            asymmetric_verify(&pkey, algorithm, signing_input, signature)
        }
        KeyMaterial::Secret(_) => Err(JwtError::InvalidKey(format!(
            "{algorithm} requires a PEM key, not a symmetric secret"
        ))),
    }
}

fn asymmetric_verify<T: HasPublic>(
    pkey: &PKey<T>,
    algorithm: Algorithm,
    signing_input: &str,
    signature: &[u8],
) -> JwtResult<()> {
    let valid = match algorithm.family() {
        AlgorithmFamily::Rsa | AlgorithmFamily::RsaPss => {
            if pkey.id() != Id::RSA {
                return Err(JwtError::InvalidKey(format!(
                    "{algorithm} requires an RSA key, got: {:?}",
                    pkey.id()
                )));
            }
            let mut verifier = Verifier::new(algorithm.message_digest(), pkey)?;
            if algorithm.family() == AlgorithmFamily::RsaPss {
                verifier.set_rsa_padding(Padding::PKCS1_PSS)?;
                verifier.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
            }
            verifier
                .verify_oneshot(signature, signing_input.as_bytes())
                .unwrap_or(false)
        }
        AlgorithmFamily::Ecdsa => {
            if pkey.id() != Id::EC {
                return Err(JwtError::InvalidKey(format!(
                    "{algorithm} requires an EC key, got: {:?}",
                    pkey.id()
                )));
            }
            let der = ecdsa_jose_to_der(signature, algorithm)?;
            let mut verifier = Verifier::new(algorithm.message_digest(), pkey)?;
            verifier
                .verify_oneshot(&der, signing_input.as_bytes())
                .unwrap_or(false)
        }
        AlgorithmFamily::Hmac => {
            return Err(JwtError::InvalidKey(
                "HMAC algorithms use a symmetric secret".to_owned(),
            ));
        }
    };
    jwt_ensure!(valid, JwtError::InvalidSignature);
    Ok(())
}

/// Convert the raw fixed-width `r || s` JOSE signature back into the DER
/// form OpenSSL verifies.
fn ecdsa_jose_to_der(signature: &[u8], algorithm: Algorithm) -> JwtResult<Vec<u8>> {
    let component_len = algorithm.ecdsa_component_len();
    jwt_ensure!(
        signature.len() == 2 * component_len,
        JwtError::InvalidSignature
    );
    let r = BigNum::from_slice(&signature[..component_len])?;
    let s = BigNum::from_slice(&signature[component_len..])?;
    Ok(EcdsaSig::from_private_components(r, s)?.to_der()?)
}

fn check_timestamps(payload: &Value, options: &VerifyOptions, now: i64) -> JwtResult<()> {
    let tolerance = i64::from(options.clock_tolerance);
    if !options.ignore_expiration {
        if let Some(exp) = time_claim(payload, "exp")? {
            jwt_ensure!(now < exp + tolerance, JwtError::TokenExpired(exp));
        }
    }
    if !options.ignore_not_before {
        if let Some(nbf) = time_claim(payload, "nbf")? {
            jwt_ensure!(nbf <= now + tolerance, JwtError::NotBefore(nbf));
        }
    }
    Ok(())
}

/// Read a NumericDate claim. A claim that is present but not a number is
/// an error, not a pass; fractional timestamps are truncated toward zero.
fn time_claim(payload: &Value, claim: &str) -> JwtResult<Option<i64>> {
    let Some(value) = payload.get(claim) else {
        return Ok(None);
    };
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|seconds| seconds as i64))
        .map(Some)
        .ok_or_else(|| JwtError::MalformedToken(format!("invalid {claim} value: {value}")))
}
