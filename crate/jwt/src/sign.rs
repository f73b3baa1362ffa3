use openssl::{
    ecdsa::EcdsaSig,
    pkey::{Id, PKey},
    rsa::Padding,
    sign::{RsaPssSaltlen, Signer},
};
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use crate::{
    Algorithm, AlgorithmFamily, JwtError, JwtResult, KeyMaterial, b64_encode,
    error::result::JwtResultHelper,
};

/// Sign `payload` into a compact JWS with the given algorithm and key
/// material.
///
/// HMAC algorithms require [`KeyMaterial::Secret`]; RSA, RSA-PSS and ECDSA
/// algorithms require [`KeyMaterial::PrivateKey`] (decrypted with its
/// passphrase when one is attached). A key whose type does not match the
/// algorithm family fails with [`JwtError::InvalidKey`].
pub fn sign(
    payload: &Map<String, Value>,
    key: &KeyMaterial,
    algorithm: Algorithm,
) -> JwtResult<String> {
    trace!("sign: algorithm: {algorithm}");
    let header = json!({ "alg": algorithm.to_string(), "typ": "JWT" });
    let header_json = serde_json::to_vec(&header).context("sign: serializing header")?;
    let payload_json = serde_json::to_vec(payload).context("sign: serializing payload")?;
    let signing_input = format!("{}.{}", b64_encode(&header_json), b64_encode(&payload_json));

    let signature = match algorithm.family() {
        AlgorithmFamily::Hmac => hmac_sign(key.secret_bytes()?, algorithm, &signing_input)?,
        AlgorithmFamily::Rsa | AlgorithmFamily::RsaPss | AlgorithmFamily::Ecdsa => {
            asymmetric_sign(key, algorithm, &signing_input)?
        }
    };
    debug!(
        "sign: {algorithm} signature of {} bytes over {} input bytes",
        signature.len(),
        signing_input.len()
    );
    Ok(format!("{signing_input}.{}", b64_encode(&signature)))
}

pub(crate) fn hmac_sign(
    secret: &[u8],
    algorithm: Algorithm,
    signing_input: &str,
) -> JwtResult<Vec<u8>> {
    let pkey = PKey::hmac(secret)
        .map_err(|e| JwtError::InvalidKey(format!("cannot build HMAC key: {e}")))?;
    let mut signer = Signer::new(algorithm.message_digest(), &pkey)?;
    Ok(signer.sign_oneshot_to_vec(signing_input.as_bytes())?)
}

fn asymmetric_sign(
    key: &KeyMaterial,
    algorithm: Algorithm,
    signing_input: &str,
) -> JwtResult<Vec<u8>> {
    let pkey = key.signing_pkey()?;
    match algorithm.family() {
        AlgorithmFamily::Rsa | AlgorithmFamily::RsaPss => {
            if pkey.id() != Id::RSA {
                return Err(JwtError::InvalidKey(format!(
                    "{algorithm} requires an RSA private key, got: {:?}",
                    pkey.id()
                )));
            }
            let mut signer = Signer::new(algorithm.message_digest(), &pkey)?;
            if algorithm.family() == AlgorithmFamily::RsaPss {
                signer.set_rsa_padding(Padding::PKCS1_PSS)?;
                signer.set_rsa_pss_saltlen(RsaPssSaltlen::DIGEST_LENGTH)?;
            }
            Ok(signer.sign_oneshot_to_vec(signing_input.as_bytes())?)
        }
        AlgorithmFamily::Ecdsa => {
            if pkey.id() != Id::EC {
                return Err(JwtError::InvalidKey(format!(
                    "{algorithm} requires an EC private key, got: {:?}",
                    pkey.id()
                )));
            }
            let mut signer = Signer::new(algorithm.message_digest(), &pkey)?;
            let der = signer.sign_oneshot_to_vec(signing_input.as_bytes())?;
            ecdsa_der_to_jose(&der, algorithm)
        }
        AlgorithmFamily::Hmac => Err(JwtError::InvalidKey(
            "HMAC algorithms use a symmetric secret".to_owned(),
        )),
    }
}

/// Convert the DER `SEQUENCE { r, s }` OpenSSL produces into the raw
/// fixed-width `r || s` form JOSE requires.
fn ecdsa_der_to_jose(der: &[u8], algorithm: Algorithm) -> JwtResult<Vec<u8>> {
    let component_len = i32::try_from(algorithm.ecdsa_component_len())
        .context("sign: ECDSA component length overflow")?;
    let signature = EcdsaSig::from_der(der)?;
    let mut jose = signature.r().to_vec_padded(component_len).map_err(|e| {
        JwtError::InvalidKey(format!("EC key does not match the {algorithm} curve: {e}"))
    })?;
    jose.extend(signature.s().to_vec_padded(component_len).map_err(|e| {
        JwtError::InvalidKey(format!("EC key does not match the {algorithm} curve: {e}"))
    })?);
    Ok(jose)
}
