#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
use openssl::{pkey::PKey, rsa::Rsa};
use serde_json::{Value, json};
use workflow_jwt::JwtError;
use workflow_jwt_node::{
    ErrorPolicy, InputItem, ItemResult, JwtCredentials, KeyType, NodeError, OperationParams, run,
};

fn secret_credentials() -> JwtCredentials {
    JwtCredentials {
        key_type: KeyType::Passphrase,
        secret: Some("a shared secret".to_owned()),
        ..JwtCredentials::default()
    }
}

fn item_with(params_json: Value) -> InputItem {
    InputItem {
        json: json!({ "origin": "item" }),
        params: serde_json::from_value(params_json).unwrap(),
    }
}

fn single_success(results: Vec<ItemResult>) -> Value {
    assert_eq!(results.len(), 1);
    match results.into_iter().next().unwrap() {
        ItemResult::Success { index: 0, json } => json,
        other => panic!("expected a success for item 0, got: {other:?}"),
    }
}

#[test]
fn hs256_sign_then_verify_round_trips_claims() {
    let credentials = secret_credentials();
    let signed = run(
        &credentials,
        vec![item_with(json!({
            "operation": "sign",
            "algorithm": "HS256",
            "claims": { "subject": "abc", "issuer": "tests" },
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap();
    let token = single_success(signed)["token"].as_str().unwrap().to_owned();

    let verified = run(
        &credentials,
        vec![item_with(json!({
            "operation": "verify",
            "algorithm": "HS256",
            "token": token,
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap();
    let payload = single_success(verified);
    assert_eq!(payload["sub"], json!("abc"));
    assert_eq!(payload["iss"], json!("tests"));
    assert!(payload["iat"].is_i64());
}

#[test]
fn rsa_credentials_with_collapsed_pem_round_trip() {
    let rsa = Rsa::generate(2048).unwrap();
    let pkey = PKey::from_rsa(rsa).unwrap();
    let private_pem = String::from_utf8(pkey.private_key_to_pem_pkcs8().unwrap()).unwrap();
    let public_pem = String::from_utf8(pkey.public_key_to_pem().unwrap()).unwrap();

    // both PEM fields arrive with their newlines collapsed into spaces
    let signer = JwtCredentials {
        key_type: KeyType::PrivateKey,
        private_key: Some(private_pem.replace('\n', " ")),
        ..JwtCredentials::default()
    };
    let verifier = JwtCredentials {
        key_type: KeyType::PublicKey,
        public_key: Some(public_pem.replace('\n', " ")),
        ..JwtCredentials::default()
    };

    let signed = run(
        &signer,
        vec![item_with(json!({
            "operation": "sign",
            "algorithm": "RS256",
            "advancedClaimBuilder": true,
            "claimsJson": "{\"sub\":\"abc\"}",
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap();
    let token = single_success(signed)["token"].as_str().unwrap().to_owned();

    let verified = run(
        &verifier,
        vec![item_with(json!({
            "operation": "verify",
            "algorithm": "RS256",
            "token": token,
            "complete": true,
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap();
    let wrapped = single_success(verified);
    assert_eq!(wrapped["header"]["alg"], json!("RS256"));
    assert_eq!(wrapped["payload"]["sub"], json!("abc"));
}

#[test]
fn decode_operation_needs_no_key() {
    let credentials = secret_credentials();
    let signed = run(
        &credentials,
        vec![item_with(json!({
            "operation": "sign",
            "algorithm": "HS256",
            "claims": { "subject": "abc" },
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap();
    let token = single_success(signed)["token"].as_str().unwrap().to_owned();

    // decode with completely unrelated credentials
    let decoded = run(
        &JwtCredentials::default(),
        vec![item_with(json!({
            "operation": "decode",
            "token": token,
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap();
    assert_eq!(single_success(decoded)["sub"], json!("abc"));
}

#[test]
fn continue_on_fail_records_failure_and_keeps_going() {
    let credentials = secret_credentials();
    let items = vec![
        item_with(json!({
            "operation": "sign",
            "algorithm": "HS256",
            "claims": { "subject": "first" },
        })),
        InputItem {
            json: json!({ "origin": "bad item" }),
            params: serde_json::from_value(json!({
                "operation": "decode",
                "token": "not-a-token",
            }))
            .unwrap(),
        },
        item_with(json!({
            "operation": "sign",
            "algorithm": "HS256",
            "claims": { "subject": "third" },
        })),
    ];

    let results = run(&credentials, items, ErrorPolicy::ContinueOnFail).unwrap();
    assert_eq!(results.len(), 3);
    assert!(matches!(&results[0], ItemResult::Success { index: 0, .. }));
    match &results[1] {
        ItemResult::Failure {
            index: 1,
            input,
            error,
        } => {
            assert_eq!(input, &json!({ "origin": "bad item" }));
            assert!(matches!(error, JwtError::MalformedToken(_)));
        }
        other => panic!("expected a recorded failure for item 1, got: {other:?}"),
    }
    assert!(matches!(&results[2], ItemResult::Success { index: 2, .. }));
}

#[test]
fn abort_policy_attributes_the_failing_item() {
    let credentials = secret_credentials();
    let items = vec![
        item_with(json!({
            "operation": "sign",
            "algorithm": "HS256",
            "claims": { "subject": "first" },
        })),
        item_with(json!({
            "operation": "decode",
            "token": "not-a-token",
        })),
        item_with(json!({
            "operation": "sign",
            "algorithm": "HS256",
            "claims": { "subject": "never reached" },
        })),
    ];

    let err = run(&credentials, items, ErrorPolicy::Abort).unwrap_err();
    match err {
        NodeError::Item { index, source } => {
            assert_eq!(index, 1);
            assert!(matches!(source, JwtError::MalformedToken(_)));
        }
        other => panic!("expected an item error, got: {other}"),
    }
}

#[test]
fn invalid_advanced_claims_fail_before_any_key_is_touched() {
    // garbage key material: a ClaimParse error proves the claims were
    // rejected before the signer ever looked at the key
    let credentials = JwtCredentials {
        key_type: KeyType::PrivateKey,
        private_key: Some("garbage".to_owned()),
        ..JwtCredentials::default()
    };
    let err = run(
        &credentials,
        vec![item_with(json!({
            "operation": "sign",
            "algorithm": "RS256",
            "advancedClaimBuilder": true,
            "claimsJson": "{not json",
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap_err();
    match err {
        NodeError::Item { index: 0, source } => {
            assert!(matches!(source, JwtError::ClaimParse(_)));
        }
        other => panic!("expected a claim parse failure, got: {other}"),
    }
}

#[test]
fn unknown_key_type_fails_naturally_on_asymmetric_sign() {
    let credentials: JwtCredentials =
        serde_json::from_str(r#"{"keyType":"certificate"}"#).unwrap();
    let err = run(
        &credentials,
        vec![item_with(json!({
            "operation": "sign",
            "algorithm": "RS256",
            "claims": { "subject": "abc" },
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap_err();
    match err {
        NodeError::Item { index: 0, source } => {
            assert!(matches!(source, JwtError::InvalidKey(_)));
        }
        other => panic!("expected an invalid key failure, got: {other}"),
    }
}

#[test]
fn expired_token_fails_verify_unless_ignored() {
    let credentials = secret_credentials();
    let signed = run(
        &credentials,
        vec![item_with(json!({
            "operation": "sign",
            "algorithm": "HS256",
            "advancedClaimBuilder": true,
            "claimsJson": "{\"sub\":\"abc\",\"exp\":1}",
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap();
    let token = single_success(signed)["token"].as_str().unwrap().to_owned();

    let err = run(
        &credentials,
        vec![item_with(json!({
            "operation": "verify",
            "algorithm": "HS256",
            "token": token.clone(),
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap_err();
    match err {
        NodeError::Item { index: 0, source } => {
            assert!(matches!(source, JwtError::TokenExpired(_)));
        }
        other => panic!("expected an expired token failure, got: {other}"),
    }

    let verified = run(
        &credentials,
        vec![item_with(json!({
            "operation": "verify",
            "algorithm": "HS256",
            "token": token,
            "ignoreExpiration": true,
        }))],
        ErrorPolicy::Abort,
    )
    .unwrap();
    assert_eq!(single_success(verified)["sub"], json!("abc"));
}
