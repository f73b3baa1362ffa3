use serde_json::{Value, json};
use time::OffsetDateTime;
use tracing::{debug, trace, warn};
use workflow_jwt::{JwtError, JwtResult, KeyMaterial, VerifyOptions, build_payload};

use crate::{
    JwtCredentials, NodeError, NodeResult, OperationParams, params::claims_source,
};

/// What to do with an item that fails: record the failure and keep going,
/// or abort the whole run attributed to the failing item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    #[default]
    Abort,
    ContinueOnFail,
}

/// One input item: the item's JSON payload (passed through on recorded
/// failures) and its operation parameters.
#[derive(Debug, Clone)]
pub struct InputItem {
    pub json: Value,
    pub params: OperationParams,
}

/// The outcome of one item, tied to the index of the item that produced
/// it.
#[derive(Debug)]
pub enum ItemResult {
    Success {
        index: usize,
        json: Value,
    },
    /// Recorded under [`ErrorPolicy::ContinueOnFail`]: the original item
    /// JSON is passed through unmodified, annotated with the error.
    Failure {
        index: usize,
        input: Value,
        error: JwtError,
    },
}

/// Process `items` strictly in input order, one [`ItemResult`] each.
///
/// The key material is resolved from the credentials once and reused
/// read-only by every item. Under [`ErrorPolicy::Abort`] the first failing
/// item stops the run with an error carrying its index; under
/// [`ErrorPolicy::ContinueOnFail`] failures are recorded and processing
/// continues. Failures are deterministic, so nothing is ever retried.
pub fn run(
    credentials: &JwtCredentials,
    items: Vec<InputItem>,
    policy: ErrorPolicy,
) -> NodeResult<Vec<ItemResult>> {
    let key = credentials.resolve_key();
    let mut results = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        trace!("run: item {index}: {}", item.params.operation_name());
        match execute_item(&key, &item.params) {
            Ok(json) => results.push(ItemResult::Success { index, json }),
            Err(error) => match policy {
                ErrorPolicy::ContinueOnFail => {
                    warn!("run: item {index} failed, continuing: {error}");
                    results.push(ItemResult::Failure {
                        index,
                        input: item.json,
                        error,
                    });
                }
                ErrorPolicy::Abort => return Err(NodeError::Item {
                    index,
                    source: error,
                }),
            },
        }
    }
    debug!("run: produced {} results", results.len());
    Ok(results)
}

fn execute_item(key: &KeyMaterial, params: &OperationParams) -> JwtResult<Value> {
    match params {
        OperationParams::Sign {
            algorithm,
            advanced_claim_builder,
            claims,
            claims_json,
        } => {
            let source = claims_source(*advanced_claim_builder, claims, claims_json);
            let now = OffsetDateTime::now_utc().unix_timestamp();
            let payload = build_payload(&source, now)?;
            let token = workflow_jwt::sign(&payload, key, *algorithm)?;
            Ok(json!({ "token": token }))
        }
        OperationParams::Verify {
            algorithm,
            token,
            complete,
            ignore_expiration,
            ignore_not_before,
            clock_tolerance,
        } => {
            let options = VerifyOptions {
                algorithms: vec![*algorithm],
                ignore_expiration: *ignore_expiration,
                ignore_not_before: *ignore_not_before,
                clock_tolerance: *clock_tolerance,
                complete: *complete,
            };
            workflow_jwt::verify(token, key, &options)
        }
        OperationParams::Decode { token, complete } => workflow_jwt::decode(token, *complete),
    }
}
