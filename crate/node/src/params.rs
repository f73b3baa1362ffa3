use serde::{Deserialize, Serialize};
use workflow_jwt::{Algorithm, ClaimFields, ClaimsSource};

/// The per-item operation parameters read from the host parameter store,
/// tagged by the `operation` field so that handling all three operations
/// is statically exhaustive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "operation",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum OperationParams {
    Sign {
        #[serde(default)]
        algorithm: Algorithm,
        /// When set, claims come from `claimsJson` instead of the
        /// discrete claim fields.
        #[serde(default)]
        advanced_claim_builder: bool,
        #[serde(default)]
        claims: ClaimFields,
        #[serde(default)]
        claims_json: String,
    },
    Verify {
        #[serde(default)]
        algorithm: Algorithm,
        #[serde(default)]
        token: String,
        #[serde(default)]
        complete: bool,
        #[serde(default)]
        ignore_expiration: bool,
        #[serde(default)]
        ignore_not_before: bool,
        /// Leeway in seconds when checking `exp` and `nbf`.
        #[serde(default)]
        clock_tolerance: u32,
    },
    Decode {
        #[serde(default)]
        token: String,
        #[serde(default)]
        complete: bool,
    },
}

impl OperationParams {
    pub(crate) const fn operation_name(&self) -> &'static str {
        match self {
            Self::Sign { .. } => "sign",
            Self::Verify { .. } => "verify",
            Self::Decode { .. } => "decode",
        }
    }
}

/// The claim source a sign item selected with its `advancedClaimBuilder`
/// flag.
pub(crate) fn claims_source(
    advanced_claim_builder: bool,
    claims: &ClaimFields,
    claims_json: &str,
) -> ClaimsSource {
    if advanced_claim_builder {
        ClaimsSource::Json(claims_json.to_owned())
    } else {
        ClaimsSource::Fields(claims.clone())
    }
}
