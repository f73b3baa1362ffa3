use thiserror::Error;
use workflow_jwt::JwtError;

pub type NodeResult<R> = Result<R, NodeError>;

#[derive(Error, Debug)]
pub enum NodeError {
    /// A per-item failure enriched with the index of the failing item,
    /// raised when the run aborts on the first failure.
    #[error("item {index}: {source}")]
    Item {
        index: usize,
        #[source]
        source: JwtError,
    },

    #[error(transparent)]
    Jwt(#[from] JwtError),
}
