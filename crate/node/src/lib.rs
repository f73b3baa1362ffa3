//! The JWT workflow unit.
//!
//! Glues the host engine to the [`workflow_jwt`] primitives: resolves the
//! signing/verification key once from the host credential object, then
//! dispatches each input item to the sign, verify or decode operation and
//! collects one result (or one recorded failure) per item, in input order.

mod credentials;
mod error;
mod execute;
mod params;

pub use credentials::{JwtCredentials, KeyType};
pub use error::{NodeError, NodeResult};
pub use execute::{ErrorPolicy, InputItem, ItemResult, run};
pub use params::OperationParams;
