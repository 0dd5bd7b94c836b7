//! Shared vocabulary for model failover: error kinds, provider families, CLI output format.

pub mod error;
pub mod types;

pub use error::AppError;
pub use types::{ErrorKind, OutputFormat, ProviderFamily, provider_of};
