//! Schema registration errors.

use thiserror::Error;

/// Structural defects detected when a schema is registered.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema name must not be empty")]
    EmptyName,

    #[error("Schema '{schema}' parameter '{param}': {reason}")]
    InvalidParameter {
        schema: String,
        param: String,
        reason: String,
    },
}
