//! Error types for buffer growth, schema registration and encoding.

use crate::descriptor::WireCategory;

/// Errors raised by [`DynamicBuffer`](crate::DynamicBuffer) growth.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("buffer allocation of {requested} bytes failed")]
    AllocationFailed { requested: usize },
}

/// Errors raised while building or registering a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("unknown protobuf type: {0}")]
    UnknownWireCategory(String),

    #[error("schema '{shape}': field number {number} used by both '{first}' and '{second}'")]
    RegistrationConflict { shape: String, number: u32, first: String, second: String },

    #[error("field '{field}': invalid field number {number}")]
    InvalidFieldNumber { field: String, number: u32 },

    #[error("field '{field}': {reason}")]
    InvalidModifier { field: String, reason: &'static str },

    #[error("schema definition error: {0}")]
    Definition(#[from] toml::de::Error),
}

/// Errors raised by [`WireEncoder`](crate::WireEncoder).
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("required field '{field}' has no value")]
    MissingRequired { field: String },

    #[error("field '{field}': value does not fit category {category}")]
    TypeMismatch { field: String, category: WireCategory },

    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Either stage of a register-then-encode call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}
