//! Error types for procwire-server.
//!
//! [`ServerError`] is the only failure surface the dispatcher hands to a
//! server definition. Every stage of the pipeline maps its own failure into
//! exactly one of its variants before the definition's `recover_error` sees it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dispatch failure, generic over the binding's error payload `E`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ServerError<E> {
    /// No registered procedure matches the resolved identity.
    #[error("no procedure matches the requested identity")]
    WrongProcedure,

    /// The procedure implementation returned an error.
    #[error("procedure failed: {0}")]
    ProcedureExecError(E),

    /// The binding could not extract raw parameters from the request.
    #[error("failed to extract parameters: {0}")]
    GetParamsError(E),

    /// The raw parameters did not match the declared parameter type.
    #[error("parameters failed to decode ({} error(s))", .0.len())]
    ParamsDecodeError(Vec<DecodeError>),

    /// The binding could not extract a procedure identity from the request.
    #[error("failed to extract procedure identity: {0}")]
    GetIdentityError(E),
}

/// Fieldless mirror of [`ServerError`], handy for logging and error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerErrorKind {
    WrongProcedure,
    ProcedureExecError,
    GetParamsError,
    ParamsDecodeError,
    GetIdentityError,
}

impl ServerErrorKind {
    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServerErrorKind::WrongProcedure => "wrong_procedure",
            ServerErrorKind::ProcedureExecError => "procedure_exec_error",
            ServerErrorKind::GetParamsError => "get_params_error",
            ServerErrorKind::ParamsDecodeError => "params_decode_error",
            ServerErrorKind::GetIdentityError => "get_identity_error",
        }
    }
}

impl fmt::Display for ServerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<E> ServerError<E> {
    /// The variant of this error without its payload.
    pub fn kind(&self) -> ServerErrorKind {
        match self {
            ServerError::WrongProcedure => ServerErrorKind::WrongProcedure,
            ServerError::ProcedureExecError(_) => ServerErrorKind::ProcedureExecError,
            ServerError::GetParamsError(_) => ServerErrorKind::GetParamsError,
            ServerError::ParamsDecodeError(_) => ServerErrorKind::ParamsDecodeError,
            ServerError::GetIdentityError(_) => ServerErrorKind::GetIdentityError,
        }
    }
}

/// A single mismatch found while converting a generic value into a typed one.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("at {path}: expected {expected}, found {found}")]
pub struct DecodeError {
    /// JSON-path style location, e.g. `$.user.tags[2]`.
    pub path: String,
    /// What the declared type wanted.
    pub expected: String,
    /// What was actually there.
    pub found: String,
}

impl DecodeError {
    /// Create a decode error.
    pub fn new(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Error payload shared by the reference bindings in [`crate::binding`].
#[derive(Debug, Error)]
pub enum BindingError {
    /// The request did not name a procedure.
    #[error("request does not name a procedure")]
    MissingProcedure,

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Failure reported by a procedure implementation.
    #[error("{0}")]
    Application(String),
}

impl BindingError {
    /// Shorthand for an implementation failure.
    pub fn application(message: impl Into<String>) -> Self {
        BindingError::Application(message.into())
    }
}
