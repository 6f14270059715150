//! Reference bindings.
//!
//! A binding is whatever turns a transport's requests into calls on a
//! [`Dispatcher`](crate::Dispatcher): it implements
//! [`ServerDefinition`](crate::ServerDefinition) for its own request and
//! response types. Two in-memory bindings ship with the crate:
//!
//! - [`json::JsonBinding`] - JSON text params and replies
//! - [`msgpack::MsgPackBinding`] - MsgPack payloads, compatible with `@procwire/core`
//!
//! Both report failures with the same [`ErrorBody`] shape:
//!
//! ```json
//! {"error": "params_decode_error", "message": "...", "details": [{"path": "$", "expected": "int", "found": "string"}]}
//! ```

pub mod json;
pub mod msgpack;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, ServerError};
use crate::identity::{ProcedureIdentity, ProcedureKind};
use crate::value::TypeDescriptor;

/// Error reply body shared by the reference bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// [`ServerErrorKind`](crate::ServerErrorKind) name.
    pub error: String,
    /// Human readable description.
    pub message: String,
    /// Decode errors, for `params_decode_error` only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<DecodeError>,
}

impl<E: fmt::Display> From<&ServerError<E>> for ErrorBody {
    fn from(error: &ServerError<E>) -> Self {
        let details = match error {
            ServerError::ParamsDecodeError(errors) => errors.clone(),
            _ => Vec::new(),
        };
        Self {
            error: error.kind().as_str().to_string(),
            message: error.to_string(),
            details,
        }
    }
}

/// Build an identity from the fields every reference request carries.
pub(crate) fn identity_of(
    procedure: &str,
    router: Option<&str>,
    kind: ProcedureKind,
) -> Option<ProcedureIdentity> {
    if procedure.trim().is_empty() {
        return None;
    }
    Some(ProcedureIdentity {
        name: procedure.to_string(),
        router: router.map(str::to_string),
        kind,
    })
}

/// Whether an empty payload stands for `null` under `params_type`.
pub(crate) fn accepts_empty(params_type: &TypeDescriptor) -> bool {
    matches!(
        params_type,
        TypeDescriptor::Unit | TypeDescriptor::Optional { .. }
    )
}
