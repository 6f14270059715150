//! JSON text binding.
//!
//! Requests carry their parameters as JSON text; replies carry either the
//! encoded result or an [`ErrorBody`], also as JSON text.

use serde::{Deserialize, Serialize};

use super::{accepts_empty, identity_of, ErrorBody};
use crate::error::{BindingError, ServerError};
use crate::identity::{ProcedureIdentity, ProcedureKind};
use crate::server::ServerDefinition;
use crate::value::{GenericValue, TypeDescriptor};

/// Fallback reply body if an error body cannot be serialized.
const UNSERIALIZABLE_ERROR: &str =
    r#"{"error":"procedure_exec_error","message":"unserializable error"}"#;

/// A procedure call with JSON text parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonCall {
    pub procedure: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<String>,
    pub kind: ProcedureKind,
    /// JSON text. May be empty for procedures taking no parameters.
    #[serde(default)]
    pub params: String,
}

impl JsonCall {
    pub fn new(procedure: impl Into<String>, kind: ProcedureKind, params: impl Into<String>) -> Self {
        Self {
            procedure: procedure.into(),
            router: None,
            kind,
            params: params.into(),
        }
    }

    pub fn query(procedure: impl Into<String>, params: impl Into<String>) -> Self {
        Self::new(procedure, ProcedureKind::Query, params)
    }

    pub fn mutation(procedure: impl Into<String>, params: impl Into<String>) -> Self {
        Self::new(procedure, ProcedureKind::Mutation, params)
    }

    pub fn in_router(mut self, router: impl Into<String>) -> Self {
        self.router = Some(router.into());
        self
    }
}

/// Reply to a [`JsonCall`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonReply {
    /// `true` when `body` is a result, `false` when it is an [`ErrorBody`].
    pub ok: bool,
    /// JSON text.
    pub body: String,
}

impl JsonReply {
    pub fn success(value: &GenericValue) -> Self {
        Self {
            ok: true,
            body: value.to_string(),
        }
    }

    pub fn failure(body: &ErrorBody) -> Self {
        let body = serde_json::to_string(body).unwrap_or_else(|e| {
            tracing::error!("failed to serialize error body: {}", e);
            UNSERIALIZABLE_ERROR.to_string()
        });
        Self { ok: false, body }
    }

    /// Short-circuit reply for middleware.
    pub fn error(kind: &str, message: &str) -> Self {
        Self::failure(&ErrorBody {
            error: kind.to_string(),
            message: message.to_string(),
            details: Vec::new(),
        })
    }

    /// Parse the body as a result value.
    pub fn value(&self) -> Result<GenericValue, BindingError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Parse the body as an error body.
    pub fn error_body(&self) -> Result<ErrorBody, BindingError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// [`ServerDefinition`] for [`JsonCall`] / [`JsonReply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBinding;

impl ServerDefinition for JsonBinding {
    type Input = JsonCall;
    type Output = JsonReply;
    type Error = BindingError;

    fn get_identity(&self, input: &JsonCall) -> Result<ProcedureIdentity, BindingError> {
        identity_of(&input.procedure, input.router.as_deref(), input.kind)
            .ok_or(BindingError::MissingProcedure)
    }

    fn get_params(
        &self,
        input: &JsonCall,
        _kind: ProcedureKind,
        params_type: &TypeDescriptor,
    ) -> Result<GenericValue, BindingError> {
        if input.params.trim().is_empty() && accepts_empty(params_type) {
            return Ok(GenericValue::Null);
        }
        Ok(serde_json::from_str(&input.params)?)
    }

    fn recover_error(&self, error: ServerError<BindingError>) -> JsonReply {
        JsonReply::failure(&ErrorBody::from(&error))
    }

    fn encode_result(&self, value: GenericValue) -> JsonReply {
        JsonReply::success(&value)
    }
}
