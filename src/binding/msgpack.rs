//! MsgPack binding using `rmp-serde`.
//!
//! Payloads are encoded with structs as named maps, the layout
//! `@msgpack/msgpack` on the Node.js side produces and expects.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use procwire_server::binding::msgpack::{FrameCall, MsgPackBinding, MsgPackCodec};
//! use procwire_server::{Procedure, ProcedureServer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let double: Procedure<i64, i64> = Procedure::query("double");
//! let dispatcher = ProcedureServer::new(MsgPackBinding)
//!     .with_implementation(&double, |n: i64, _ctx| async move { Ok(n * 2) })
//!     .serve();
//!
//! let payload = Bytes::from(MsgPackCodec::encode(&21i64).unwrap());
//! let reply = dispatcher.dispatch(FrameCall::query("double", payload)).await;
//! assert!(reply.ok);
//! assert_eq!(MsgPackCodec::decode::<i64>(&reply.payload).unwrap(), 42);
//! # }
//! ```

use bytes::Bytes;

use super::{accepts_empty, identity_of, ErrorBody};
use crate::error::{BindingError, ServerError};
use crate::identity::{ProcedureIdentity, ProcedureKind};
use crate::server::ServerDefinition;
use crate::value::{GenericValue, TypeDescriptor};

/// Payload codec for [`MsgPackBinding`].
pub struct MsgPackCodec;

impl MsgPackCodec {
    /// Serialize `value`. `to_vec` would write structs as positional arrays.
    #[inline]
    pub fn encode<T: serde::Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, BindingError> {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T, BindingError> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

/// A procedure call with a MsgPack payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameCall {
    pub procedure: String,
    pub router: Option<String>,
    pub kind: ProcedureKind,
    /// MsgPack-encoded parameters. May be empty for procedures taking no parameters.
    pub payload: Bytes,
}

impl FrameCall {
    pub fn new(procedure: impl Into<String>, kind: ProcedureKind, payload: Bytes) -> Self {
        Self {
            procedure: procedure.into(),
            router: None,
            kind,
            payload,
        }
    }

    pub fn query(procedure: impl Into<String>, payload: Bytes) -> Self {
        Self::new(procedure, ProcedureKind::Query, payload)
    }

    pub fn mutation(procedure: impl Into<String>, payload: Bytes) -> Self {
        Self::new(procedure, ProcedureKind::Mutation, payload)
    }

    pub fn in_router(mut self, router: impl Into<String>) -> Self {
        self.router = Some(router.into());
        self
    }
}

/// Reply to a [`FrameCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameReply {
    /// `true` when `payload` is a result, `false` when it is an [`ErrorBody`].
    pub ok: bool,
    /// MsgPack-encoded result or error body.
    pub payload: Bytes,
}

impl FrameReply {
    pub fn failure(body: &ErrorBody) -> Self {
        let payload = match MsgPackCodec::encode(body) {
            Ok(data) => Bytes::from(data),
            Err(e) => {
                tracing::error!("failed to encode error body: {}", e);
                Bytes::new()
            }
        };
        Self { ok: false, payload }
    }

    /// Short-circuit reply for middleware.
    pub fn error(kind: &str, message: &str) -> Self {
        Self::failure(&ErrorBody {
            error: kind.to_string(),
            message: message.to_string(),
            details: Vec::new(),
        })
    }

    /// Decode the payload as an error body.
    pub fn error_body(&self) -> Result<ErrorBody, BindingError> {
        MsgPackCodec::decode(&self.payload)
    }
}

/// [`ServerDefinition`] for [`FrameCall`] / [`FrameReply`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackBinding;

impl ServerDefinition for MsgPackBinding {
    type Input = FrameCall;
    type Output = FrameReply;
    type Error = BindingError;

    fn get_identity(&self, input: &FrameCall) -> Result<ProcedureIdentity, BindingError> {
        identity_of(&input.procedure, input.router.as_deref(), input.kind)
            .ok_or(BindingError::MissingProcedure)
    }

    fn get_params(
        &self,
        input: &FrameCall,
        _kind: ProcedureKind,
        params_type: &TypeDescriptor,
    ) -> Result<GenericValue, BindingError> {
        if input.payload.is_empty() && accepts_empty(params_type) {
            return Ok(GenericValue::Null);
        }
        MsgPackCodec::decode(&input.payload)
    }

    fn recover_error(&self, error: ServerError<BindingError>) -> FrameReply {
        FrameReply::failure(&ErrorBody::from(&error))
    }

    fn encode_result(&self, value: GenericValue) -> FrameReply {
        match MsgPackCodec::encode(&value) {
            Ok(data) => FrameReply {
                ok: true,
                payload: Bytes::from(data),
            },
            Err(e) => {
                tracing::error!("failed to encode result: {}", e);
                FrameReply::error("procedure_exec_error", &e.to_string())
            }
        }
    }
}
