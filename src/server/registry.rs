//! Procedure registrations.
//!
//! A registration binds a [`ProcedureIdentity`] to two type-erased functions:
//! one extracting raw parameters from a request, and one decoding those
//! parameters, running the typed implementation and encoding its result.
//! The typed closures live inside the registration; the server only ever
//! sees [`GenericValue`]s.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::ServerDefinition;
use crate::error::ServerError;
use crate::identity::ProcedureIdentity;
use crate::procedure::Procedure;
use crate::value::{Codec, GenericValue, TypeDescriptor};

/// Boxed future, as returned by registrations and middleware.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Outcome of executing a registration.
pub type ExecResult<E> = Result<GenericValue, ServerError<E>>;

type GetParamsFn<In, E> = dyn Fn(&In) -> Result<GenericValue, E> + Send + Sync;
type ExecFn<Ctx, E> = dyn Fn(GenericValue, Ctx) -> BoxFuture<'static, ExecResult<E>> + Send + Sync;

/// A procedure implementation, erased to the generic-value interface.
pub struct ProcedureRegistration<In, Ctx, E> {
    identity: ProcedureIdentity,
    params_type: TypeDescriptor,
    return_type: TypeDescriptor,
    get_params: Box<GetParamsFn<In, E>>,
    exec: Box<ExecFn<Ctx, E>>,
}

impl<In, Ctx, E> ProcedureRegistration<In, Ctx, E>
where
    In: Send + 'static,
    Ctx: Send + 'static,
    E: Send + 'static,
{
    /// Bind `implementation` to `procedure`.
    ///
    /// Parameter extraction is the definition's `get_params` with the
    /// procedure's kind and parameter type already applied.
    pub fn new<D, P, R, F, Fut>(
        definition: Arc<D>,
        procedure: &Procedure<P, R>,
        implementation: F,
    ) -> Self
    where
        D: ServerDefinition<Input = In, Error = E>,
        P: Codec + 'static,
        R: Codec + 'static,
        F: Fn(P, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
    {
        let kind = procedure.kind();
        let params_type = procedure.params_type().clone();

        let get_params = {
            let params_type = params_type.clone();
            move |input: &In| definition.get_params(input, kind, &params_type)
        };

        let exec = move |value: GenericValue, ctx: Ctx| -> BoxFuture<'static, ExecResult<E>> {
            // Decode before calling the implementation; it never sees bad input.
            let params = match P::decode(&value) {
                Ok(params) => params,
                Err(errors) => {
                    return Box::pin(async move { Err(ServerError::ParamsDecodeError(errors)) })
                }
            };

            let fut = implementation(params, ctx);
            Box::pin(async move {
                match fut.await {
                    Ok(ret) => Ok(ret.encode()),
                    Err(e) => Err(ServerError::ProcedureExecError(e)),
                }
            })
        };

        Self {
            identity: procedure.identity().clone(),
            params_type,
            return_type: procedure.return_type().clone(),
            get_params: Box::new(get_params),
            exec: Box::new(exec),
        }
    }
}

impl<In, Ctx, E> ProcedureRegistration<In, Ctx, E> {
    #[inline]
    pub fn identity(&self) -> &ProcedureIdentity {
        &self.identity
    }

    #[inline]
    pub fn params_type(&self) -> &TypeDescriptor {
        &self.params_type
    }

    #[inline]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }

    /// Extract the raw parameters for this procedure from a request.
    pub fn get_params(&self, input: &In) -> Result<GenericValue, E> {
        (self.get_params)(input)
    }

    /// Decode `params`, run the implementation and encode its result.
    pub fn exec(&self, params: GenericValue, ctx: Ctx) -> BoxFuture<'static, ExecResult<E>> {
        (self.exec)(params, ctx)
    }
}

impl<In, Ctx, E> fmt::Debug for ProcedureRegistration<In, Ctx, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureRegistration")
            .field("identity", &self.identity)
            .field("params_type", &self.params_type)
            .field("return_type", &self.return_type)
            .finish_non_exhaustive()
    }
}
