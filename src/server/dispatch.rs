//! Dispatch engine.
//!
//! Per request, inside the middleware chain:
//! 1. derive the context from the request
//! 2. resolve the identity (failure: `GetIdentityError`)
//! 3. pick the first registration with that identity (none: `WrongProcedure`)
//! 4. extract raw params (failure: `GetParamsError`)
//! 5. execute; `Ok` goes through `encode_result`, every error through `recover_error`
//!
//! Every branch ends in exactly one `Output`.

use std::sync::Arc;

use tokio::time::Instant;
use tracing::Instrument;

use super::middleware::{Endpoint, MiddlewareList, Next};
use super::registry::{BoxFuture, ProcedureRegistration};
use super::{ContextFactory, ServerDefinition};
use crate::config::ServerConfig;
use crate::error::ServerError;

pub(crate) type RegistrationList<In, Ctx, E> = Arc<[Arc<ProcedureRegistration<In, Ctx, E>>]>;

/// Snapshot of a server, ready to handle requests.
///
/// Cheap to clone and safe to share between tasks; registering more
/// procedures or middleware on the originating server does not affect it.
pub struct Dispatcher<D: ServerDefinition> {
    middlewares: MiddlewareList<D::Input, D::Output>,
    endpoint: Arc<Endpoint<D::Input, D::Output>>,
    config: Arc<ServerConfig>,
}

impl<D: ServerDefinition> Dispatcher<D> {
    pub(crate) fn new<Ctx: Send + 'static>(
        definition: Arc<D>,
        context_factory: Arc<ContextFactory<D::Input, Ctx>>,
        middlewares: MiddlewareList<D::Input, D::Output>,
        implementations: RegistrationList<D::Input, Ctx, D::Error>,
        config: ServerConfig,
    ) -> Self {
        let core = Arc::new(DispatchCore {
            definition,
            context_factory,
            implementations,
        });
        let endpoint = move |input: D::Input| -> BoxFuture<'static, D::Output> {
            let core = core.clone();
            Box::pin(async move { core.dispatch(input).await })
        };

        Self {
            middlewares,
            endpoint: Arc::new(endpoint),
            config: Arc::new(config),
        }
    }

    /// Handle one request.
    pub fn dispatch(&self, input: D::Input) -> BoxFuture<'static, D::Output> {
        let next = Next::new(self.middlewares.clone(), self.endpoint.clone());
        let span = tracing::debug_span!("dispatch", server = %self.config.name);
        let threshold = self.config.slow_request_threshold;

        Box::pin(
            async move {
                let started = Instant::now();
                let output = next.run(input).await;

                if let Some(threshold) = threshold {
                    let elapsed = started.elapsed();
                    if elapsed > threshold {
                        tracing::warn!(elapsed_ms = elapsed.as_millis() as u64, "slow request");
                    }
                }
                output
            }
            .instrument(span),
        )
    }

    #[inline]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

impl<D: ServerDefinition> Clone for Dispatcher<D> {
    fn clone(&self) -> Self {
        Self {
            middlewares: self.middlewares.clone(),
            endpoint: self.endpoint.clone(),
            config: self.config.clone(),
        }
    }
}

/// Innermost step of the pipeline, run once all middleware delegated.
struct DispatchCore<D: ServerDefinition, Ctx> {
    definition: Arc<D>,
    context_factory: Arc<ContextFactory<D::Input, Ctx>>,
    implementations: RegistrationList<D::Input, Ctx, D::Error>,
}

impl<D: ServerDefinition, Ctx> DispatchCore<D, Ctx> {
    async fn dispatch(&self, input: D::Input) -> D::Output {
        let context = (self.context_factory)(&input);

        let identity = match self.definition.get_identity(&input) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!("failed to extract procedure identity");
                return self
                    .definition
                    .recover_error(ServerError::GetIdentityError(e));
            }
        };

        // First match wins; the list is ordered most recently registered first.
        let Some(registration) = self
            .implementations
            .iter()
            .find(|r| r.identity() == &identity)
        else {
            tracing::debug!(%identity, "no procedure registered");
            return self.definition.recover_error(ServerError::WrongProcedure);
        };

        let params = match registration.get_params(&input) {
            Ok(params) => params,
            Err(e) => {
                tracing::warn!(%identity, "failed to extract parameters");
                return self
                    .definition
                    .recover_error(ServerError::GetParamsError(e));
            }
        };
        drop(input);

        tracing::debug!(%identity, "executing procedure");
        match registration.exec(params, context).await {
            Ok(value) => {
                tracing::debug!(%identity, "procedure completed");
                self.definition.encode_result(value)
            }
            Err(err) => {
                match &err {
                    ServerError::ParamsDecodeError(errors) => {
                        tracing::warn!(%identity, errors = errors.len(), "parameters failed to decode");
                    }
                    other => {
                        tracing::debug!(%identity, kind = %other.kind(), "procedure failed");
                    }
                }
                self.definition.recover_error(err)
            }
        }
    }
}
