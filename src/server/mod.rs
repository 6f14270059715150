//! Procedure server - registration, middleware and dispatch.
//!
//! Provides:
//! - [`ProcedureServer`] - immutable builder holding definition, middleware and implementations
//! - [`ServerDefinition`] / [`FnDefinition`] - the binding's four functions
//! - [`Middleware`] / [`Next`] - request interceptors
//! - [`Dispatcher`] - the request handler produced by [`ProcedureServer::serve`]
//!
//! Builder steps consume the server and return a new one. Lists are never
//! shared mutably, so a clone taken before a step works as a template:
//!
//! ```ignore
//! let base = ProcedureServer::new(JsonBinding).with_middleware(auth);
//! let public = base.clone().with_implementation(&health, health_check);
//! let admin = base.with_implementation(&health, health_check).with_implementation(&purge, purge);
//! ```

mod definition;
mod dispatch;
mod middleware;
mod registry;
mod schema;

pub use definition::{FnDefinition, ServerDefinition};
pub use dispatch::Dispatcher;
pub use middleware::{Middleware, Next, Timeout};
pub use registry::{BoxFuture, ExecResult, ProcedureRegistration};
pub use schema::{ProcedureSchema, ServerSchema};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::procedure::Procedure;
use crate::value::Codec;
use dispatch::RegistrationList;
use middleware::MiddlewareList;

/// Derives the per-request context from the raw request.
pub(crate) type ContextFactory<In, Ctx> = dyn Fn(&In) -> Ctx + Send + Sync;

/// A set of procedure implementations behind a server definition.
///
/// `Ctx` is the context type handed to implementations.
pub struct ProcedureServer<D: ServerDefinition, Ctx> {
    definition: Arc<D>,
    context_factory: Arc<ContextFactory<D::Input, Ctx>>,
    /// Most recently added first.
    middlewares: MiddlewareList<D::Input, D::Output>,
    /// Most recently registered first.
    implementations: RegistrationList<D::Input, Ctx, D::Error>,
    config: ServerConfig,
}

impl<D> ProcedureServer<D, D::Input>
where
    D: ServerDefinition,
    D::Input: Clone,
{
    /// Create a server whose context is the raw request itself.
    pub fn new(definition: D) -> Self {
        Self::with_context(definition, |input: &D::Input| input.clone())
    }
}

impl<D, Ctx> ProcedureServer<D, Ctx>
where
    D: ServerDefinition,
    Ctx: Send + 'static,
{
    /// Create a server deriving its context with `context_factory`.
    pub fn with_context<F>(definition: D, context_factory: F) -> Self
    where
        F: Fn(&D::Input) -> Ctx + Send + Sync + 'static,
    {
        Self {
            definition: Arc::new(definition),
            context_factory: Arc::new(context_factory),
            middlewares: Arc::from(Vec::new()),
            implementations: Arc::from(Vec::new()),
            config: ServerConfig::default(),
        }
    }

    /// Register an implementation for `procedure`.
    ///
    /// The newest registration takes precedence over earlier ones with the
    /// same identity.
    pub fn with_implementation<P, R, F, Fut>(self, procedure: &Procedure<P, R>, implementation: F) -> Self
    where
        P: Codec + 'static,
        R: Codec + 'static,
        F: Fn(P, Ctx) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, D::Error>> + Send + 'static,
    {
        let registration = Arc::new(ProcedureRegistration::new(
            self.definition.clone(),
            procedure,
            implementation,
        ));
        Self {
            implementations: prepend(&self.implementations, registration),
            ..self
        }
    }

    /// Add a middleware. The newest middleware runs first.
    pub fn with_middleware<M>(self, middleware: M) -> Self
    where
        M: Middleware<D::Input, D::Output>,
    {
        let middleware: Arc<dyn Middleware<D::Input, D::Output>> = Arc::new(middleware);
        Self {
            middlewares: prepend(&self.middlewares, middleware),
            ..self
        }
    }

    /// Replace the server configuration.
    pub fn with_config(self, config: ServerConfig) -> Self {
        Self { config, ..self }
    }

    #[inline]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[inline]
    pub fn definition(&self) -> &D {
        &self.definition
    }

    /// Registrations in lookup order.
    pub fn registrations(
        &self,
    ) -> impl Iterator<Item = &ProcedureRegistration<D::Input, Ctx, D::Error>> + '_ {
        self.implementations.iter().map(|r| r.as_ref())
    }

    /// Number of middleware installed.
    pub fn middleware_count(&self) -> usize {
        self.middlewares.len()
    }

    /// Describe the procedures this server can dispatch.
    pub fn schema(&self) -> ServerSchema {
        ServerSchema::from_registrations(&self.config.name, self.registrations())
    }

    /// Snapshot the server into a request handler.
    pub fn serve(&self) -> Dispatcher<D> {
        Dispatcher::new(
            self.definition.clone(),
            self.context_factory.clone(),
            self.middlewares.clone(),
            self.implementations.clone(),
            self.config.clone(),
        )
    }
}

fn prepend<T: ?Sized>(list: &Arc<[Arc<T>]>, item: Arc<T>) -> Arc<[Arc<T>]> {
    std::iter::once(item).chain(list.iter().cloned()).collect()
}

impl<D: ServerDefinition, Ctx> Clone for ProcedureServer<D, Ctx> {
    fn clone(&self) -> Self {
        Self {
            definition: self.definition.clone(),
            context_factory: self.context_factory.clone(),
            middlewares: self.middlewares.clone(),
            implementations: self.implementations.clone(),
            config: self.config.clone(),
        }
    }
}

impl<D: ServerDefinition, Ctx> fmt::Debug for ProcedureServer<D, Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcedureServer")
            .field("config", &self.config)
            .field("middlewares", &self.middlewares.len())
            .field("implementations", &self.implementations)
            .finish_non_exhaustive()
    }
}
