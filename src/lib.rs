//! # procwire-server
//!
//! Transport-agnostic procedure dispatch for Procwire.
//!
//! Given an incoming request and a set of declared procedures, the server
//! resolves which procedure is called, extracts and decodes its parameters,
//! runs the implementation under a chain of middleware and encodes either the
//! result or a typed error back into a response. It never touches sockets or
//! wire formats itself: a binding supplies those through [`ServerDefinition`].
//!
//! ## Architecture
//!
//! - **Declaration**: [`Procedure`] fixes a procedure's identity and types
//! - **Binding**: [`ServerDefinition`] maps requests to identities and params, and results/errors to responses
//! - **Server**: [`ProcedureServer`] collects implementations and middleware, immutably
//! - **Dispatch**: [`Dispatcher`] runs one request through the pipeline
//!
//! ## Example
//!
//! ```
//! use procwire_server::binding::json::{JsonBinding, JsonCall};
//! use procwire_server::{Procedure, ProcedureServer};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let echo: Procedure<String, String> = Procedure::query("echo");
//! let double: Procedure<i64, i64> = Procedure::query("double");
//!
//! let dispatcher = ProcedureServer::new(JsonBinding)
//!     .with_implementation(&echo, |text: String, _ctx| async move { Ok(text) })
//!     .with_implementation(&double, |n: i64, _ctx| async move { Ok(n * 2) })
//!     .serve();
//!
//! let reply = dispatcher.dispatch(JsonCall::query("echo", r#""hi""#)).await;
//! assert!(reply.ok);
//! assert_eq!(reply.body, r#""hi""#);
//!
//! let reply = dispatcher.dispatch(JsonCall::query("double", "3")).await;
//! assert_eq!(reply.body, "6");
//! # }
//! ```

pub mod binding;
pub mod config;
pub mod error;
pub mod identity;
pub mod procedure;
pub mod server;
pub mod value;

pub use config::ServerConfig;
pub use error::{BindingError, DecodeError, ServerError, ServerErrorKind};
pub use identity::{ProcedureIdentity, ProcedureKind};
pub use procedure::Procedure;
pub use server::{
    Dispatcher, FnDefinition, Middleware, Next, ProcedureRegistration, ProcedureServer,
    ServerDefinition, ServerSchema, Timeout,
};
pub use value::{Codec, GenericValue, TypeDescriptor};
