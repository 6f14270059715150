//! Procedure declarations.
//!
//! A [`Procedure`] names a callable procedure and fixes its parameter and
//! return types. It carries no behavior; implementations are attached to a
//! server with [`ProcedureServer::with_implementation`](crate::ProcedureServer::with_implementation).
//!
//! # Example
//!
//! ```
//! use procwire_server::{Procedure, ProcedureKind};
//! use procwire_server::value::TypeDescriptor;
//!
//! let get_user: Procedure<u64, Option<String>> = Procedure::query("get").in_router("users");
//!
//! assert_eq!(get_user.identity().kind, ProcedureKind::Query);
//! assert_eq!(get_user.identity().router.as_deref(), Some("users"));
//! assert_eq!(get_user.params_type(), &TypeDescriptor::Int);
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::identity::{ProcedureIdentity, ProcedureKind};
use crate::value::{Codec, TypeDescriptor};

/// Declaration of a procedure taking `P` and returning `R`.
pub struct Procedure<P, R> {
    identity: ProcedureIdentity,
    params_type: TypeDescriptor,
    return_type: TypeDescriptor,
    _phantom: PhantomData<fn(P) -> R>,
}

impl<P: Codec, R: Codec> Procedure<P, R> {
    /// Declare a procedure of the given kind.
    pub fn new(name: impl Into<String>, kind: ProcedureKind) -> Self {
        Self {
            identity: ProcedureIdentity::new(name, kind),
            params_type: P::descriptor(),
            return_type: R::descriptor(),
            _phantom: PhantomData,
        }
    }

    /// Declare a query.
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ProcedureKind::Query)
    }

    /// Declare a mutation.
    pub fn mutation(name: impl Into<String>) -> Self {
        Self::new(name, ProcedureKind::Mutation)
    }

    /// Declare a subscription.
    pub fn subscription(name: impl Into<String>) -> Self {
        Self::new(name, ProcedureKind::Subscription)
    }
}

impl<P, R> Procedure<P, R> {
    /// Place the procedure under a router.
    pub fn in_router(mut self, router: impl Into<String>) -> Self {
        self.identity.router = Some(router.into());
        self
    }

    #[inline]
    pub fn identity(&self) -> &ProcedureIdentity {
        &self.identity
    }

    #[inline]
    pub fn kind(&self) -> ProcedureKind {
        self.identity.kind
    }

    #[inline]
    pub fn params_type(&self) -> &TypeDescriptor {
        &self.params_type
    }

    #[inline]
    pub fn return_type(&self) -> &TypeDescriptor {
        &self.return_type
    }
}

// Manual impls: `P` and `R` only appear behind `PhantomData`.
impl<P, R> Clone for Procedure<P, R> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            params_type: self.params_type.clone(),
            return_type: self.return_type.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<P, R> fmt::Debug for Procedure<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Procedure")
            .field("identity", &self.identity)
            .field("params_type", &self.params_type)
            .field("return_type", &self.return_type)
            .finish()
    }
}
