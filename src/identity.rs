//! Procedure identity - the lookup key for dispatch.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of a declared procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcedureKind {
    /// Read-only call.
    Query,
    /// Call with side effects.
    Mutation,
    /// Long-lived call producing a sequence of values.
    Subscription,
}

impl ProcedureKind {
    /// Lowercase name, as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcedureKind::Query => "query",
            ProcedureKind::Mutation => "mutation",
            ProcedureKind::Subscription => "subscription",
        }
    }
}

impl fmt::Display for ProcedureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural key identifying a declared procedure.
///
/// Two identities are equal when name, router and kind all match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcedureIdentity {
    /// Procedure name.
    pub name: String,
    /// Optional router/namespace the procedure lives under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub router: Option<String>,
    /// Procedure kind.
    pub kind: ProcedureKind,
}

impl ProcedureIdentity {
    /// Create an identity outside of any router.
    pub fn new(name: impl Into<String>, kind: ProcedureKind) -> Self {
        Self {
            name: name.into(),
            router: None,
            kind,
        }
    }

    /// Shorthand for a query identity.
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ProcedureKind::Query)
    }

    /// Shorthand for a mutation identity.
    pub fn mutation(name: impl Into<String>) -> Self {
        Self::new(name, ProcedureKind::Mutation)
    }

    /// Place the identity under a router.
    pub fn in_router(mut self, router: impl Into<String>) -> Self {
        self.router = Some(router.into());
        self
    }
}

impl fmt::Display for ProcedureIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.router {
            Some(router) => write!(f, "{}.{} ({})", router, self.name, self.kind),
            None => write!(f, "{} ({})", self.name, self.kind),
        }
    }
}
