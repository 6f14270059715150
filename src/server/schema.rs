//! Schema export - what a server can dispatch.
//!
//! # Example
//!
//! ```ignore
//! let schema = server.schema();
//! let json = schema.to_json()?;
//! assert!(json.contains("\"echo\""));
//! ```

use std::collections::HashSet;

use serde::Serialize;

use super::registry::ProcedureRegistration;
use crate::identity::ProcedureIdentity;
use crate::value::TypeDescriptor;

/// One dispatchable procedure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcedureSchema {
    #[serde(flatten)]
    pub identity: ProcedureIdentity,
    pub params: TypeDescriptor,
    pub returns: TypeDescriptor,
}

/// Dispatchable procedures of a server, in lookup order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServerSchema {
    pub server: String,
    pub procedures: Vec<ProcedureSchema>,
}

impl ServerSchema {
    /// Build from registrations in lookup order.
    ///
    /// Registrations shadowed by an earlier one with the same identity are
    /// unreachable and left out.
    pub(crate) fn from_registrations<'a, In, Ctx, E, I>(server: &str, registrations: I) -> Self
    where
        In: 'a,
        Ctx: 'a,
        E: 'a,
        I: IntoIterator<Item = &'a ProcedureRegistration<In, Ctx, E>>,
    {
        let mut seen = HashSet::new();
        let procedures = registrations
            .into_iter()
            .filter(|r| seen.insert(r.identity().clone()))
            .map(|r| ProcedureSchema {
                identity: r.identity().clone(),
                params: r.params_type().clone(),
                returns: r.return_type().clone(),
            })
            .collect();

        Self {
            server: server.to_string(),
            procedures,
        }
    }

    /// Look up a procedure by identity.
    pub fn get(&self, identity: &ProcedureIdentity) -> Option<&ProcedureSchema> {
        self.procedures.iter().find(|p| &p.identity == identity)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
