//! Generic values and their type descriptors.
//!
//! Bindings turn their wire payloads into a [`GenericValue`]; each declared
//! procedure then converts that value into its typed parameters with a
//! [`Codec`], and converts its typed result back the same way.
//!
//! - [`TypeDescriptor`] - schema of a parameter or return type
//! - [`Codec`] - typed conversion to and from [`GenericValue`]
//! - [`RecordDecoder`] - helper for writing `Codec` for record types
//!
//! # Example
//!
//! ```
//! use procwire_server::value::{Codec, GenericValue, TypeDescriptor};
//!
//! assert_eq!(<Vec<i64>>::descriptor(), TypeDescriptor::list(TypeDescriptor::Int));
//!
//! let decoded = <Vec<i64>>::decode(&serde_json::json!([1, 2, 3])).unwrap();
//! assert_eq!(decoded, vec![1, 2, 3]);
//!
//! let errors = <Vec<i64>>::decode(&serde_json::json!([1, "two", 3.5])).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! assert_eq!(errors[0].path, "$[1]");
//! ```

mod codec;
mod record;

use std::fmt;

use serde::Serialize;

pub use codec::{Codec, ROOT_PATH};
pub use record::{RecordDecoder, RecordFields};

/// Transport-agnostic decoded data.
pub type GenericValue = serde_json::Value;

/// Schema of a generic value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TypeDescriptor {
    /// No value (`null`).
    Unit,
    Bool,
    Int,
    Float,
    String,
    /// Homogeneous list.
    List { items: Box<TypeDescriptor> },
    /// Value or `null`.
    Optional { inner: Box<TypeDescriptor> },
    /// String-keyed map with homogeneous values.
    Map { values: Box<TypeDescriptor> },
    /// Fixed set of named fields.
    Record { fields: Vec<FieldDescriptor> },
    /// Anything; passed through untouched.
    Any,
}

/// A named field of a record descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
}

impl TypeDescriptor {
    pub fn list(items: TypeDescriptor) -> Self {
        TypeDescriptor::List {
            items: Box::new(items),
        }
    }

    pub fn optional(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Optional {
            inner: Box::new(inner),
        }
    }

    pub fn map(values: TypeDescriptor) -> Self {
        TypeDescriptor::Map {
            values: Box::new(values),
        }
    }

    /// Build a record descriptor from `(name, type)` pairs, keeping their order.
    pub fn record<N, I>(fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = (N, TypeDescriptor)>,
    {
        TypeDescriptor::Record {
            fields: fields
                .into_iter()
                .map(|(name, ty)| FieldDescriptor {
                    name: name.into(),
                    ty,
                })
                .collect(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDescriptor::Unit => f.write_str("unit"),
            TypeDescriptor::Bool => f.write_str("bool"),
            TypeDescriptor::Int => f.write_str("int"),
            TypeDescriptor::Float => f.write_str("float"),
            TypeDescriptor::String => f.write_str("string"),
            TypeDescriptor::List { items } => write!(f, "list<{}>", items),
            TypeDescriptor::Optional { inner } => write!(f, "optional<{}>", inner),
            TypeDescriptor::Map { values } => write!(f, "map<{}>", values),
            TypeDescriptor::Record { fields } => {
                f.write_str("record{")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", field.name, field.ty)?;
                }
                f.write_str("}")
            }
            TypeDescriptor::Any => f.write_str("any"),
        }
    }
}

/// Short name of the tag of a generic value, used in decode errors.
pub fn value_kind(value: &GenericValue) -> &'static str {
    match value {
        GenericValue::Null => "null",
        GenericValue::Bool(_) => "bool",
        GenericValue::Number(n) if n.is_f64() => "float",
        GenericValue::Number(_) => "int",
        GenericValue::String(_) => "string",
        GenericValue::Array(_) => "list",
        GenericValue::Object(_) => "record",
    }
}

/// Path of the member `key` under `path`.
///
/// Identifier-like keys use dot notation (`$.name`); anything else is
/// quoted in brackets (`$["a.b"]`) so the path stays unambiguous.
pub fn member_path(path: &str, key: &str) -> String {
    let mut chars = key.chars();
    let is_ident = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if is_ident {
        format!("{}.{}", path, key)
    } else {
        format!("{}[{}]", path, GenericValue::from(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_nested() {
        let ty = TypeDescriptor::record([
            ("name", TypeDescriptor::String),
            ("tags", TypeDescriptor::list(TypeDescriptor::String)),
            ("age", TypeDescriptor::optional(TypeDescriptor::Int)),
        ]);
        assert_eq!(
            ty.to_string(),
            "record{name: string, tags: list<string>, age: optional<int>}"
        );
        assert_eq!(TypeDescriptor::map(TypeDescriptor::Float).to_string(), "map<float>");
    }

    #[test]
    fn test_serialize_tagged() {
        let ty = TypeDescriptor::record([("id", TypeDescriptor::Int)]);
        assert_eq!(
            serde_json::to_value(&ty).unwrap(),
            json!({
                "type": "record",
                "fields": [{"name": "id", "type": {"type": "int"}}]
            })
        );
        assert_eq!(
            serde_json::to_value(TypeDescriptor::list(TypeDescriptor::Bool)).unwrap(),
            json!({"type": "list", "items": {"type": "bool"}})
        );
    }

    #[test]
    fn test_member_path() {
        assert_eq!(member_path("$", "name"), "$.name");
        assert_eq!(member_path("$.user", "_id2"), "$.user._id2");
        assert_eq!(member_path("$", "a.b"), r#"$["a.b"]"#);
        assert_eq!(member_path("$", "first name"), r#"$["first name"]"#);
        assert_eq!(member_path("$", "2fa"), r#"$["2fa"]"#);
        assert_eq!(member_path("$", ""), r#"$[""]"#);
        assert_eq!(member_path("$", r#"say "hi""#), r#"$["say \"hi\""]"#);
    }

    #[test]
    fn test_value_kind() {
        assert_eq!(value_kind(&json!(null)), "null");
        assert_eq!(value_kind(&json!(true)), "bool");
        assert_eq!(value_kind(&json!(3)), "int");
        assert_eq!(value_kind(&json!(-3)), "int");
        assert_eq!(value_kind(&json!(3.5)), "float");
        assert_eq!(value_kind(&json!("x")), "string");
        assert_eq!(value_kind(&json!([1])), "list");
        assert_eq!(value_kind(&json!({"a": 1})), "record");
    }
}
