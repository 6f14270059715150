//! Helper for decoding record types field by field.
//!
//! # Example
//!
//! ```
//! use procwire_server::value::{Codec, GenericValue, RecordDecoder, TypeDescriptor};
//! use procwire_server::DecodeError;
//!
//! #[derive(Debug, PartialEq)]
//! struct User {
//!     name: String,
//!     age: i64,
//!     nickname: Option<String>,
//! }
//!
//! impl Codec for User {
//!     fn descriptor() -> TypeDescriptor {
//!         TypeDescriptor::record([
//!             ("name", String::descriptor()),
//!             ("age", i64::descriptor()),
//!             ("nickname", <Option<String>>::descriptor()),
//!         ])
//!     }
//!
//!     fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
//!         let mut record = RecordDecoder::new::<Self>(value, path);
//!         let name = record.field::<String>("name");
//!         let age = record.field::<i64>("age");
//!         let nickname = record.field::<Option<String>>("nickname");
//!         let (name, age, nickname) = record.finish((name, age, nickname))?;
//!         Ok(User { name, age, nickname })
//!     }
//!
//!     fn encode(self) -> GenericValue {
//!         serde_json::json!({
//!             "name": self.name,
//!             "age": self.age,
//!             "nickname": self.nickname,
//!         })
//!     }
//! }
//!
//! let errors = User::decode(&serde_json::json!({"name": 1})).unwrap_err();
//! assert_eq!(errors.len(), 2); // wrong `name`, missing `age`
//! ```

use serde_json::Map;

use super::{member_path, value_kind, Codec, GenericValue};
use crate::error::DecodeError;

/// Decodes named fields out of a record value, accumulating every error.
pub struct RecordDecoder<'a> {
    fields: Option<&'a Map<String, GenericValue>>,
    path: String,
    errors: Vec<DecodeError>,
}

impl<'a> RecordDecoder<'a> {
    /// Start decoding `value` as the record type `T`.
    ///
    /// If `value` is not a record, a single error is recorded and every
    /// subsequent `field` call yields `None` without adding more.
    pub fn new<T: Codec>(value: &'a GenericValue, path: &str) -> Self {
        let mut errors = Vec::new();
        let fields = match value {
            GenericValue::Object(fields) => Some(fields),
            other => {
                errors.push(DecodeError::new(
                    path,
                    T::descriptor().to_string(),
                    value_kind(other),
                ));
                None
            }
        };

        Self {
            fields,
            path: path.to_string(),
            errors,
        }
    }

    /// Decode the field `name`.
    ///
    /// Returns `None` when the field is missing or malformed; the error is kept
    /// for [`finish`](Self::finish). A missing field decodes as `null`, so
    /// optional fields may be omitted.
    pub fn field<T: Codec>(&mut self, name: &str) -> Option<T> {
        let fields = self.fields?;
        let path = member_path(&self.path, name);

        match fields.get(name) {
            Some(value) => match T::decode_at(value, &path) {
                Ok(v) => Some(v),
                Err(errs) => {
                    self.errors.extend(errs);
                    None
                }
            },
            None => match T::decode_at(&GenericValue::Null, &path) {
                Ok(v) => Some(v),
                Err(_) => {
                    self.errors
                        .push(DecodeError::new(path, T::descriptor().to_string(), "missing"));
                    None
                }
            },
        }
    }

    /// Errors recorded so far.
    pub fn errors(&self) -> &[DecodeError] {
        &self.errors
    }

    /// Finish decoding, unwrapping the decoded fields.
    ///
    /// `fields` is a tuple of the `Option`s returned by [`field`](Self::field).
    pub fn finish<F: RecordFields>(self, fields: F) -> Result<F::Output, Vec<DecodeError>> {
        if !self.errors.is_empty() {
            return Err(self.errors);
        }
        fields
            .all_present()
            .ok_or_else(|| vec![DecodeError::new(self.path, "record", "incomplete record")])
    }
}

/// A tuple of optional decoded fields.
pub trait RecordFields {
    type Output;

    /// `Some` if every field is present.
    fn all_present(self) -> Option<Self::Output>;
}

macro_rules! impl_record_fields {
    ($($name:ident),+) => {
        impl<$($name),+> RecordFields for ($(Option<$name>,)+) {
            type Output = ($($name,)+);

            #[allow(non_snake_case)]
            fn all_present(self) -> Option<Self::Output> {
                let ($($name,)+) = self;
                Some(($($name?,)+))
            }
        }
    };
}

impl_record_fields!(A);
impl_record_fields!(A, B);
impl_record_fields!(A, B, C);
impl_record_fields!(A, B, C, D);
impl_record_fields!(A, B, C, D, E);
impl_record_fields!(A, B, C, D, E, F);
impl_record_fields!(A, B, C, D, E, F, G);
impl_record_fields!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TypeDescriptor;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
        label: Option<String>,
    }

    impl Codec for Point {
        fn descriptor() -> TypeDescriptor {
            TypeDescriptor::record([
                ("x", TypeDescriptor::Int),
                ("y", TypeDescriptor::Int),
                ("label", <Option<String>>::descriptor()),
            ])
        }

        fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
            let mut record = RecordDecoder::new::<Self>(value, path);
            let x = record.field::<i64>("x");
            let y = record.field::<i64>("y");
            let label = record.field::<Option<String>>("label");
            let (x, y, label) = record.finish((x, y, label))?;
            Ok(Point { x, y, label })
        }

        fn encode(self) -> GenericValue {
            json!({"x": self.x, "y": self.y, "label": self.label})
        }
    }

    #[test]
    fn test_decode_record() {
        let point = Point::decode(&json!({"x": 1, "y": 2})).unwrap();
        assert_eq!(
            point,
            Point {
                x: 1,
                y: 2,
                label: None
            }
        );
    }

    #[test]
    fn test_errors_accumulate_across_fields() {
        let errors = Point::decode(&json!({"x": "one", "label": 3})).unwrap_err();
        assert_eq!(
            errors,
            vec![
                DecodeError::new("$.x", "int", "string"),
                DecodeError::new("$.y", "int", "missing"),
                DecodeError::new("$.label", "string", "int"),
            ]
        );
    }

    #[test]
    fn test_not_a_record() {
        let errors = Point::decode(&json!([1, 2])).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$");
        assert_eq!(errors[0].found, "list");
    }

    #[test]
    fn test_nested_record_paths() {
        let errors = <Vec<Point>>::decode(&json!([{"x": 1, "y": 2}, {"x": 1, "y": true}])).unwrap_err();
        assert_eq!(errors, vec![DecodeError::new("$[1].y", "int", "bool")]);
    }

    #[test]
    fn test_field_names_needing_quotes() {
        let value = json!({"user.id": "seven"});
        let mut record = RecordDecoder::new::<Point>(&value, "$");
        assert_eq!(record.field::<i64>("user.id"), None);
        assert_eq!(record.field::<String>("display name"), None);
        assert_eq!(
            record.errors(),
            &[
                DecodeError::new(r#"$["user.id"]"#, "int", "string"),
                DecodeError::new(r#"$["display name"]"#, "string", "missing"),
            ]
        );
    }

    #[test]
    fn test_round_trip() {
        let point = Point {
            x: -4,
            y: 9,
            label: Some("origin-ish".to_string()),
        };
        let encoded = point.clone().encode();
        assert_eq!(Point::decode(&encoded), Ok(point));
    }
}
