//! Typed conversion between Rust values and [`GenericValue`].
//!
//! Decoding validates the whole value against the declared type and reports
//! every mismatch it finds, not just the first one.

use std::collections::BTreeMap;

use super::{member_path, value_kind, GenericValue, TypeDescriptor};
use crate::error::DecodeError;

/// Path of the top-level value in decode errors.
pub const ROOT_PATH: &str = "$";

/// String forms of the non-finite floats.
const INFINITY: &str = "Infinity";
const NEG_INFINITY: &str = "-Infinity";
const NAN: &str = "NaN";

/// Key wrapping `Some` when the inner type can itself encode as `null`.
const SOME_KEY: &str = "some";

/// A type that can be converted to and from a [`GenericValue`].
pub trait Codec: Sized {
    /// Schema of this type.
    fn descriptor() -> TypeDescriptor;

    /// Decode `value`, reporting errors relative to `path`.
    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>>;

    /// Encode into a generic value.
    fn encode(self) -> GenericValue;

    /// Decode a top-level value.
    fn decode(value: &GenericValue) -> Result<Self, Vec<DecodeError>> {
        Self::decode_at(value, ROOT_PATH)
    }
}

fn mismatch<T>(path: &str, value: &GenericValue) -> Result<T, Vec<DecodeError>>
where
    T: Codec,
{
    Err(vec![DecodeError::new(
        path,
        T::descriptor().to_string(),
        value_kind(value),
    )])
}

fn out_of_range<T>(path: &str, value: &GenericValue) -> Result<T, Vec<DecodeError>>
where
    T: Codec,
{
    Err(vec![DecodeError::new(
        path,
        format!("{} ({})", T::descriptor(), std::any::type_name::<T>()),
        format!("{} out of range", value),
    )])
}

impl Codec for () {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Unit
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        match value {
            GenericValue::Null => Ok(()),
            other => mismatch::<Self>(path, other),
        }
    }

    fn encode(self) -> GenericValue {
        GenericValue::Null
    }
}

impl Codec for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Bool
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        match value.as_bool() {
            Some(b) => Ok(b),
            None => mismatch::<Self>(path, value),
        }
    }

    fn encode(self) -> GenericValue {
        GenericValue::Bool(self)
    }
}

impl Codec for i64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Int
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        match value {
            GenericValue::Number(n) => match n.as_i64() {
                Some(i) => Ok(i),
                None if n.is_u64() => out_of_range::<Self>(path, value),
                None => mismatch::<Self>(path, value),
            },
            other => mismatch::<Self>(path, other),
        }
    }

    fn encode(self) -> GenericValue {
        GenericValue::from(self)
    }
}

impl Codec for u64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Int
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        match value {
            GenericValue::Number(n) => match n.as_u64() {
                Some(u) => Ok(u),
                None if n.is_i64() => out_of_range::<Self>(path, value),
                None => mismatch::<Self>(path, value),
            },
            other => mismatch::<Self>(path, other),
        }
    }

    fn encode(self) -> GenericValue {
        GenericValue::from(self)
    }
}

impl Codec for i32 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Int
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        let wide = i64::decode_at(value, path)?;
        i32::try_from(wide).or_else(|_| out_of_range::<Self>(path, value))
    }

    fn encode(self) -> GenericValue {
        GenericValue::from(self)
    }
}

impl Codec for u32 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Int
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        let wide = u64::decode_at(value, path)?;
        u32::try_from(wide).or_else(|_| out_of_range::<Self>(path, value))
    }

    fn encode(self) -> GenericValue {
        GenericValue::from(self)
    }
}

impl Codec for f64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Float
    }

    // Integers are accepted where a float is declared.
    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        match value {
            GenericValue::Number(n) => match n.as_f64() {
                Some(f) => Ok(f),
                None => mismatch::<Self>(path, value),
            },
            GenericValue::String(s) => match s.as_str() {
                INFINITY => Ok(f64::INFINITY),
                NEG_INFINITY => Ok(f64::NEG_INFINITY),
                NAN => Ok(f64::NAN),
                _ => mismatch::<Self>(path, value),
            },
            other => mismatch::<Self>(path, other),
        }
    }

    // JSON numbers cannot hold non-finite floats.
    fn encode(self) -> GenericValue {
        if self.is_nan() {
            GenericValue::from(NAN)
        } else if self == f64::INFINITY {
            GenericValue::from(INFINITY)
        } else if self == f64::NEG_INFINITY {
            GenericValue::from(NEG_INFINITY)
        } else {
            GenericValue::from(self)
        }
    }
}

impl Codec for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::String
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        match value {
            GenericValue::String(s) => Ok(s.clone()),
            other => mismatch::<Self>(path, other),
        }
    }

    fn encode(self) -> GenericValue {
        GenericValue::String(self)
    }
}

/// Whether values described by `descriptor` may encode as `null`.
fn is_nullable(descriptor: &TypeDescriptor) -> bool {
    matches!(
        descriptor,
        TypeDescriptor::Unit | TypeDescriptor::Optional { .. } | TypeDescriptor::Any
    )
}

/// `Some(v)` encodes as `v`, unless `v` may itself be `null`: then it is
/// wrapped as `{"some": v}` so that `Some(None)` and `None` stay distinct.
impl<T: Codec> Codec for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::optional(T::descriptor())
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        match value {
            GenericValue::Null => Ok(None),
            other if is_nullable(&T::descriptor()) => {
                let inner = other
                    .as_object()
                    .filter(|fields| fields.len() == 1)
                    .and_then(|fields| fields.get(SOME_KEY));
                match inner {
                    Some(inner) => T::decode_at(inner, &member_path(path, SOME_KEY)).map(Some),
                    None => mismatch::<Self>(path, other),
                }
            }
            other => T::decode_at(other, path).map(Some),
        }
    }

    fn encode(self) -> GenericValue {
        match self {
            Some(inner) if is_nullable(&T::descriptor()) => {
                let mut fields = serde_json::Map::new();
                fields.insert(SOME_KEY.to_string(), inner.encode());
                GenericValue::Object(fields)
            }
            Some(inner) => inner.encode(),
            None => GenericValue::Null,
        }
    }
}

impl<T: Codec> Codec for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::list(T::descriptor())
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        let items = match value {
            GenericValue::Array(items) => items,
            other => return mismatch::<Self>(path, other),
        };

        let mut decoded = Vec::with_capacity(items.len());
        let mut errors = Vec::new();
        for (i, item) in items.iter().enumerate() {
            match T::decode_at(item, &format!("{}[{}]", path, i)) {
                Ok(v) => decoded.push(v),
                Err(errs) => errors.extend(errs),
            }
        }

        if errors.is_empty() {
            Ok(decoded)
        } else {
            Err(errors)
        }
    }

    fn encode(self) -> GenericValue {
        GenericValue::Array(self.into_iter().map(Codec::encode).collect())
    }
}

impl<T: Codec> Codec for BTreeMap<String, T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::map(T::descriptor())
    }

    fn decode_at(value: &GenericValue, path: &str) -> Result<Self, Vec<DecodeError>> {
        let entries = match value {
            GenericValue::Object(entries) => entries,
            other => return mismatch::<Self>(path, other),
        };

        let mut decoded = BTreeMap::new();
        let mut errors = Vec::new();
        for (key, item) in entries {
            match T::decode_at(item, &member_path(path, key)) {
                Ok(v) => {
                    decoded.insert(key.clone(), v);
                }
                Err(errs) => errors.extend(errs),
            }
        }

        if errors.is_empty() {
            Ok(decoded)
        } else {
            Err(errors)
        }
    }

    fn encode(self) -> GenericValue {
        GenericValue::Object(self.into_iter().map(|(k, v)| (k, v.encode())).collect())
    }
}

impl Codec for GenericValue {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Any
    }

    fn decode_at(value: &GenericValue, _path: &str) -> Result<Self, Vec<DecodeError>> {
        Ok(value.clone())
    }

    fn encode(self) -> GenericValue {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitives() {
        assert_eq!(bool::decode(&json!(true)), Ok(true));
        assert_eq!(i64::decode(&json!(-7)), Ok(-7));
        assert_eq!(u64::decode(&json!(7)), Ok(7));
        assert_eq!(i32::decode(&json!(42)), Ok(42));
        assert_eq!(u32::decode(&json!(42)), Ok(42));
        assert_eq!(f64::decode(&json!(1.5)), Ok(1.5));
        assert_eq!(String::decode(&json!("hi")), Ok("hi".to_string()));
        assert_eq!(<()>::decode(&json!(null)), Ok(()));
    }

    #[test]
    fn test_float_accepts_int() {
        assert_eq!(f64::decode(&json!(3)), Ok(3.0));
    }

    #[test]
    fn test_int_rejects_float() {
        let errors = i64::decode(&json!(3.5)).unwrap_err();
        assert_eq!(errors, vec![DecodeError::new("$", "int", "float")]);
    }

    #[test]
    fn test_range_checks() {
        let errors = i32::decode(&json!(i64::from(i32::MAX) + 1)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].found.contains("out of range"));

        assert!(u64::decode(&json!(-1)).is_err());
        assert!(u32::decode(&json!(u64::from(u32::MAX) + 1)).is_err());
        assert!(i64::decode(&json!(u64::MAX)).is_err());
    }

    #[test]
    fn test_option() {
        assert_eq!(<Option<i64>>::decode(&json!(null)), Ok(None));
        assert_eq!(<Option<i64>>::decode(&json!(5)), Ok(Some(5)));
        assert!(<Option<i64>>::decode(&json!("5")).is_err());
        assert_eq!(Some(5i64).encode(), json!(5));
        assert_eq!(None::<i64>.encode(), json!(null));
    }

    #[test]
    fn test_nested_option_keeps_some_none() {
        assert_eq!(Some(None::<i64>).encode(), json!({"some": null}));
        assert_eq!(Some(Some(3i64)).encode(), json!({"some": 3}));
        assert_eq!(None::<Option<i64>>.encode(), json!(null));

        for original in [None, Some(None), Some(Some(3i64))] {
            let decoded = <Option<Option<i64>>>::decode(&original.encode());
            assert_eq!(decoded, Ok(original));
        }

        assert_eq!(<Option<()>>::decode(&Some(()).encode()), Ok(Some(())));
        assert_eq!(
            <Option<GenericValue>>::decode(&Some(json!(null)).encode()),
            Ok(Some(json!(null)))
        );
    }

    #[test]
    fn test_nested_option_rejects_bare_value() {
        let errors = <Option<Option<i64>>>::decode(&json!(3)).unwrap_err();
        assert_eq!(
            errors,
            vec![DecodeError::new("$", "optional<optional<int>>", "int")]
        );

        let errors = <Option<Option<i64>>>::decode(&json!({"some": "x"})).unwrap_err();
        assert_eq!(errors, vec![DecodeError::new("$.some", "int", "string")]);
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(f64::INFINITY.encode(), json!("Infinity"));
        assert_eq!(f64::NEG_INFINITY.encode(), json!("-Infinity"));
        assert_eq!(f64::NAN.encode(), json!("NaN"));
        assert_eq!(1.5f64.encode(), json!(1.5));

        assert_eq!(f64::decode(&json!("Infinity")), Ok(f64::INFINITY));
        assert_eq!(f64::decode(&json!("-Infinity")), Ok(f64::NEG_INFINITY));
        assert!(f64::decode(&json!("NaN")).unwrap().is_nan());

        let errors = f64::decode(&json!("1.5")).unwrap_err();
        assert_eq!(errors, vec![DecodeError::new("$", "float", "string")]);
        assert!(f64::decode(&json!(null)).is_err());
    }

    #[test]
    fn test_list_collects_all_errors() {
        let errors = <Vec<String>>::decode(&json!(["a", 1, "c", true])).unwrap_err();
        assert_eq!(
            errors,
            vec![
                DecodeError::new("$[1]", "string", "int"),
                DecodeError::new("$[3]", "string", "bool"),
            ]
        );
    }

    #[test]
    fn test_map_paths() {
        let errors = <BTreeMap<String, bool>>::decode(&json!({"a": true, "b": "no"})).unwrap_err();
        assert_eq!(errors, vec![DecodeError::new("$.b", "bool", "string")]);

        let decoded = <BTreeMap<String, bool>>::decode(&json!({"a": true})).unwrap();
        assert_eq!(decoded.get("a"), Some(&true));

        let errors = <BTreeMap<String, bool>>::decode(&json!({"a.b": 1, "x y": true})).unwrap_err();
        assert_eq!(errors, vec![DecodeError::new(r#"$["a.b"]"#, "bool", "int")]);
    }

    #[test]
    fn test_nested_paths() {
        let errors = <Vec<Vec<i64>>>::decode(&json!([[1], [2, "x"]])).unwrap_err();
        assert_eq!(errors, vec![DecodeError::new("$[1][1]", "int", "string")]);
    }

    #[test]
    fn test_wrong_container() {
        let errors = <Vec<i64>>::decode(&json!({"a": 1})).unwrap_err();
        assert_eq!(errors, vec![DecodeError::new("$", "list<int>", "record")]);
    }

    #[test]
    fn test_any_passes_through() {
        let value = json!({"anything": [1, "two", null]});
        assert_eq!(GenericValue::decode(&value), Ok(value.clone()));
        assert_eq!(value.clone().encode(), value);
    }

    #[test]
    fn test_round_trip() {
        let original: BTreeMap<String, Vec<Option<f64>>> = [
            ("xs".to_string(), vec![Some(1.5), None]),
            ("ys".to_string(), vec![]),
        ]
        .into_iter()
        .collect();
        let decoded = <BTreeMap<String, Vec<Option<f64>>>>::decode(&original.clone().encode());
        assert_eq!(decoded, Ok(original));

        let infinite = vec![f64::INFINITY, -2.0, f64::NEG_INFINITY];
        assert_eq!(<Vec<f64>>::decode(&infinite.clone().encode()), Ok(infinite));
    }
}
