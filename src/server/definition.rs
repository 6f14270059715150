//! Server definition - the four functions a binding supplies.

use crate::error::ServerError;
use crate::identity::{ProcedureIdentity, ProcedureKind};
use crate::value::{GenericValue, TypeDescriptor};

/// Binding between a transport's request/response types and the dispatcher.
///
/// All four methods are expected to be pure: the dispatcher may call them
/// from many tasks at once and never retries.
pub trait ServerDefinition: Send + Sync + 'static {
    /// Raw incoming request.
    type Input: Send + 'static;
    /// Raw outgoing response.
    type Output: Send + 'static;
    /// Binding-level error payload, also used for implementation failures.
    type Error: Send + 'static;

    /// Resolve which procedure the request targets.
    fn get_identity(&self, input: &Self::Input) -> Result<ProcedureIdentity, Self::Error>;

    /// Extract the raw parameters of a resolved procedure.
    fn get_params(
        &self,
        input: &Self::Input,
        kind: ProcedureKind,
        params_type: &TypeDescriptor,
    ) -> Result<GenericValue, Self::Error>;

    /// Turn a dispatch failure into a response.
    fn recover_error(&self, error: ServerError<Self::Error>) -> Self::Output;

    /// Turn a successful result into a response.
    fn encode_result(&self, value: GenericValue) -> Self::Output;
}

type GetIdentityFn<In, E> = dyn Fn(&In) -> Result<ProcedureIdentity, E> + Send + Sync;
type GetParamsFn<In, E> =
    dyn Fn(&In, ProcedureKind, &TypeDescriptor) -> Result<GenericValue, E> + Send + Sync;
type RecoverErrorFn<Out, E> = dyn Fn(ServerError<E>) -> Out + Send + Sync;
type EncodeResultFn<Out> = dyn Fn(GenericValue) -> Out + Send + Sync;

/// A [`ServerDefinition`] assembled from four closures.
///
/// # Example
///
/// ```
/// use procwire_server::{FnDefinition, ProcedureIdentity, ServerError};
///
/// // Requests are `(procedure name, params)` pairs; responses are strings.
/// let definition = FnDefinition::new(
///     |input: &(String, serde_json::Value)| Ok::<_, String>(ProcedureIdentity::query(input.0.clone())),
///     |input: &(String, serde_json::Value), _kind, _ty| Ok(input.1.clone()),
///     |error: ServerError<String>| format!("error: {}", error),
///     |value| value.to_string(),
/// );
/// # let _ = definition;
/// ```
pub struct FnDefinition<In, Out, E> {
    get_identity: Box<GetIdentityFn<In, E>>,
    get_params: Box<GetParamsFn<In, E>>,
    recover_error: Box<RecoverErrorFn<Out, E>>,
    encode_result: Box<EncodeResultFn<Out>>,
}

impl<In, Out, E> FnDefinition<In, Out, E> {
    /// Create a definition from its four functions.
    pub fn new<I, P, R, C>(get_identity: I, get_params: P, recover_error: R, encode_result: C) -> Self
    where
        I: Fn(&In) -> Result<ProcedureIdentity, E> + Send + Sync + 'static,
        P: Fn(&In, ProcedureKind, &TypeDescriptor) -> Result<GenericValue, E> + Send + Sync + 'static,
        R: Fn(ServerError<E>) -> Out + Send + Sync + 'static,
        C: Fn(GenericValue) -> Out + Send + Sync + 'static,
    {
        Self {
            get_identity: Box::new(get_identity),
            get_params: Box::new(get_params),
            recover_error: Box::new(recover_error),
            encode_result: Box::new(encode_result),
        }
    }
}

impl<In, Out, E> ServerDefinition for FnDefinition<In, Out, E>
where
    In: Send + 'static,
    Out: Send + 'static,
    E: Send + 'static,
{
    type Input = In;
    type Output = Out;
    type Error = E;

    fn get_identity(&self, input: &In) -> Result<ProcedureIdentity, E> {
        (self.get_identity)(input)
    }

    fn get_params(
        &self,
        input: &In,
        kind: ProcedureKind,
        params_type: &TypeDescriptor,
    ) -> Result<GenericValue, E> {
        (self.get_params)(input, kind, params_type)
    }

    fn recover_error(&self, error: ServerError<E>) -> Out {
        (self.recover_error)(error)
    }

    fn encode_result(&self, value: GenericValue) -> Out {
        (self.encode_result)(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definition() -> FnDefinition<(String, GenericValue), String, String> {
        FnDefinition::new(
            |input: &(String, GenericValue)| {
                if input.0.is_empty() {
                    Err("no name".to_string())
                } else {
                    Ok(ProcedureIdentity::query(input.0.clone()))
                }
            },
            |input: &(String, GenericValue), _kind, _ty: &TypeDescriptor| Ok(input.1.clone()),
            |error: ServerError<String>| format!("error: {}", error),
            |value: GenericValue| value.to_string(),
        )
    }

    #[test]
    fn test_closures_are_forwarded() {
        let def = definition();

        let input = ("echo".to_string(), json!("hi"));
        assert_eq!(def.get_identity(&input), Ok(ProcedureIdentity::query("echo")));
        assert_eq!(
            def.get_params(&input, ProcedureKind::Query, &TypeDescriptor::String),
            Ok(json!("hi"))
        );
        assert_eq!(def.encode_result(json!(6)), "6");
        assert_eq!(
            def.recover_error(ServerError::WrongProcedure),
            "error: no procedure matches the requested identity"
        );
    }

    #[test]
    fn test_identity_failure() {
        let def = definition();
        assert_eq!(
            def.get_identity(&(String::new(), json!(null))),
            Err("no name".to_string())
        );
    }
}
