//! Adapters turn a raw signal body into a typed [`Payload`].

use std::fmt;
use std::sync::Arc;

use pulse_bus::{FromValue, Value};

use crate::error::PayloadError;
use crate::payload::Payload;

type DecodeFn = dyn Fn(&str, &[Value]) -> Result<Payload, PayloadError> + Send + Sync;

/// Decoder bound to one event name in the invocation table.
#[derive(Clone)]
pub struct Adapter {
    decode: Arc<DecodeFn>,
}

impl Adapter {
    /// Adapter from an arbitrary decode function.
    ///
    /// The function receives the bare event name and the signal body.
    pub fn new<F>(decode: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Result<Payload, PayloadError> + Send + Sync + 'static,
    {
        Self {
            decode: Arc::new(decode),
        }
    }

    /// Adapter for events without arguments.
    pub fn unit(payload: Payload) -> Self {
        Self::new(move |event, body| {
            expect_arity(event, body, 0)?;
            Ok(payload.clone())
        })
    }

    /// Adapter for events with exactly one argument of type `T`.
    pub fn single<T: FromValue + 'static>(wrap: fn(T) -> Payload) -> Self {
        Self::new(move |event, body| {
            expect_arity(event, body, 1)?;
            Ok(wrap(argument(event, body, 0)?))
        })
    }

    /// Adapter that hands the body over untouched as [`Payload::Raw`].
    pub fn raw() -> Self {
        Self::new(|event, body| {
            Ok(Payload::Raw {
                event: event.to_string(),
                body: body.to_vec(),
            })
        })
    }

    /// Decode `body` for `event`.
    pub fn decode(&self, event: &str, body: &[Value]) -> Result<Payload, PayloadError> {
        (self.decode)(event, body)
    }
}

impl fmt::Debug for Adapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Adapter").finish_non_exhaustive()
    }
}

/// Fail unless `body` has exactly `expected` arguments.
pub fn expect_arity(event: &str, body: &[Value], expected: usize) -> Result<(), PayloadError> {
    if body.len() == expected {
        Ok(())
    } else {
        Err(PayloadError::Arity {
            event: event.to_string(),
            expected,
            found: body.len(),
        })
    }
}

/// Convert argument `index` of `body` to `T`.
pub fn argument<T: FromValue>(
    event: &str,
    body: &[Value],
    index: usize,
) -> Result<T, PayloadError> {
    let value = body.get(index).ok_or_else(|| PayloadError::Arity {
        event: event.to_string(),
        expected: index + 1,
        found: body.len(),
    })?;
    T::from_value(value).map_err(|source| PayloadError::Argument {
        event: event.to_string(),
        index,
        source,
    })
}
