//! Response body decoding: JSON first, raw text as a fallback.
//!
//! A body that parses as JSON is deserialized into the result type. Any
//! other body is offered to the result type as a single string value, which
//! types such as `String` or `serde_json::Value` accept and structured
//! types reject. The result is only written on success.

use std::any::type_name;

use serde::de::value::{Error as ValueError, StringDeserializer};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;

use crate::error::Error;

pub(crate) fn decode_into<T: DeserializeOwned>(body: &[u8], target: &mut T) -> Result<(), Error> {
    if body.is_empty() {
        return Ok(());
    }

    if is_json(body) {
        *target = serde_json::from_slice(body).map_err(|source| Error::Decoding {
            type_name: type_name::<T>(),
            source: source.into(),
        })?;
        return Ok(());
    }

    let text = std::str::from_utf8(body).map_err(|source| Error::Decoding {
        type_name: type_name::<T>(),
        source: source.into(),
    })?;
    *target = T::deserialize(StringDeserializer::<ValueError>::new(text.to_string())).map_err(|_| {
        Error::ResultType {
            type_name: type_name::<T>(),
        }
    })?;
    Ok(())
}

fn is_json(body: &[u8]) -> bool {
    serde_json::from_slice::<IgnoredAny>(body).is_ok()
}
