//! Capability checks shared by every adapter.
//!
//! Each function fails with [`AdapterError::UnsupportedFormat`] when the
//! deserializer or serializer it receives is not the config format.

use alloc::string::ToString;
use core::fmt;

use serde_core::de::Error as _;
use serde_core::{Deserializer, Serializer, de, ser};
use vc_node::ConfigDeserializer;
use vc_node::capability::{DecodeCapability, FormatEncoder, ProbeDecoder};

use crate::{AdapterError, ConfigAdapter, Direction};

/// Returns the decode capability of `deserializer`.
///
/// Some formats refuse the probe with their own error before reaching a visitor.
/// The config format never fails it, so every failure is reported as
/// [`AdapterError::UnsupportedFormat`].
#[inline]
pub fn decoder<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DecodeCapability, D::Error> {
    let unsupported = AdapterError::unsupported_format(Direction::Decode);
    deserializer
        .probe_config(&unsupported)
        .map_err(|_| D::Error::custom(unsupported))
}

/// Writes `value` as the current node through the encode capability of `serializer`.
///
/// Like [`decoder`], any refusal is reported as [`AdapterError::UnsupportedFormat`].
#[inline]
pub fn encode_string<S: Serializer>(serializer: S, value: &str) -> Result<S::Ok, S::Error> {
    let unsupported = AdapterError::unsupported_format(Direction::Encode);
    serializer
        .write_config_string(value, &unsupported)
        .map_err(|_| ser::Error::custom(unsupported))
}

/// The error of an adapter half that is never supported.
#[inline]
pub fn unsupported_direction<E: ser::Error>(adapter: &'static str, direction: Direction) -> E {
    E::custom(AdapterError::UnsupportedDirection { adapter, direction })
}

#[inline]
pub(crate) fn construction_failure<E: de::Error>(err: impl fmt::Display) -> E {
    E::custom(AdapterError::ConstructionFailure(err.to_string()))
}

#[inline]
pub(crate) fn user_failure<E: de::Error>(err: impl fmt::Display) -> E {
    E::custom(AdapterError::UserFunctionFailure(err.to_string()))
}

/// Decodes an optional value: `null` reads as `None`, anything else goes
/// through `adapter`.
///
/// The capability is checked first, so foreign formats fail even for `null`.
pub fn deserialize_option<'de, T, A, D>(adapter: &A, deserializer: D) -> Result<Option<T>, D::Error>
where
    A: ConfigAdapter<T>,
    D: Deserializer<'de>,
{
    let capability = decoder(deserializer)?;
    if capability.current_node().is_null() {
        return Ok(None);
    }
    let (path, node) = capability.into_parts();
    adapter
        .deserialize(ConfigDeserializer::at(&node, path.clone()))
        .map(Some)
        .map_err(|err| D::Error::custom(err.strip_path(&path)))
}

/// Encodes an optional value: `None` is written as a unit, `Some` goes through `adapter`.
pub fn serialize_option<T, A, S>(adapter: &A, value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    A: ConfigAdapter<T>,
    S: Serializer,
{
    match value {
        Some(value) => adapter.serialize(value, serializer),
        None => serializer.serialize_none(),
    }
}
