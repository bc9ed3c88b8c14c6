//! The format capability negotiated between adapters and the config format.
//!
//! Serde hands a custom `deserialize`/`serialize` function an opaque
//! `Deserializer`/`Serializer`. Adapters that need the tree itself (not just the
//! serde data model) ask for it in-band:
//!
//! - [`ProbeDecoder::probe_config`] requests a newtype struct under a private name.
//!   [`ConfigDeserializer`] answers with the current path and node, which become a
//!   [`DecodeCapability`]. Every other deserializer answers differently and the
//!   probe fails with the caller's message.
//! - [`FormatEncoder::write_config_string`] sends a newtype struct under another
//!   private name. [`NodeSerializer`] grants the current thread a one-shot permission
//!   before letting the value write itself; without that grant the value refuses,
//!   so other serializers fail with the caller's message instead of emitting output.
//!
//! # Examples
//!
//! ```
//! use vc_node::capability::{FormatDecoder, ProbeDecoder};
//! use vc_node::{ConfigDeserializer, ConfigNode, ConfigPath};
//!
//! let root = ConfigNode::object([("name", ConfigNode::from("foo"))]);
//! let path = ConfigPath::parse("name").unwrap();
//!
//! let de = ConfigDeserializer::at(root.lookup("name").unwrap(), path.clone());
//! let capability = de.probe_config("config format required").unwrap();
//! assert_eq!(capability.current_path(), &path);
//! assert_eq!(capability.read_current_as_string().unwrap(), "foo");
//!
//! let mut json = serde_json::Deserializer::from_str(r#""foo""#);
//! let err = (&mut json).probe_config("config format required").unwrap_err();
//! assert!(err.to_string().contains("config format required"));
//! ```
//!
//! [`ConfigDeserializer`]: crate::ConfigDeserializer
//! [`NodeSerializer`]: crate::NodeSerializer

use alloc::borrow::Cow;
use alloc::string::String;
use core::cell::Cell;
use core::fmt;

use serde_core::de::value::BorrowedStrDeserializer;
use serde_core::de::{self, DeserializeSeed, MapAccess, Visitor};
use serde_core::ser::{self, Serialize, Serializer};
use serde_core::Deserializer;

use crate::de::ConfigDeserializer;
use crate::{ConfigNode, ConfigPath, Error, NodeError};

// -----------------------------------------------------------------------------
// Protocol tokens

pub(crate) const DECODE_TOKEN: &str = "$vc_node::private::DecodeCapability";
pub(crate) const ENCODE_TOKEN: &str = "$vc_node::private::EncodeCapability";

const PATH_KEY: &str = "$vc_node::private::path";
const NODE_KEY: &str = "$vc_node::private::node";

// -----------------------------------------------------------------------------
// FormatDecoder

/// Format-specific reads offered by the config deserializer.
pub trait FormatDecoder {
    /// The path of the value being decoded, relative to the decoded root.
    fn current_path(&self) -> &ConfigPath;

    /// Returns the subtree stored at `path`.
    ///
    /// `path` is absolute, and must be the current path or lie below it.
    fn resolve_subtree(&self, path: &ConfigPath) -> Result<&ConfigNode, NodeError>;

    /// Reads the current node as text, see [`ConfigNode::as_config_str`].
    fn read_current_as_string(&self) -> Result<Cow<'_, str>, NodeError>;
}

/// The answer of [`ConfigDeserializer`] to a capability probe.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeCapability {
    path: ConfigPath,
    node: ConfigNode,
}

impl DecodeCapability {
    #[inline]
    pub fn current_node(&self) -> &ConfigNode {
        &self.node
    }

    #[inline]
    pub fn into_parts(self) -> (ConfigPath, ConfigNode) {
        (self.path, self.node)
    }
}

impl FormatDecoder for DecodeCapability {
    #[inline]
    fn current_path(&self) -> &ConfigPath {
        &self.path
    }

    fn resolve_subtree(&self, path: &ConfigPath) -> Result<&ConfigNode, NodeError> {
        let rest = path.strip_prefix(&self.path).ok_or_else(|| NodeError::OutOfScope {
            path: path.clone(),
            scope: self.path.clone(),
        })?;
        ConfigNode::walk(&self.node, rest).ok_or_else(|| NodeError::Missing { path: path.clone() })
    }

    fn read_current_as_string(&self) -> Result<Cow<'_, str>, NodeError> {
        self.node.as_config_str().ok_or_else(|| NodeError::NotAString {
            path: self.path.clone(),
            found: self.node.kind(),
        })
    }
}

// -----------------------------------------------------------------------------
// Decode probe

/// Asks a deserializer for the config format capability.
///
/// Implemented for every [`Deserializer`].
pub trait ProbeDecoder<'de>: Deserializer<'de> {
    /// Returns the capability, or fails with `unsupported` if this deserializer
    /// is not a [`ConfigDeserializer`].
    fn probe_config<M: fmt::Display>(self, unsupported: M) -> Result<DecodeCapability, Self::Error> {
        self.deserialize_newtype_struct(DECODE_TOKEN, ProbeVisitor { unsupported })
    }
}

impl<'de, D: Deserializer<'de>> ProbeDecoder<'de> for D {}

struct ProbeVisitor<M> {
    unsupported: M,
}

impl<M: fmt::Display> ProbeVisitor<M> {
    #[inline]
    fn reject<E: de::Error>(&self) -> Result<DecodeCapability, E> {
        Err(E::custom(&self.unsupported))
    }
}

macro_rules! reject_scalars {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            #[inline]
            fn $method<E: de::Error>(self, _: $ty) -> Result<Self::Value, E> {
                self.reject()
            }
        )*
    };
}

impl<'de, M: fmt::Display> Visitor<'de> for ProbeVisitor<M> {
    type Value = DecodeCapability;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.unsupported, formatter)
    }

    reject_scalars! {
        visit_bool(bool),
        visit_i64(i64),
        visit_i128(i128),
        visit_u64(u64),
        visit_u128(u128),
        visit_f64(f64),
        visit_str(&str),
        visit_bytes(&[u8]),
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        self.reject()
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        self.reject()
    }

    fn visit_some<D: Deserializer<'de>>(self, _: D) -> Result<Self::Value, D::Error> {
        self.reject()
    }

    fn visit_newtype_struct<D: Deserializer<'de>>(self, _: D) -> Result<Self::Value, D::Error> {
        self.reject()
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, _: A) -> Result<Self::Value, A::Error> {
        self.reject()
    }

    fn visit_enum<A: de::EnumAccess<'de>>(self, _: A) -> Result<Self::Value, A::Error> {
        self.reject()
    }

    // Anything but the exact two-entry answer counts as a foreign format.
    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        if !matches!(map.next_key::<String>(), Ok(Some(key)) if key == PATH_KEY) {
            return self.reject();
        }
        let path: ConfigPath = map.next_value()?;

        if !matches!(map.next_key::<String>(), Ok(Some(key)) if key == NODE_KEY) {
            return self.reject();
        }
        let node: ConfigNode = map.next_value()?;

        Ok(DecodeCapability { path, node })
    }
}

/// The answer sent by [`ConfigDeserializer`] when it recognizes [`DECODE_TOKEN`].
pub(crate) struct CapabilityAccess<'de> {
    node: &'de ConfigNode,
    path: ConfigPath,
    state: u8,
}

impl<'de> CapabilityAccess<'de> {
    #[inline]
    pub(crate) fn new(node: &'de ConfigNode, path: ConfigPath) -> Self {
        Self {
            node,
            path,
            state: 0,
        }
    }
}

impl<'de> MapAccess<'de> for CapabilityAccess<'de> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(
        &mut self,
        seed: K,
    ) -> Result<Option<K::Value>, Self::Error> {
        let key = match self.state {
            0 => PATH_KEY,
            1 => NODE_KEY,
            _ => return Ok(None),
        };
        seed.deserialize(BorrowedStrDeserializer::new(key)).map(Some)
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Self::Error> {
        self.state += 1;
        match self.state {
            1 => seed.deserialize(de::value::StringDeserializer::new(self.path.to_string())),
            _ => seed.deserialize(ConfigDeserializer::at(self.node, self.path.clone())),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(2usize.saturating_sub(self.state as usize))
    }
}

// -----------------------------------------------------------------------------
// Encode grant

std::thread_local! {
    static ENCODE_GRANT: Cell<bool> = const { Cell::new(false) };
}

/// Held by [`NodeSerializer`](crate::NodeSerializer) while a granted value writes itself.
pub(crate) struct EncodeGrant(());

impl EncodeGrant {
    #[inline]
    pub(crate) fn open() -> Self {
        ENCODE_GRANT.set(true);
        Self(())
    }
}

impl Drop for EncodeGrant {
    #[inline]
    fn drop(&mut self) {
        ENCODE_GRANT.set(false);
    }
}

struct GrantedString<'a, M> {
    value: &'a str,
    unsupported: &'a M,
}

impl<M: fmt::Display> Serialize for GrantedString<'_, M> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if ENCODE_GRANT.replace(false) {
            serializer.serialize_str(self.value)
        } else {
            Err(ser::Error::custom(self.unsupported))
        }
    }
}

// -----------------------------------------------------------------------------
// FormatEncoder

/// Format-specific writes offered by the config serializer.
///
/// Implemented for every [`Serializer`]; only [`NodeSerializer`](crate::NodeSerializer)
/// lets the write through.
///
/// ```
/// use vc_node::capability::FormatEncoder;
/// use vc_node::{ConfigNode, NodeSerializer};
///
/// let node = NodeSerializer.write_config_string("abc", "config only").unwrap();
/// assert_eq!(node, ConfigNode::from("abc"));
///
/// let mut out = Vec::new();
/// let err = serde_json::Serializer::new(&mut out)
///     .write_config_string("abc", "config only")
///     .unwrap_err();
/// assert!(err.to_string().contains("config only"));
/// assert!(out.is_empty());
/// ```
pub trait FormatEncoder: Serializer {
    /// Writes `value` as the current node's string, or fails with `unsupported`
    /// if this serializer is not the config serializer.
    fn write_config_string<M: fmt::Display>(
        self,
        value: &str,
        unsupported: M,
    ) -> Result<Self::Ok, Self::Error> {
        self.serialize_newtype_struct(
            ENCODE_TOKEN,
            &GrantedString {
                value,
                unsupported: &unsupported,
            },
        )
    }
}

impl<S: Serializer> FormatEncoder for S {}
