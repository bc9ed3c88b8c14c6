use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use serde_core::de::{self, DeserializeSeed, MapAccess, SeqAccess, Visitor};
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{ConfigNode, ConfigObject};

// -----------------------------------------------------------------------------
// Serialize

impl Serialize for ConfigNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => serializer.collect_seq(items),
            Self::Object(map) => serializer.collect_map(map),
        }
    }
}

// -----------------------------------------------------------------------------
// Deserialize

/// Any self-describing format can produce a tree.
///
/// ```
/// use vc_node::ConfigNode;
///
/// let node: ConfigNode = serde_json::from_str(r#"{ "uuid": "b14240e7-acc0-4a19-bc5d-31a7901e36b0" }"#).unwrap();
/// assert_eq!(
///     node.lookup("uuid").unwrap().as_str(),
///     Some("b14240e7-acc0-4a19-bc5d-31a7901e36b0"),
/// );
/// ```
impl<'de> Deserialize<'de> for ConfigNode {
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = ConfigNode;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any configuration value")
    }

    #[inline]
    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(ConfigNode::Bool(v))
    }

    #[inline]
    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(ConfigNode::Int(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(ConfigNode::Int)
            .map_err(|_| E::custom(format_args!("integer `{v}` does not fit in 64 bits")))
    }

    // Values above `i64::MAX` keep their digits as text.
    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(v).map_or_else(|_| ConfigNode::String(v.to_string()), ConfigNode::Int))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        u64::try_from(v)
            .map_err(|_| E::custom(format_args!("integer `{v}` does not fit in 64 bits")))
            .and_then(|v| self.visit_u64(v))
    }

    #[inline]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(ConfigNode::Float(v))
    }

    #[inline]
    fn visit_char<E: de::Error>(self, v: char) -> Result<Self::Value, E> {
        Ok(ConfigNode::String(v.to_string()))
    }

    #[inline]
    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(ConfigNode::String(v.to_string()))
    }

    #[inline]
    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(ConfigNode::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
        Ok(ConfigNode::List(v.iter().map(|b| ConfigNode::Int(i64::from(*b))).collect()))
    }

    #[inline]
    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ConfigNode::Null)
    }

    #[inline]
    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(ConfigNode::Null)
    }

    #[inline]
    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    #[inline]
    fn visit_newtype_struct<D: Deserializer<'de>>(
        self,
        deserializer: D,
    ) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(ConfigNode::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut object = ConfigObject::new();
        while let Some(key) = map.next_key_seed(KeySeed)? {
            let value = map.next_value()?;
            object.insert(key, value);
        }
        Ok(ConfigNode::Object(object))
    }
}

/// Reads object keys, rendering scalar keys of formats like RON as text.
struct KeySeed;

impl<'de> DeserializeSeed<'de> for KeySeed {
    type Value = String;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        struct KeyVisitor;

        impl Visitor<'_> for KeyVisitor {
            type Value = String;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string or scalar key")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_char<E: de::Error>(self, v: char) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(v.to_string())
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(v)
            }
        }

        deserializer.deserialize_any(KeyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use crate::ConfigNode;

    #[test]
    fn from_json() {
        let node: ConfigNode =
            serde_json::from_str(r#"{ "a": [1, 2.5, "x", null, true], "b": { "c": 18446744073709551615 } }"#)
                .unwrap();
        assert_eq!(
            node.lookup("a").unwrap(),
            &ConfigNode::List(vec![
                ConfigNode::Int(1),
                ConfigNode::Float(2.5),
                ConfigNode::from("x"),
                ConfigNode::Null,
                ConfigNode::Bool(true),
            ])
        );
        assert_eq!(node.lookup("b.c").unwrap().coerce_u64(), Some(u64::MAX));
    }

    #[test]
    fn from_ron_map_with_scalar_keys() {
        let node: ConfigNode = ron::from_str(r#"{ 1: "one", "two": 2 }"#).unwrap();
        assert_eq!(node.get("1"), Some(&ConfigNode::from("one")));
        assert_eq!(node.get("two"), Some(&ConfigNode::Int(2)));
    }

    #[test]
    fn json_round_trip() {
        let text = r#"{"list":[1,"two"],"nested":{"flag":false}}"#;
        let node: ConfigNode = serde_json::from_str(text).unwrap();
        assert_eq!(serde_json::to_string(&node).unwrap(), text);
    }
}
