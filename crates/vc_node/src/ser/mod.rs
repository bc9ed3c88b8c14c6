//! Writing Rust values into a [`ConfigNode`] tree.

mod key;

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde_core::ser::{self, Serialize};
use serde_core::Serializer;

use crate::capability::{ENCODE_TOKEN, EncodeGrant};
use crate::{ConfigNode, ConfigObject, Error};

use key::KeySerializer;

/// Serializes `value` into a new tree.
///
/// # Examples
///
/// ```
/// use serde::Serialize;
/// use vc_node::{ConfigNode, to_node};
///
/// #[derive(Serialize)]
/// struct Person {
///     name: &'static str,
///     age: u32,
/// }
///
/// let node = to_node(&Person { name: "foo", age: 20 }).unwrap();
/// assert_eq!(node.lookup("age").unwrap(), &ConfigNode::from(20));
/// ```
#[inline]
pub fn to_node<T: ?Sized + Serialize>(value: &T) -> Result<ConfigNode, Error> {
    value.serialize(NodeSerializer)
}

/// A serde [`Serializer`] that produces [`ConfigNode`]s.
///
/// Integers above `i64::MAX` are stored as their decimal text, which reads back
/// through the same coercion as any numeric string. Enum variants are written the
/// way [`ConfigDeserializer`](crate::ConfigDeserializer) reads them.
///
/// It is the only serializer that accepts a
/// [`write_config_string`](crate::capability::FormatEncoder::write_config_string) request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeSerializer;

impl Serializer for NodeSerializer {
    type Ok = ConfigNode;
    type Error = Error;

    type SerializeSeq = SerializeList;
    type SerializeTuple = SerializeList;
    type SerializeTupleStruct = SerializeList;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeObject;
    type SerializeStruct = SerializeObject;
    type SerializeStructVariant = SerializeStructVariant;

    #[inline]
    fn serialize_bool(self, v: bool) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::Bool(v))
    }

    #[inline]
    fn serialize_i8(self, v: i8) -> Result<ConfigNode, Error> {
        self.serialize_i64(i64::from(v))
    }

    #[inline]
    fn serialize_i16(self, v: i16) -> Result<ConfigNode, Error> {
        self.serialize_i64(i64::from(v))
    }

    #[inline]
    fn serialize_i32(self, v: i32) -> Result<ConfigNode, Error> {
        self.serialize_i64(i64::from(v))
    }

    #[inline]
    fn serialize_i64(self, v: i64) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::Int(v))
    }

    fn serialize_i128(self, v: i128) -> Result<ConfigNode, Error> {
        match i64::try_from(v) {
            Ok(v) => Ok(ConfigNode::Int(v)),
            Err(_) => Err(Error::message(format_args!("integer `{v}` does not fit in 64 bits"))),
        }
    }

    #[inline]
    fn serialize_u8(self, v: u8) -> Result<ConfigNode, Error> {
        self.serialize_i64(i64::from(v))
    }

    #[inline]
    fn serialize_u16(self, v: u16) -> Result<ConfigNode, Error> {
        self.serialize_i64(i64::from(v))
    }

    #[inline]
    fn serialize_u32(self, v: u32) -> Result<ConfigNode, Error> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<ConfigNode, Error> {
        Ok(i64::try_from(v).map_or_else(|_| ConfigNode::String(v.to_string()), ConfigNode::Int))
    }

    fn serialize_u128(self, v: u128) -> Result<ConfigNode, Error> {
        match u64::try_from(v) {
            Ok(v) => self.serialize_u64(v),
            Err(_) => Err(Error::message(format_args!("integer `{v}` does not fit in 64 bits"))),
        }
    }

    #[inline]
    fn serialize_f32(self, v: f32) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::Float(f64::from(v)))
    }

    #[inline]
    fn serialize_f64(self, v: f64) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::Float(v))
    }

    #[inline]
    fn serialize_char(self, v: char) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::String(v.to_string()))
    }

    #[inline]
    fn serialize_str(self, v: &str) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::List(v.iter().map(|b| ConfigNode::Int(i64::from(*b))).collect()))
    }

    #[inline]
    fn serialize_none(self) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::Null)
    }

    #[inline]
    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<ConfigNode, Error> {
        value.serialize(self)
    }

    #[inline]
    fn serialize_unit(self) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::Null)
    }

    #[inline]
    fn serialize_unit_struct(self, _name: &'static str) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::Null)
    }

    #[inline]
    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<ConfigNode, Error> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<ConfigNode, Error> {
        let _grant = (name == ENCODE_TOKEN).then(EncodeGrant::open);
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<ConfigNode, Error> {
        let value = value.serialize(self)?;
        Ok(ConfigNode::object([(variant, value)]))
    }

    #[inline]
    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeList, Error> {
        Ok(SerializeList {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    #[inline]
    fn serialize_tuple(self, len: usize) -> Result<SerializeList, Error> {
        self.serialize_seq(Some(len))
    }

    #[inline]
    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeList, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant, Error> {
        Ok(SerializeTupleVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    #[inline]
    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeObject, Error> {
        Ok(SerializeObject {
            map: ConfigObject::new(),
            next_key: None,
        })
    }

    #[inline]
    fn serialize_struct(self, _name: &'static str, len: usize) -> Result<SerializeObject, Error> {
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeStructVariant, Error> {
        Ok(SerializeStructVariant {
            variant,
            map: ConfigObject::new(),
        })
    }
}

// -----------------------------------------------------------------------------
// Compound serializers

pub struct SerializeList {
    items: Vec<ConfigNode>,
}

impl ser::SerializeSeq for SerializeList {
    type Ok = ConfigNode;
    type Error = Error;

    #[inline]
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.items.push(value.serialize(NodeSerializer)?);
        Ok(())
    }

    #[inline]
    fn end(self) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::List(self.items))
    }
}

impl ser::SerializeTuple for SerializeList {
    type Ok = ConfigNode;
    type Error = Error;

    #[inline]
    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    #[inline]
    fn end(self) -> Result<ConfigNode, Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeList {
    type Ok = ConfigNode;
    type Error = Error;

    #[inline]
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    #[inline]
    fn end(self) -> Result<ConfigNode, Error> {
        ser::SerializeSeq::end(self)
    }
}

pub struct SerializeTupleVariant {
    variant: &'static str,
    items: Vec<ConfigNode>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = ConfigNode;
    type Error = Error;

    #[inline]
    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        self.items.push(value.serialize(NodeSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::object([(self.variant, ConfigNode::List(self.items))]))
    }
}

pub struct SerializeObject {
    map: ConfigObject,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeObject {
    type Ok = ConfigNode;
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), Error> {
        self.next_key = Some(key.serialize(KeySerializer)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| Error::message("map value serialized before its key"))?;
        let value = value.serialize(NodeSerializer)?;
        self.map.insert(key, value);
        Ok(())
    }

    #[inline]
    fn end(self) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::Object(self.map))
    }
}

impl ser::SerializeStruct for SerializeObject {
    type Ok = ConfigNode;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        let value = value.serialize(NodeSerializer)?;
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    #[inline]
    fn end(self) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::Object(self.map))
    }
}

pub struct SerializeStructVariant {
    variant: &'static str,
    map: ConfigObject,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = ConfigNode;
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Error> {
        let value = value.serialize(NodeSerializer)?;
        self.map.insert(key.to_string(), value);
        Ok(())
    }

    fn end(self) -> Result<ConfigNode, Error> {
        Ok(ConfigNode::object([(self.variant, ConfigNode::Object(self.map))]))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Serialize};

    use super::to_node;
    use crate::{ConfigNode, from_node};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Pair(u8, u8),
        Rect { w: u32, h: u32 },
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Drawing {
        title: String,
        big: u64,
        shapes: Vec<Shape>,
        layers: BTreeMap<u32, bool>,
        note: Option<String>,
    }

    #[test]
    fn serialize_then_read_back() {
        let drawing = Drawing {
            title: "sketch".into(),
            big: u64::MAX,
            shapes: vec![
                Shape::Empty,
                Shape::Circle(0.5),
                Shape::Pair(1, 2),
                Shape::Rect { w: 3, h: 4 },
            ],
            layers: BTreeMap::from([(1, true), (2, false)]),
            note: None,
        };

        let node = to_node(&drawing).unwrap();
        assert_eq!(node.lookup("big").unwrap(), &ConfigNode::from("18446744073709551615"));
        assert_eq!(node.lookup("shapes[0]").unwrap(), &ConfigNode::from("Empty"));
        assert_eq!(node.lookup("shapes[3].Rect.h").unwrap(), &ConfigNode::from(4));
        assert_eq!(node.lookup("layers.\"2\"").unwrap(), &ConfigNode::from(false));
        assert!(node.lookup("note").unwrap().is_null());

        assert_eq!(from_node::<Drawing>(&node).unwrap(), drawing);
    }

    #[test]
    fn rejects_compound_keys() {
        let map = BTreeMap::from([(vec![1u8], 1u8)]);
        assert!(to_node(&map).is_err());
    }
}
