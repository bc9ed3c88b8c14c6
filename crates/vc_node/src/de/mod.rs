//! Reading Rust values out of a [`ConfigNode`] tree.

mod access;

use serde_core::de::{self, Deserialize, Expected, Visitor};
use serde_core::Deserializer;

use crate::capability::{CapabilityAccess, DECODE_TOKEN};
use crate::{ConfigNode, ConfigPath, Error};

use access::{EnumAccess, ListAccess, ObjectAccess};

// -----------------------------------------------------------------------------
// Entry points

/// Deserializes `T` from a whole tree.
///
/// # Examples
///
/// ```
/// use serde::Deserialize;
/// use vc_node::{ConfigNode, from_node};
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// let root = ConfigNode::object([
///     ("name", ConfigNode::from("foo")),
///     ("age", ConfigNode::from("20")),
/// ]);
/// let person: Person = from_node(&root).unwrap();
/// assert_eq!(person, Person { name: "foo".into(), age: 20 });
/// ```
#[inline]
pub fn from_node<'de, T: Deserialize<'de>>(node: &'de ConfigNode) -> Result<T, Error> {
    T::deserialize(ConfigDeserializer::new(node))
}

/// Deserializes `T` from the subtree of `root` stored at `path`.
///
/// Error paths stay absolute, so they point into `root`.
pub fn from_node_at<'de, T: Deserialize<'de>>(
    root: &'de ConfigNode,
    path: &ConfigPath,
) -> Result<T, Error> {
    let node = root.resolve(path)?;
    T::deserialize(ConfigDeserializer::at(node, path.clone()))
}

// -----------------------------------------------------------------------------
// ConfigDeserializer

/// A serde [`Deserializer`] over a borrowed [`ConfigNode`].
///
/// The deserializer tracks the path of the node it reads; errors raised below it
/// carry the innermost path. Scalars are coerced the way [`ConfigNode`] documents,
/// so `"20"` reads as `u32` and `20` reads as `String`.
///
/// It is the only deserializer that answers a
/// [`probe_config`](crate::capability::ProbeDecoder::probe_config) request.
#[derive(Debug, Clone)]
pub struct ConfigDeserializer<'de> {
    node: &'de ConfigNode,
    path: ConfigPath,
}

impl<'de> ConfigDeserializer<'de> {
    /// Reads `node` as the root of a tree.
    #[inline]
    pub fn new(node: &'de ConfigNode) -> Self {
        Self::at(node, ConfigPath::root())
    }

    /// Reads `node`, reporting it as located at `path`.
    #[inline]
    pub fn at(node: &'de ConfigNode, path: ConfigPath) -> Self {
        Self { node, path }
    }

    #[inline]
    pub fn node(&self) -> &'de ConfigNode {
        self.node
    }

    #[inline]
    pub fn path(&self) -> &ConfigPath {
        &self.path
    }

    fn invalid_type(&self, expected: &dyn Expected) -> Error {
        <Error as de::Error>::invalid_type(self.node.unexpected(), expected).at(&self.path)
    }
}

macro_rules! deserialize_coerced {
    ($($method:ident => $coerce:ident, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
                match self.node.$coerce() {
                    Some(value) => visitor.$visit::<Error>(value).map_err(|err| err.at(&self.path)),
                    None => Err(self.invalid_type(&visitor)),
                }
            }
        )*
    };
}

impl<'de> Deserializer<'de> for ConfigDeserializer<'de> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        let Self { node, path } = self;
        match node {
            ConfigNode::Null => visitor.visit_unit(),
            ConfigNode::Bool(b) => visitor.visit_bool(*b),
            ConfigNode::Int(i) => visitor.visit_i64(*i),
            ConfigNode::Float(f) => visitor.visit_f64(*f),
            ConfigNode::String(s) => visitor.visit_borrowed_str(s),
            ConfigNode::List(items) => visitor.visit_seq(ListAccess::new(items, &path)),
            ConfigNode::Object(map) => visitor.visit_map(ObjectAccess::new(map, &path)),
        }
        .map_err(|err| err.at(&path))
    }

    deserialize_coerced! {
        deserialize_bool => coerce_bool, visit_bool;
        deserialize_i8 => coerce_i64, visit_i64;
        deserialize_i16 => coerce_i64, visit_i64;
        deserialize_i32 => coerce_i64, visit_i64;
        deserialize_i64 => coerce_i64, visit_i64;
        deserialize_i128 => coerce_i64, visit_i64;
        deserialize_u8 => coerce_u64, visit_u64;
        deserialize_u16 => coerce_u64, visit_u64;
        deserialize_u32 => coerce_u64, visit_u64;
        deserialize_u64 => coerce_u64, visit_u64;
        deserialize_u128 => coerce_u64, visit_u64;
        deserialize_f32 => coerce_f64, visit_f64;
        deserialize_f64 => coerce_f64, visit_f64;
    }

    #[inline]
    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.node {
            ConfigNode::String(s) => visitor.visit_borrowed_str::<Error>(s),
            node => match node.as_config_str() {
                Some(text) => visitor.visit_str::<Error>(&text),
                None => return Err(self.invalid_type(&visitor)),
            },
        }
        .map_err(|err| err.at(&self.path))
    }

    #[inline]
    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.node {
            ConfigNode::String(s) => visitor.visit_borrowed_bytes(s.as_bytes()),
            ConfigNode::List(items) => visitor.visit_seq(ListAccess::new(items, &self.path)),
            _ => return Err(self.invalid_type(&visitor)),
        }
        .map_err(|err| err.at(&self.path))
    }

    #[inline]
    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        if self.node.is_null() {
            visitor.visit_none::<Error>().map_err(|err| err.at(&self.path))
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        if self.node.is_null() {
            visitor.visit_unit::<Error>().map_err(|err| err.at(&self.path))
        } else {
            Err(self.invalid_type(&visitor))
        }
    }

    #[inline]
    fn deserialize_unit_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        if name == DECODE_TOKEN {
            let path = self.path.clone();
            return visitor
                .visit_map(CapabilityAccess::new(self.node, self.path))
                .map_err(|err| err.at(&path));
        }
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.node {
            ConfigNode::List(items) => visitor
                .visit_seq(ListAccess::new(items, &self.path))
                .map_err(|err| err.at(&self.path)),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    #[inline]
    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_seq(visitor)
    }

    #[inline]
    fn deserialize_tuple_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Error> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        match self.node {
            ConfigNode::Object(map) => visitor
                .visit_map(ObjectAccess::new(map, &self.path))
                .map_err(|err| err.at(&self.path)),
            _ => Err(self.invalid_type(&visitor)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        match self.node {
            ConfigNode::Object(map) => visitor.visit_map(ObjectAccess::new(map, &self.path)),
            ConfigNode::List(items) => visitor.visit_seq(ListAccess::new(items, &self.path)),
            _ => return Err(self.invalid_type(&visitor)),
        }
        .map_err(|err| err.at(&self.path))
    }

    /// Unit variants are strings, other variants are objects with a single key.
    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        let access = match self.node {
            ConfigNode::String(variant) => EnumAccess::unit(variant, self.path.clone()),
            ConfigNode::Object(map) if map.len() == 1 => {
                let Some((variant, value)) = map.iter().next() else {
                    return Err(self.invalid_type(&visitor));
                };
                EnumAccess::with_value(variant, value, self.path.key(variant.as_str()))
            }
            _ => return Err(self.invalid_type(&visitor)),
        };
        visitor.visit_enum(access).map_err(|err| err.at(&self.path))
    }

    #[inline]
    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        self.deserialize_str(visitor)
    }

    #[inline]
    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_unit()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;

    use super::{from_node, from_node_at};
    use crate::{ConfigNode, ConfigPath, ErrorKind, NodeError};

    #[derive(Deserialize, Debug, PartialEq)]
    struct Person {
        name: String,
        age: u8,
        #[serde(default)]
        nickname: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
    }

    fn person(age: ConfigNode) -> ConfigNode {
        ConfigNode::object([("name", ConfigNode::from("foo")), ("age", age)])
    }

    #[test]
    fn struct_with_coercion() {
        let node = person(ConfigNode::from("20"));
        let value: Person = from_node(&node).unwrap();
        assert_eq!(
            value,
            Person {
                name: "foo".into(),
                age: 20,
                nickname: None,
                tags: Vec::new(),
            }
        );

        let number_as_text: String = from_node(&ConfigNode::from(7)).unwrap();
        assert_eq!(number_as_text, "7");
        let flag: bool = from_node(&ConfigNode::from("yes")).unwrap();
        assert!(flag);
    }

    #[test]
    fn errors_carry_innermost_path() {
        let root = ConfigNode::object([("people", ConfigNode::List(vec![person(ConfigNode::from(300))]))]);

        let err = from_node::<HashMap<String, Vec<Person>>>(&root).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "people[0].age");
        assert!(err.to_string().ends_with(" at `people[0].age`"), "{err}");

        let root = ConfigNode::object([("person", ConfigNode::object([("name", ConfigNode::from("foo"))]))]);
        let err = from_node_at::<Person>(&root, &ConfigPath::parse("person").unwrap()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MissingField("age"));
        assert_eq!(err.path().unwrap().to_string(), "person");
        assert_eq!(err.to_string(), "missing field `age` at `person`");
    }

    #[derive(Debug)]
    #[allow(dead_code)]
    struct Even(u32);

    impl<'de> Deserialize<'de> for Even {
        fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let value = u32::deserialize(deserializer)?;
            if value % 2 == 0 {
                Ok(Even(value))
            } else {
                Err(serde::de::Error::custom(format_args!("{value} is odd")))
            }
        }
    }

    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Evens {
        values: Vec<Even>,
        #[serde(default)]
        named: HashMap<String, Even>,
    }

    #[test]
    fn errors_raised_after_reading_get_a_path() {
        let root = ConfigNode::object([(
            "values",
            ConfigNode::List(vec![ConfigNode::from(2), ConfigNode::from(3)]),
        )]);
        let err = from_node::<Evens>(&root).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "values[1]");
        assert_eq!(err.to_string(), "3 is odd at `values[1]`");

        let root = ConfigNode::object([
            ("values", ConfigNode::List(Vec::new())),
            ("named", ConfigNode::object([("x", ConfigNode::from(5))])),
        ]);
        let err = from_node::<Evens>(&root).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "named.x");
    }

    #[test]
    fn from_node_at_reports_missing_subtree() {
        let root = ConfigNode::object([("a", ConfigNode::from(1))]);
        let err = from_node_at::<u8>(&root, &ConfigPath::parse("b").unwrap()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Node(NodeError::Missing { .. })));
    }

    #[derive(Deserialize, Debug, PartialEq)]
    enum Shape {
        Empty,
        Circle(f64),
        Rect { w: u32, h: u32 },
    }

    #[test]
    fn enums_from_strings_and_single_key_objects() {
        let shapes = ConfigNode::List(vec![
            ConfigNode::from("Empty"),
            ConfigNode::object([("Circle", ConfigNode::from(1.5))]),
            ConfigNode::object([(
                "Rect",
                ConfigNode::object([("w", ConfigNode::from(2)), ("h", ConfigNode::from("3"))]),
            )]),
        ]);
        let shapes: Vec<Shape> = from_node(&shapes).unwrap();
        assert_eq!(
            shapes,
            vec![Shape::Empty, Shape::Circle(1.5), Shape::Rect { w: 2, h: 3 }]
        );

        let bad = ConfigNode::object([("Rect", ConfigNode::object([("w", ConfigNode::from(-1))]))]);
        let err = from_node::<Shape>(&bad).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "Rect.w");
    }

    #[test]
    fn map_keys_parse_as_numbers() {
        let node = ConfigNode::object([("1", ConfigNode::from("one")), ("2", ConfigNode::from("two"))]);
        let map: HashMap<u32, String> = from_node(&node).unwrap();
        assert_eq!(map[&2], "two");
    }

    #[test]
    fn tree_reads_itself() {
        let node = person(ConfigNode::from(20));
        let copy: ConfigNode = from_node(&node).unwrap();
        assert_eq!(copy, node);
    }
}
