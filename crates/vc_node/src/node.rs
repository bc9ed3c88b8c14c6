use alloc::borrow::Cow;
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use serde_core::de::Unexpected;

use crate::{ConfigPath, NodeError, NodeKind, Segment};

/// The key/value table of an [`ConfigNode::Object`].
pub type ConfigObject = BTreeMap<String, ConfigNode>;

// -----------------------------------------------------------------------------
// ConfigNode

/// An immutable node of a hierarchical configuration tree.
///
/// Trees are usually obtained from a data format through `Deserialize`
/// (any self-describing format works), or built from Rust values with the
/// `From` conversions and [`ConfigNode::object`].
///
/// Scalars read the way configuration files expect:
///
/// - numbers and booleans read as strings, see [`as_config_str`](Self::as_config_str);
/// - numeric strings read as numbers, see [`coerce_i64`](Self::coerce_i64);
/// - `yes`/`no`/`on`/`off` read as booleans, see [`coerce_bool`](Self::coerce_bool).
///
/// # Examples
///
/// ```
/// use vc_node::{ConfigNode, NodeKind};
///
/// let root = ConfigNode::object([(
///     "person",
///     ConfigNode::object([("name", ConfigNode::from("foo")), ("age", ConfigNode::from(20))]),
/// )]);
///
/// let age = root.lookup("person.age").unwrap();
/// assert_eq!(age.kind(), NodeKind::Int);
/// assert_eq!(age.as_config_str().as_deref(), Some("20"));
/// assert!(root.lookup("person.email").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConfigNode {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ConfigNode>),
    Object(ConfigObject),
}

impl ConfigNode {
    /// Builds an object node from key/value pairs.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, ConfigNode)>,
    {
        Self::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[inline]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Null => NodeKind::Null,
            Self::Bool(_) => NodeKind::Bool,
            Self::Int(_) => NodeKind::Int,
            Self::Float(_) => NodeKind::Float,
            Self::String(_) => NodeKind::String,
            Self::List(_) => NodeKind::List,
            Self::Object(_) => NodeKind::Object,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[ConfigNode]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[inline]
    pub fn as_object(&self) -> Option<&ConfigObject> {
        match self {
            Self::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the child stored under `key`, if this is an object.
    #[inline]
    pub fn get(&self, key: &str) -> Option<&ConfigNode> {
        self.as_object()?.get(key)
    }

    /// Returns the node for one path step.
    pub fn child(&self, segment: &Segment) -> Option<&ConfigNode> {
        match (self, segment) {
            (Self::Object(map), Segment::Key(key)) => map.get(key),
            (Self::List(items), Segment::Index(index)) => items.get(*index),
            _ => None,
        }
    }

    /// Walks `path` from this node.
    ///
    /// Returns `None` if any step is absent or does not match the node shape.
    pub fn at(&self, path: &ConfigPath) -> Option<&ConfigNode> {
        Self::walk(self, path.segments())
    }

    pub(crate) fn walk<'a>(mut node: &'a ConfigNode, segments: &[Segment]) -> Option<&'a ConfigNode> {
        for segment in segments {
            node = node.child(segment)?;
        }
        Some(node)
    }

    /// Walks `path` from this node, reporting where and why the walk stopped.
    pub fn resolve(&self, path: &ConfigPath) -> Result<&ConfigNode, NodeError> {
        let mut node = self;
        let mut walked = ConfigPath::root();
        for segment in path.segments() {
            let expected = match segment {
                Segment::Key(_) => NodeKind::Object,
                Segment::Index(_) => NodeKind::List,
            };
            if node.kind() != expected {
                return Err(NodeError::WrongKind {
                    path: walked,
                    expected,
                    found: node.kind(),
                });
            }
            walked.push(segment.clone());
            node = node.child(segment).ok_or_else(|| NodeError::Missing {
                path: walked.clone(),
            })?;
        }
        Ok(node)
    }

    /// Parses `path` and walks it from this node.
    pub fn lookup(&self, path: &str) -> Result<&ConfigNode, NodeError> {
        let path = ConfigPath::parse(path)?;
        self.resolve(&path)
    }

    // -------------------------------------------------------------------------
    // Scalar coercion

    /// Reads a scalar as text.
    ///
    /// Strings are borrowed, numbers and booleans are rendered.
    /// Returns `None` for `null`, lists and objects.
    pub fn as_config_str(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::String(s) => Some(Cow::Borrowed(s)),
            Self::Bool(b) => Some(Cow::Owned(b.to_string())),
            Self::Int(i) => Some(Cow::Owned(i.to_string())),
            Self::Float(f) => Some(Cow::Owned(f.to_string())),
            Self::Null | Self::List(_) | Self::Object(_) => None,
        }
    }

    /// Reads a boolean, accepting `true/false/yes/no/on/off` strings.
    pub fn coerce_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => match s.as_str() {
                "true" | "yes" | "on" => Some(true),
                "false" | "no" | "off" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Reads a signed integer from an integer, a float without fraction,
    /// or a numeric string.
    pub fn coerce_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Float(f) if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 => {
                Some(*f as i64)
            }
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Reads an unsigned integer. Covers the range above `i64::MAX`
    /// for numeric strings.
    pub fn coerce_u64(&self) -> Option<u64> {
        match self {
            Self::String(s) => s.trim().parse().ok(),
            _ => self.coerce_i64().and_then(|i| u64::try_from(i).ok()),
        }
    }

    /// Reads a float from a number or a numeric string.
    pub fn coerce_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Describes this node for serde's `invalid_type` errors.
    pub fn unexpected(&self) -> Unexpected<'_> {
        match self {
            Self::Null => Unexpected::Unit,
            Self::Bool(b) => Unexpected::Bool(*b),
            Self::Int(i) => Unexpected::Signed(*i),
            Self::Float(f) => Unexpected::Float(*f),
            Self::String(s) => Unexpected::Str(s),
            Self::List(_) => Unexpected::Seq,
            Self::Object(_) => Unexpected::Map,
        }
    }
}

// -----------------------------------------------------------------------------
// Display

/// Renders the node as compact JSON-like text.
impl fmt::Display for ConfigNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Object(map) => {
                if map.is_empty() {
                    return f.write_str("{}");
                }
                f.write_str("{ ")?;
                for (index, (key, value)) in map.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {value}", Segment::Key(key.clone()))?;
                }
                f.write_str(" }")
            }
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ConfigNode {
                #[inline]
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for ConfigNode {
    #[inline]
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f32> for ConfigNode {
    #[inline]
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for ConfigNode {
    #[inline]
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for ConfigNode {
    #[inline]
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigNode {
    #[inline]
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<ConfigNode>> From<Vec<T>> for ConfigNode {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<ConfigNode>> From<Option<T>> for ConfigNode {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<ConfigObject> for ConfigNode {
    #[inline]
    fn from(value: ConfigObject) -> Self {
        Self::Object(value)
    }
}

#[cfg(test)]
mod tests {
    use super::ConfigNode;
    use crate::{ConfigPath, NodeError, NodeKind};

    fn person() -> ConfigNode {
        ConfigNode::object([(
            "person",
            ConfigNode::object([
                ("name", ConfigNode::from("foo")),
                ("age", ConfigNode::from(20)),
                ("tags", ConfigNode::from(vec!["a", "b"])),
            ]),
        )])
    }

    #[test]
    fn resolve_reports_missing_and_wrong_kind() {
        let root = person();
        assert_eq!(root.lookup("person.tags[1]").unwrap(), &ConfigNode::from("b"));

        match root.lookup("person.email") {
            Err(NodeError::Missing { path }) => assert_eq!(path.to_string(), "person.email"),
            other => panic!("unexpected {other:?}"),
        }

        match root.lookup("person.name.first") {
            Err(NodeError::WrongKind { path, expected, found }) => {
                assert_eq!(path.to_string(), "person.name");
                assert_eq!(expected, NodeKind::Object);
                assert_eq!(found, NodeKind::String);
            }
            other => panic!("unexpected {other:?}"),
        }

        assert!(root.at(&ConfigPath::parse("person.tags[5]").unwrap()).is_none());
    }

    #[test]
    fn scalar_coercion() {
        assert_eq!(ConfigNode::from("42").coerce_i64(), Some(42));
        assert_eq!(ConfigNode::from(3.0).coerce_i64(), Some(3));
        assert_eq!(ConfigNode::from(3.5).coerce_i64(), None);
        assert_eq!(ConfigNode::from(-1).coerce_u64(), None);
        assert_eq!(ConfigNode::from("18446744073709551615").coerce_u64(), Some(u64::MAX));
        assert_eq!(ConfigNode::from("off").coerce_bool(), Some(false));
        assert_eq!(ConfigNode::from(true).as_config_str().as_deref(), Some("true"));
        assert_eq!(ConfigNode::Null.as_config_str(), None);
        assert_eq!(person().as_config_str(), None);
    }

    #[test]
    fn display_is_compact() {
        let node = ConfigNode::object([
            ("a", ConfigNode::from(vec![1, 2])),
            ("b.c", ConfigNode::from("x")),
            ("d", ConfigNode::from(1.5)),
        ]);
        assert_eq!(node.to_string(), r#"{ a: [1, 2], "b.c": "x", d: 1.5 }"#);
    }
}
