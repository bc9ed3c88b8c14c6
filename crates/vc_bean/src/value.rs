use alloc::string::{String, ToString};
use alloc::vec::Vec;

use vc_node::{ConfigNode, ConfigPath};

use crate::Problem;

/// A property type that can be read from a single [`ConfigNode`].
///
/// Reading reports every problem found below `path`, so a list with several bad
/// entries yields one [`Problem`] per entry.
///
/// # Examples
///
/// ```
/// use vc_bean::{FromConfigValue, Problem};
/// use vc_node::{ConfigNode, ConfigPath};
///
/// let path = ConfigPath::parse("ports").unwrap();
/// let ports = ConfigNode::from(vec![
///     ConfigNode::from(80),
///     ConfigNode::from("8080"),
///     ConfigNode::from(70000),
/// ]);
///
/// let problems = Vec::<u16>::from_config_value(&ports, &path).unwrap_err();
/// assert!(matches!(&problems[..], [Problem::OutOfRange { .. }]));
/// assert_eq!(problems[0].path().to_string(), "ports[2]");
/// ```
pub trait FromConfigValue: Sized {
    /// Describes the accepted shape in diagnostics.
    const EXPECTED: &'static str;

    /// Returns the value used when the property is absent, `None` if it is required.
    #[inline]
    fn from_missing() -> Option<Self> {
        None
    }

    fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>>;
}

#[inline]
pub(crate) fn mistyped(node: &ConfigNode, path: &ConfigPath, expected: &'static str) -> Vec<Problem> {
    alloc::vec![Problem::Mistyped {
        path: path.clone(),
        expected,
        found: node.kind(),
    }]
}

#[inline]
fn out_of_range(value: impl ToString, path: &ConfigPath, expected: &'static str) -> Vec<Problem> {
    alloc::vec![Problem::OutOfRange {
        path: path.clone(),
        expected,
        value: value.to_string(),
    }]
}

impl FromConfigValue for bool {
    const EXPECTED: &'static str = "boolean";

    fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>> {
        node.coerce_bool().ok_or_else(|| mistyped(node, path, Self::EXPECTED))
    }
}

macro_rules! impl_signed {
    ($($ty:ty => $expected:literal),*) => {
        $(
            impl FromConfigValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>> {
                    let value = node.coerce_i64().ok_or_else(|| mistyped(node, path, Self::EXPECTED))?;
                    <$ty>::try_from(value).map_err(|_| out_of_range(value, path, Self::EXPECTED))
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($ty:ty => $expected:literal),*) => {
        $(
            impl FromConfigValue for $ty {
                const EXPECTED: &'static str = $expected;

                fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>> {
                    match (node.coerce_u64(), node.coerce_i64()) {
                        (Some(value), _) => {
                            <$ty>::try_from(value).map_err(|_| out_of_range(value, path, Self::EXPECTED))
                        }
                        (None, Some(negative)) => Err(out_of_range(negative, path, Self::EXPECTED)),
                        (None, None) => Err(mistyped(node, path, Self::EXPECTED)),
                    }
                }
            }
        )*
    };
}

impl_signed!(i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64", isize => "isize");
impl_unsigned!(u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64", usize => "usize");

impl FromConfigValue for f64 {
    const EXPECTED: &'static str = "number";

    fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>> {
        node.coerce_f64().ok_or_else(|| mistyped(node, path, Self::EXPECTED))
    }
}

impl FromConfigValue for f32 {
    const EXPECTED: &'static str = "number";

    fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>> {
        f64::from_config_value(node, path).map(|value| value as f32)
    }
}

impl FromConfigValue for String {
    const EXPECTED: &'static str = "string";

    fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>> {
        node.as_config_str()
            .map(|text| text.into_owned())
            .ok_or_else(|| mistyped(node, path, Self::EXPECTED))
    }
}

impl FromConfigValue for char {
    const EXPECTED: &'static str = "character";

    fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>> {
        let text = node.as_config_str().ok_or_else(|| mistyped(node, path, Self::EXPECTED))?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(out_of_range(format_args!("{text:?}"), path, Self::EXPECTED)),
        }
    }
}

impl FromConfigValue for ConfigNode {
    const EXPECTED: &'static str = "any value";

    #[inline]
    fn from_config_value(node: &ConfigNode, _path: &ConfigPath) -> Result<Self, Vec<Problem>> {
        Ok(node.clone())
    }
}

impl<V: FromConfigValue> FromConfigValue for Vec<V> {
    const EXPECTED: &'static str = "list";

    fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>> {
        let items = node.as_list().ok_or_else(|| mistyped(node, path, Self::EXPECTED))?;

        let mut values = Vec::with_capacity(items.len());
        let mut problems = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match V::from_config_value(item, &path.index(index)) {
                Ok(value) => values.push(value),
                Err(mut found) => problems.append(&mut found),
            }
        }

        if problems.is_empty() {
            Ok(values)
        } else {
            Err(problems)
        }
    }
}

/// Optional properties: both an absent entry and `null` read as `None`.
impl<V: FromConfigValue> FromConfigValue for Option<V> {
    const EXPECTED: &'static str = V::EXPECTED;

    #[inline]
    fn from_missing() -> Option<Self> {
        Some(None)
    }

    fn from_config_value(node: &ConfigNode, path: &ConfigPath) -> Result<Self, Vec<Problem>> {
        if node.is_null() {
            Ok(None)
        } else {
            V::from_config_value(node, path).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use vc_node::{ConfigNode, ConfigPath, NodeKind};

    use super::FromConfigValue;
    use crate::Problem;

    fn read<V: FromConfigValue>(node: ConfigNode) -> Result<V, Vec<Problem>> {
        V::from_config_value(&node, &ConfigPath::parse("value").unwrap())
    }

    #[test]
    fn integers_are_range_checked() {
        assert_eq!(read::<u8>(ConfigNode::from("255")), Ok(255));
        assert!(matches!(
            read::<u8>(ConfigNode::from(256)).unwrap_err()[..],
            [Problem::OutOfRange { .. }]
        ));
        assert!(matches!(
            read::<u32>(ConfigNode::from(-1)).unwrap_err()[..],
            [Problem::OutOfRange { .. }]
        ));
        assert_eq!(read::<i64>(ConfigNode::from(2.0)), Ok(2));
    }

    #[test]
    fn mistyped_reports_found_kind() {
        let problems = read::<i32>(ConfigNode::from("twenty")).unwrap_err();
        assert_eq!(
            problems,
            vec![Problem::Mistyped {
                path: ConfigPath::parse("value").unwrap(),
                expected: "i32",
                found: NodeKind::String,
            }]
        );
        assert_eq!(problems[0].to_string(), "`value` has type string, expected i32");
    }

    #[test]
    fn scalars_read_as_text() {
        assert_eq!(read::<String>(ConfigNode::from(20)), Ok("20".into()));
        assert_eq!(read::<char>(ConfigNode::from("x")), Ok('x'));
        assert!(read::<char>(ConfigNode::from("xy")).is_err());
        assert!(read::<String>(ConfigNode::from(vec![1])).is_err());
    }

    #[test]
    fn options_accept_null_and_absence() {
        assert_eq!(read::<Option<u8>>(ConfigNode::Null), Ok(None));
        assert_eq!(read::<Option<u8>>(ConfigNode::from(1)), Ok(Some(1)));
        assert_eq!(<Option<u8>>::from_missing(), Some(None));
        assert_eq!(<u8>::from_missing(), None);
    }
}
