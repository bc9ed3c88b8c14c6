use alloc::string::String;
use core::fmt;

use thiserror::Error;

/// Which half of an adapter is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Decode,
    Encode,
}

impl Direction {
    #[inline]
    fn participle(self) -> &'static str {
        match self {
            Self::Decode => "decoded",
            Self::Encode => "encoded",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decode => "decoding",
            Self::Encode => "encoding",
        })
    }
}

/// Failures raised by the adapters themselves.
///
/// They reach serde through `de::Error::custom` and `ser::Error::custom`, so the
/// `Display` text is what callers observe.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// The active deserializer or serializer is not the config format.
    #[error("this value can be {} only by the {format} format", .direction.participle())]
    UnsupportedFormat {
        direction: Direction,
        format: &'static str,
    },
    /// The adapter never runs in this direction.
    #[error("{adapter} is not used for {direction}")]
    UnsupportedDirection {
        adapter: &'static str,
        direction: Direction,
    },
    /// The bean factory failed; holds its message unchanged.
    #[error("{0}")]
    ConstructionFailure(String),
    /// A caller supplied decode function failed; holds its message unchanged.
    #[error("{0}")]
    UserFunctionFailure(String),
}

impl AdapterError {
    #[inline]
    pub fn unsupported_format(direction: Direction) -> Self {
        Self::UnsupportedFormat {
            direction,
            format: vc_node::FORMAT_NAME,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AdapterError, Direction};

    #[test]
    fn messages() {
        assert_eq!(
            AdapterError::unsupported_format(Direction::Decode).to_string(),
            "this value can be decoded only by the config format"
        );
        assert_eq!(
            AdapterError::unsupported_format(Direction::Encode).to_string(),
            "this value can be encoded only by the config format"
        );
        assert_eq!(
            AdapterError::UnsupportedDirection {
                adapter: "BeanAdapter",
                direction: Direction::Encode,
            }
            .to_string(),
            "BeanAdapter is not used for encoding"
        );
        assert_eq!(AdapterError::UserFunctionFailure("bad".into()).to_string(), "bad");
    }
}
