use core::fmt;

/// The shape of a [`ConfigNode`](crate::ConfigNode), without its content.
///
/// # Examples
///
/// ```
/// use vc_node::{ConfigNode, NodeKind};
///
/// assert_eq!(ConfigNode::from("foo").kind(), NodeKind::String);
/// assert_eq!(NodeKind::Object.to_string(), "object");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    List,
    Object,
}

impl NodeKind {
    /// Returns `true` for every kind except [`List`](Self::List) and [`Object`](Self::Object).
    #[inline]
    pub const fn is_scalar(self) -> bool {
        !matches!(self, Self::List | Self::Object)
    }

    /// Returns the lowercase name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::List => "list",
            Self::Object => "object",
        }
    }
}

impl fmt::Display for NodeKind {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
