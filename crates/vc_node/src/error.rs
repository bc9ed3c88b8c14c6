use alloc::string::{String, ToString};
use core::fmt;

use crate::{ConfigPath, NodeKind, PathError};

// -----------------------------------------------------------------------------
// NodeError

/// A failed walk through a [`ConfigNode`](crate::ConfigNode) tree.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeError {
    /// Nothing is stored at `path`.
    Missing { path: ConfigPath },
    /// The node at `path` has the wrong shape for the next step.
    WrongKind {
        path: ConfigPath,
        expected: NodeKind,
        found: NodeKind,
    },
    /// The node at `path` is a list, an object or `null`, so it cannot be read as text.
    NotAString { path: ConfigPath, found: NodeKind },
    /// The requested path lies outside the subtree that is available.
    OutOfScope {
        path: ConfigPath,
        scope: ConfigPath,
    },
    /// The textual path could not be parsed.
    InvalidPath(PathError),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { path } => write!(f, "no value at `{path}`"),
            Self::WrongKind {
                path,
                expected,
                found,
            } => write!(f, "expected {expected} at `{path}`, found {found}"),
            Self::NotAString { path, found } => {
                write!(f, "cannot read {found} at `{path}` as a string")
            }
            Self::OutOfScope { path, scope } => {
                write!(f, "path `{path}` is outside of the decoded subtree `{scope}`")
            }
            Self::InvalidPath(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl core::error::Error for NodeError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::InvalidPath(err) => Some(err),
            _ => None,
        }
    }
}

impl From<PathError> for NodeError {
    #[inline]
    fn from(value: PathError) -> Self {
        Self::InvalidPath(value)
    }
}

// -----------------------------------------------------------------------------
// Error

/// What went wrong while converting between Rust values and a config tree.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A free-form message, usually raised by a `Deserialize` or `Serialize` impl.
    Message(String),
    /// A required struct field has no entry in the tree.
    MissingField(&'static str),
    /// A path lookup failed.
    Node(NodeError),
}

/// The error type of [`ConfigDeserializer`](crate::ConfigDeserializer) and
/// [`NodeSerializer`](crate::NodeSerializer).
///
/// Errors remember the innermost path at which they were raised.
///
/// # Examples
///
/// ```
/// use serde::Deserialize;
/// use vc_node::{ConfigNode, ErrorKind, from_node};
///
/// #[derive(Deserialize, Debug)]
/// struct Server {
///     port: u16,
/// }
///
/// let root = ConfigNode::object([("port", ConfigNode::from("http"))]);
/// let err = from_node::<Server>(&root).unwrap_err();
/// assert_eq!(err.path().unwrap().to_string(), "port");
///
/// let err = from_node::<Server>(&ConfigNode::object::<&str, _>([])).unwrap_err();
/// assert_eq!(err.kind(), &ErrorKind::MissingField("port"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    path: Option<ConfigPath>,
}

impl Error {
    #[inline]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, path: None }
    }

    #[inline]
    pub fn message(msg: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Message(msg.to_string()))
    }

    #[inline]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the innermost path the error was raised at, `None` for the root.
    #[inline]
    pub fn path(&self) -> Option<&ConfigPath> {
        self.path.as_ref()
    }

    /// Returns the field name if this is [`ErrorKind::MissingField`].
    pub fn missing_field(&self) -> Option<&'static str> {
        match self.kind {
            ErrorKind::MissingField(field) => Some(field),
            _ => None,
        }
    }

    /// Forgets the recorded path if it is `path`.
    ///
    /// Used when the error is re-raised by a caller that reports `path` itself.
    pub fn strip_path(mut self, path: &ConfigPath) -> Self {
        if self.path.as_ref() == Some(path) {
            self.path = None;
        }
        self
    }

    /// Records `path` unless a deeper path is already known.
    pub(crate) fn at(mut self, path: &ConfigPath) -> Self {
        if self.path.is_none() && !path.is_root() {
            self.path = Some(path.clone());
        }
        self
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => f.write_str(msg),
            Self::MissingField(field) => write!(f, "missing field `{field}`"),
            Self::Node(err) => write!(f, "{err}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        match &self.path {
            Some(path) => write!(f, " at `{path}`"),
            None => Ok(()),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match &self.kind {
            ErrorKind::Node(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NodeError> for Error {
    #[inline]
    fn from(value: NodeError) -> Self {
        Self::new(ErrorKind::Node(value))
    }
}

impl serde_core::de::Error for Error {
    #[inline]
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::message(msg)
    }

    #[inline]
    fn missing_field(field: &'static str) -> Self {
        Self::new(ErrorKind::MissingField(field))
    }
}

impl serde_core::ser::Error for Error {
    #[inline]
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::message(msg)
    }
}
