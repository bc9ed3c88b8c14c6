use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;
use core::str::FromStr;

use serde_core::de::Visitor;
use serde_core::{Deserialize, Deserializer, Serialize, Serializer};

// -----------------------------------------------------------------------------
// Segment

/// One step of a [`ConfigPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// A key of an object.
    Key(String),
    /// A position in a list.
    Index(usize),
}

impl Segment {
    /// Returns the key, if this is a [`Segment::Key`].
    #[inline]
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(key) => Some(key),
            Self::Index(_) => None,
        }
    }

    fn needs_quotes(key: &str) -> bool {
        key.is_empty()
            || key
                .chars()
                .any(|c| matches!(c, '.' | '"' | '[' | ']' | '\\') || c.is_whitespace())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Key(key) if Self::needs_quotes(key) => {
                f.write_str("\"")?;
                for c in key.chars() {
                    if matches!(c, '"' | '\\') {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            Self::Key(key) => f.write_str(key),
        }
    }
}

// -----------------------------------------------------------------------------
// PathError

/// Returned by [`ConfigPath::parse`] for malformed input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathError {
    input: String,
    position: usize,
    reason: &'static str,
}

impl PathError {
    fn new(input: &str, position: usize, reason: &'static str) -> Self {
        Self {
            input: input.to_string(),
            position,
            reason,
        }
    }

    /// Returns the byte offset at which parsing failed.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns a short description of the problem.
    #[inline]
    pub fn reason(&self) -> &'static str {
        self.reason
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid path `{}` at offset {}: {}",
            self.input, self.position, self.reason
        )
    }
}

impl core::error::Error for PathError {}

// -----------------------------------------------------------------------------
// ConfigPath

/// A location inside a [`ConfigNode`](crate::ConfigNode) tree.
///
/// The textual form joins keys with `.`, writes list positions as `[n]` and
/// quotes keys that contain special characters. The empty path is the root.
///
/// # Examples
///
/// ```
/// use vc_node::{ConfigPath, Segment};
///
/// let path = ConfigPath::parse(r#"servers[0]."host.name""#).unwrap();
/// assert_eq!(path.len(), 3);
/// assert_eq!(path.segments()[1], Segment::Index(0));
/// assert_eq!(path.to_string(), r#"servers[0]."host.name""#);
///
/// assert!(ConfigPath::parse("").unwrap().is_root());
/// assert!(ConfigPath::parse("a..b").is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigPath {
    segments: Vec<Segment>,
}

impl ConfigPath {
    /// Returns the empty path.
    #[inline]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses the textual form of a path.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let bytes = input.as_bytes();
        let mut pos = 0;
        let mut expect_key = true;

        while pos < bytes.len() {
            match bytes[pos] {
                b'[' => {
                    let start = pos + 1;
                    let end = input[start..]
                        .find(']')
                        .map(|offset| start + offset)
                        .ok_or_else(|| PathError::new(input, pos, "unclosed `[`"))?;
                    let index = input[start..end]
                        .parse::<usize>()
                        .map_err(|_| PathError::new(input, start, "list index must be a number"))?;
                    segments.push(Segment::Index(index));
                    pos = end + 1;
                    expect_key = false;
                }
                b'.' if !expect_key => {
                    pos += 1;
                    expect_key = true;
                    if pos == bytes.len() {
                        return Err(PathError::new(input, pos, "path ends with `.`"));
                    }
                }
                b'.' => return Err(PathError::new(input, pos, "empty key")),
                _ if !expect_key => {
                    return Err(PathError::new(input, pos, "expected `.` or `[`"));
                }
                b'"' => {
                    let (key, next) = Self::parse_quoted(input, pos)?;
                    segments.push(Segment::Key(key));
                    pos = next;
                    expect_key = false;
                }
                _ => {
                    let start = pos;
                    while pos < bytes.len() && !matches!(bytes[pos], b'.' | b'[' | b']' | b'"') {
                        pos += 1;
                    }
                    let key = &input[start..pos];
                    if key.is_empty() {
                        return Err(PathError::new(input, start, "unexpected `]`"));
                    }
                    if key.chars().any(char::is_whitespace) {
                        return Err(PathError::new(input, start, "unquoted key contains whitespace"));
                    }
                    segments.push(Segment::Key(key.to_string()));
                    expect_key = false;
                }
            }
        }

        Ok(Self { segments })
    }

    // `start` points at the opening quote; returns the key and the offset after the closing quote.
    fn parse_quoted(input: &str, start: usize) -> Result<(String, usize), PathError> {
        let mut key = String::new();
        let mut chars = input[start + 1..].char_indices();
        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => return Ok((key, start + 1 + offset + 1)),
                '\\' => match chars.next() {
                    Some((_, escaped)) => key.push(escaped),
                    None => break,
                },
                _ => key.push(c),
            }
        }
        Err(PathError::new(input, start, "unclosed quote"))
    }

    /// Returns `true` for the empty path.
    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the final segment, `None` for the root.
    #[inline]
    pub fn last(&self) -> Option<&Segment> {
        self.segments.last()
    }

    /// Returns the path one level up, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, parent) = self.segments.split_last()?;
        Some(Self {
            segments: parent.to_vec(),
        })
    }

    /// Returns a new path with `key` appended.
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.push_key(key);
        path
    }

    /// Returns a new path with `index` appended.
    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.push_index(index);
        path
    }

    #[inline]
    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    #[inline]
    pub fn push_key(&mut self, key: impl Into<String>) {
        self.segments.push(Segment::Key(key.into()));
    }

    #[inline]
    pub fn push_index(&mut self, index: usize) {
        self.segments.push(Segment::Index(index));
    }

    /// Returns `true` if `prefix` is this path or one of its ancestors.
    #[inline]
    pub fn starts_with(&self, prefix: &ConfigPath) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// Returns the segments that remain after removing `prefix`.
    #[inline]
    pub fn strip_prefix(&self, prefix: &ConfigPath) -> Option<&[Segment]> {
        self.segments.strip_prefix(prefix.segments.as_slice())
    }
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            if position > 0 && matches!(segment, Segment::Key(_)) {
                f.write_str(".")?;
            }
            fmt::Display::fmt(segment, f)?;
        }
        Ok(())
    }
}

impl FromStr for ConfigPath {
    type Err = PathError;

    #[inline]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl FromIterator<Segment> for ConfigPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ConfigPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConfigPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PathVisitor;

        impl Visitor<'_> for PathVisitor {
            type Value = ConfigPath;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a dotted config path")
            }

            fn visit_str<E: serde_core::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                ConfigPath::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PathVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigPath, Segment};

    #[test]
    fn parse_keys_and_indices() {
        let path = ConfigPath::parse("a.b[2][3].c").unwrap();
        assert_eq!(
            path.segments(),
            &[
                Segment::Key("a".into()),
                Segment::Key("b".into()),
                Segment::Index(2),
                Segment::Index(3),
                Segment::Key("c".into()),
            ]
        );
        assert_eq!(path.to_string(), "a.b[2][3].c");
    }

    #[test]
    fn quoted_keys_round_trip() {
        let mut path = ConfigPath::root();
        path.push_key("with.dot");
        path.push_key("say \"hi\"");
        path.push_key("");
        let text = path.to_string();
        assert_eq!(ConfigPath::parse(&text).unwrap(), path);
    }

    #[test]
    fn rejects_malformed() {
        for input in [".a", "a.", "a..b", "a[", "a[x]", "a]", "\"open", "a b", "a\"b\""] {
            assert!(ConfigPath::parse(input).is_err(), "`{input}` should fail");
        }
    }

    #[test]
    fn prefix_and_parent() {
        let parent = ConfigPath::parse("person").unwrap();
        let child = parent.key("name");
        assert!(child.starts_with(&parent));
        assert_eq!(child.strip_prefix(&parent), Some(&[Segment::Key("name".into())][..]));
        assert_eq!(child.parent(), Some(parent));
        assert_eq!(ConfigPath::root().parent(), None);
    }
}
