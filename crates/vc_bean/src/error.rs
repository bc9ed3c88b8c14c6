use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use thiserror::Error;
use vc_node::{ConfigPath, NodeKind};

/// A single property that could not be populated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Problem {
    #[error("`{path}` is missing, expected {expected}")]
    Missing {
        path: ConfigPath,
        expected: &'static str,
    },
    #[error("`{path}` has type {found}, expected {expected}")]
    Mistyped {
        path: ConfigPath,
        expected: &'static str,
        found: NodeKind,
    },
    #[error("`{path}` is {value}, which is out of range for {expected}")]
    OutOfRange {
        path: ConfigPath,
        expected: &'static str,
        value: String,
    },
}

impl Problem {
    /// The full path of the offending property.
    pub fn path(&self) -> &ConfigPath {
        match self {
            Self::Missing { path, .. } | Self::Mistyped { path, .. } | Self::OutOfRange { path, .. } => {
                path
            }
        }
    }

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// Error returned when a bean cannot be constructed from a tree.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BeanError {
    #[error("cannot build `{type_path}` from {found} at `{path}`, expected an object")]
    NotAnObject {
        type_path: &'static str,
        path: ConfigPath,
        found: NodeKind,
    },
    #[error("invalid `{type_path}`: {}", ProblemList(.problems))]
    Validation {
        type_path: &'static str,
        problems: Vec<Problem>,
    },
    #[error("bean `{type_path}` is not registered")]
    Unregistered { type_path: &'static str },
}

impl BeanError {
    /// Returns every property problem, empty unless this is [`BeanError::Validation`].
    pub fn problems(&self) -> &[Problem] {
        match self {
            Self::NotAnObject { .. } | Self::Unregistered { .. } => &[],
            Self::Validation { problems, .. } => problems,
        }
    }
}

struct ProblemList<'a>(&'a [Problem]);

impl fmt::Display for ProblemList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, problem) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{problem}")?;
        }
        Ok(())
    }
}
