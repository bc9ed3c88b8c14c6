#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern crates

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod error;
mod kind;
mod node;
mod node_serde;
mod path;

pub mod capability;
pub mod de;
pub mod ser;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use de::{ConfigDeserializer, from_node, from_node_at};
pub use error::{Error, ErrorKind, NodeError};
pub use kind::NodeKind;
pub use node::{ConfigNode, ConfigObject};
pub use path::{ConfigPath, PathError, Segment};
pub use ser::{NodeSerializer, to_node};

/// The name of the format answered by [`ConfigDeserializer`] and [`NodeSerializer`],
/// used in diagnostics.
pub const FORMAT_NAME: &str = "config";
