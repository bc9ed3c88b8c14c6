#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_adapter as adapter;
pub use vc_bean as bean;
pub use vc_node as node;
