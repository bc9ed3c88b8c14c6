#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern crates

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod adapter;
mod error;
mod string;

pub mod bean;
pub mod guard;
pub mod uuid;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use adapter::{AdapterSeed, ConfigAdapter};
pub use bean::{BeanAdapter, BeanFactory, Derived, Reflective, Registered};
pub use error::{AdapterError, Direction};
pub use string::StringAdapter;

// -----------------------------------------------------------------------------
// Macros

/// Expands to the `deserialize` and `serialize` functions that
/// `#[serde(with = "...")]` expects, plus an `option` submodule for `Option<T>`
/// fields.
///
/// The adapter expression is evaluated on every call and should be a constant.
///
/// ```
/// pub mod level {
///     use core::num::ParseIntError;
///
///     pub const ADAPTER: vc_adapter::StringAdapter<u8, ParseIntError> =
///         vc_adapter::StringAdapter::from_str();
///
///     vc_adapter::adapter_module!(ADAPTER => u8);
/// }
///
/// #[derive(serde::Deserialize)]
/// struct Conf {
///     #[serde(with = "level")]
///     level: u8,
///     #[serde(default, with = "level::option")]
///     max: Option<u8>,
/// }
///
/// let root = vc_node::ConfigNode::object([("level", vc_node::ConfigNode::from("3"))]);
/// let conf: Conf = vc_node::from_node(&root).unwrap();
/// assert_eq!((conf.level, conf.max), (3, None));
/// ```
#[macro_export]
macro_rules! adapter_module {
    ($adapter:expr => $ty:ty) => {
        type __Value = $ty;

        #[inline]
        fn __adapter() -> impl $crate::ConfigAdapter<__Value> {
            $adapter
        }

        #[inline]
        pub fn deserialize<'de, D>(deserializer: D) -> ::core::result::Result<$ty, D::Error>
        where
            D: $crate::__private::Deserializer<'de>,
        {
            $crate::ConfigAdapter::<__Value>::deserialize(&__adapter(), deserializer)
        }

        #[inline]
        pub fn serialize<S>(value: &$ty, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
        where
            S: $crate::__private::Serializer,
        {
            $crate::ConfigAdapter::<__Value>::serialize(&__adapter(), value, serializer)
        }

        pub mod option {
            #[inline]
            pub fn deserialize<'de, D>(
                deserializer: D,
            ) -> ::core::result::Result<::core::option::Option<super::__Value>, D::Error>
            where
                D: $crate::__private::Deserializer<'de>,
            {
                $crate::guard::deserialize_option(&super::__adapter(), deserializer)
            }

            #[inline]
            pub fn serialize<S>(
                value: &::core::option::Option<super::__Value>,
                serializer: S,
            ) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: $crate::__private::Serializer,
            {
                $crate::guard::serialize_option(&super::__adapter(), value, serializer)
            }
        }
    };
}

#[doc(hidden)]
pub mod __private {
    pub use serde_core::{Deserializer, Serializer};
}
