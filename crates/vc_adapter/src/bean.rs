//! Decoding beans out of the config format.
//!
//! [`BeanAdapter`] asks the active deserializer for the subtree at its current
//! path and hands it to a [`BeanFactory`]. Only the config format can answer, and
//! only decoding is supported.
//!
//! The free functions make the adapter usable with `#[serde(with = "...")]`:
//!
//! ```
//! use serde::Deserialize;
//! use vc_adapter::bean;
//! use vc_bean::{Bean, BeanInfo, BeanInfoCell, Property};
//! use vc_node::{ConfigNode, from_node};
//!
//! #[derive(Default, Debug)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! impl Bean for Person {
//!     fn bean_info() -> &'static BeanInfo<Self> {
//!         static CELL: BeanInfoCell<Person> = BeanInfoCell::new();
//!         CELL.get_or_init(|| BeanInfo::new([
//!             Property::new("name", |p: &mut Person, v: String| p.name = v),
//!             Property::new("age", |p: &mut Person, v: u32| p.age = v),
//!         ]))
//!     }
//! }
//!
//! #[derive(Deserialize)]
//! struct Conf {
//!     #[serde(with = "bean")]
//!     person: Person,
//!     #[serde(default, with = "bean::option")]
//!     manager: Option<Person>,
//! }
//!
//! let root: ConfigNode = serde_json::from_str(r#"{ "person": { "name": "foo", "age": 20 } }"#).unwrap();
//! let conf: Conf = from_node(&root).unwrap();
//! assert_eq!(conf.person.name, "foo");
//! assert_eq!(conf.person.age, 20);
//! assert!(conf.manager.is_none());
//! ```

use core::any::{Any, type_name};
use core::fmt;
use core::marker::PhantomData;

use serde_core::de::{DeserializeOwned, DeserializeSeed, Error as _};
use serde_core::{Deserialize, Deserializer, Serializer};
use vc_bean::{Bean, BeanError, BeanRegistry};
use vc_node::capability::FormatDecoder;
use vc_node::{ConfigDeserializer, ConfigNode, ConfigPath};

use crate::{ConfigAdapter, Direction, guard};

// -----------------------------------------------------------------------------
// BeanFactory

/// Builds a `T` from a config subtree.
///
/// Closures `Fn(&ConfigNode, &ConfigPath) -> Result<T, E>` are factories too.
pub trait BeanFactory<T>: Send + Sync {
    type Error: fmt::Display;

    /// Builds the value stored in `node`, located at `path`.
    fn construct(&self, node: &ConfigNode, path: &ConfigPath) -> Result<T, Self::Error>;
}

/// Builds [`Bean`]s from their property tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reflective;

impl<T: Bean> BeanFactory<T> for Reflective {
    type Error = BeanError;

    #[inline]
    fn construct(&self, node: &ConfigNode, path: &ConfigPath) -> Result<T, BeanError> {
        T::from_config(node, path)
    }
}

/// Builds values through their own `Deserialize` impl, run by the config format
/// over the subtree.
#[derive(Debug, Clone, Copy, Default)]
pub struct Derived;

impl<T: DeserializeOwned> BeanFactory<T> for Derived {
    type Error = vc_node::Error;

    #[inline]
    fn construct(&self, node: &ConfigNode, path: &ConfigPath) -> Result<T, vc_node::Error> {
        Deserialize::deserialize(ConfigDeserializer::at(node, path.clone()))
            .map_err(|err: vc_node::Error| err.strip_path(path))
    }
}

/// Builds beans through their [`BeanRegistry`] entry.
///
/// Types missing from the registry fail with [`BeanError::Unregistered`].
#[derive(Debug, Clone, Copy)]
pub struct Registered<'r>(pub &'r BeanRegistry);

impl<T: Any> BeanFactory<T> for Registered<'_> {
    type Error = BeanError;

    #[inline]
    fn construct(&self, node: &ConfigNode, path: &ConfigPath) -> Result<T, BeanError> {
        self.0.construct(node, path)
    }
}

impl<T, E, F> BeanFactory<T> for F
where
    E: fmt::Display,
    F: Fn(&ConfigNode, &ConfigPath) -> Result<T, E> + Send + Sync,
{
    type Error = E;

    #[inline]
    fn construct(&self, node: &ConfigNode, path: &ConfigPath) -> Result<T, E> {
        self(node, path)
    }
}

// -----------------------------------------------------------------------------
// BeanAdapter

/// A decode-only adapter for `T`, built by the factory `F`.
pub struct BeanAdapter<T, F = Reflective> {
    factory: F,
    marker: PhantomData<fn() -> T>,
}

impl<T: Bean> BeanAdapter<T> {
    #[inline]
    pub const fn new() -> Self {
        Self::with_factory(Reflective)
    }
}

impl<T, F> BeanAdapter<T, F> {
    #[inline]
    pub const fn with_factory(factory: F) -> Self {
        Self {
            factory,
            marker: PhantomData,
        }
    }

    #[inline]
    pub fn factory(&self) -> &F {
        &self.factory
    }
}

impl<T: Bean> Default for BeanAdapter<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T, F: Clone> Clone for BeanAdapter<T, F> {
    #[inline]
    fn clone(&self) -> Self {
        Self::with_factory(self.factory.clone())
    }
}

impl<T, F: Copy> Copy for BeanAdapter<T, F> {}

impl<T, F> fmt::Debug for BeanAdapter<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BeanAdapter").field(&type_name::<T>()).finish()
    }
}

impl<T, F: BeanFactory<T>> ConfigAdapter<T> for BeanAdapter<T, F> {
    #[inline]
    fn name(&self) -> &'static str {
        type_name::<T>()
    }

    fn deserialize<'de, D: Deserializer<'de>>(&self, deserializer: D) -> Result<T, D::Error> {
        let capability = guard::decoder(deserializer)?;
        let path = capability.current_path();
        let node = capability.resolve_subtree(path).map_err(D::Error::custom)?;
        self.factory
            .construct(node, path)
            .map_err(guard::construction_failure)
    }

    #[inline]
    fn serialize<S: Serializer>(&self, _value: &T, _serializer: S) -> Result<S::Ok, S::Error> {
        Err(guard::unsupported_direction("BeanAdapter", Direction::Encode))
    }
}

impl<'de, T, F: BeanFactory<T>> DeserializeSeed<'de> for BeanAdapter<T, F> {
    type Value = T;

    #[inline]
    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<T, D::Error> {
        ConfigAdapter::deserialize(&self, deserializer)
    }
}

// -----------------------------------------------------------------------------
// `#[serde(with)]` support

/// Decodes a [`Bean`] with [`BeanAdapter`].
#[inline]
pub fn deserialize<'de, D: Deserializer<'de>, T: Bean>(deserializer: D) -> Result<T, D::Error> {
    ConfigAdapter::deserialize(&BeanAdapter::<T>::new(), deserializer)
}

/// Always fails, beans are decode-only.
#[inline]
pub fn serialize<T: Bean, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    BeanAdapter::<T>::new().serialize(value, serializer)
}

/// `#[serde(with)]` support for `Option<T>` bean fields. Combine with
/// `#[serde(default)]` so an absent entry reads as `None`.
pub mod option {
    use serde_core::{Deserializer, Serializer};
    use vc_bean::Bean;

    use super::BeanAdapter;
    use crate::{Direction, guard};

    #[inline]
    pub fn deserialize<'de, D: Deserializer<'de>, T: Bean>(
        deserializer: D,
    ) -> Result<Option<T>, D::Error> {
        guard::deserialize_option(&BeanAdapter::<T>::new(), deserializer)
    }

    /// Always fails, beans are decode-only.
    #[inline]
    pub fn serialize<T: Bean, S: Serializer>(
        _value: &Option<T>,
        _serializer: S,
    ) -> Result<S::Ok, S::Error> {
        Err(guard::unsupported_direction("BeanAdapter", Direction::Encode))
    }
}

#[cfg(test)]
mod tests {
    use serde::de::DeserializeSeed;
    use serde::{Deserialize, Serialize};
    use vc_bean::{Bean, BeanInfo, BeanInfoCell, BeanRegistry, Property};
    use vc_node::{ConfigDeserializer, ConfigNode, ConfigPath, ErrorKind, from_node, to_node};

    use super::{BeanAdapter, Derived, Registered};
    use crate::ConfigAdapter;

    #[derive(Default, Debug, Clone, PartialEq, Deserialize)]
    struct Person {
        name: String,
        age: u32,
    }

    impl Bean for Person {
        fn bean_info() -> &'static BeanInfo<Self> {
            static CELL: BeanInfoCell<Person> = BeanInfoCell::new();
            CELL.get_or_init(|| {
                BeanInfo::new([
                    Property::new("name", |p: &mut Person, v: String| p.name = v),
                    Property::new("age", |p: &mut Person, v: u32| p.age = v),
                ])
            })
        }
    }

    fn default_person() -> Person {
        Person {
            name: "nobody".into(),
            age: 0,
        }
    }

    #[derive(Debug, Deserialize)]
    struct Team {
        #[serde(with = "crate::bean")]
        person: Person,
        #[serde(default, with = "crate::bean::option")]
        manager: Option<Person>,
        #[serde(default = "default_person", with = "crate::bean")]
        mentor: Person,
    }

    fn person(name: &str, age: i64) -> ConfigNode {
        ConfigNode::object([("name", ConfigNode::from(name)), ("age", ConfigNode::from(age))])
    }

    fn json(text: &str) -> ConfigNode {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn decode_person() {
        let root = json(r#"{ "person": { "name": "foo", "age": 20 } }"#);
        let team: Team = from_node(&root).unwrap();
        assert_eq!(team.person.name, "foo");
        assert_eq!(team.person.age, 20);
        assert_eq!(team.manager, None);
        assert_eq!(team.mentor, default_person());
    }

    #[test]
    fn nullable_and_present_fields() {
        let root = ConfigNode::object([
            ("person", person("foo", 20)),
            ("manager", ConfigNode::Null),
            ("mentor", person("bar", 40)),
        ]);
        let team: Team = from_node(&root).unwrap();
        assert_eq!(team.manager, None);
        assert_eq!(team.mentor.name, "bar");

        let root = ConfigNode::object([("person", person("foo", 20)), ("manager", person("boss", 50))]);
        let team: Team = from_node(&root).unwrap();
        assert_eq!(team.manager.unwrap().name, "boss");
    }

    #[test]
    fn missing_field_is_named() {
        let root = ConfigNode::object([("manager", person("boss", 50))]);
        let err = from_node::<Team>(&root).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MissingField("person"));
    }

    #[test]
    fn validation_problems_pass_through() {
        let root = json(r#"{ "person": { "age": "old" } }"#);
        let err = from_node::<Team>(&root).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("invalid `"), "{message}");
        assert!(message.contains("`person.name` is missing"), "{message}");
        assert!(message.contains("`person.age` has type string"), "{message}");
        assert_eq!(err.path().unwrap().to_string(), "person");

        let root = ConfigNode::object([("person", person("foo", 1)), ("manager", ConfigNode::from(3))]);
        let err = from_node::<Team>(&root).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "manager");
        assert!(err.to_string().contains("expected an object"), "{err}");
    }

    #[test]
    fn foreign_decoder_is_rejected() {
        let err = serde_json::from_str::<Team>(r#"{ "person": { "name": "foo", "age": 20 } }"#).unwrap_err();
        assert!(
            err.to_string()
                .contains("this value can be decoded only by the config format"),
            "{err}"
        );

        let err = serde_json::from_str::<Team>(r#"{ "person": null }"#).unwrap_err();
        assert!(err.to_string().contains("only by the config format"), "{err}");

        let err = ron::from_str::<Team>(r#"(person: (name: "foo", age: 20))"#).unwrap_err();
        assert!(
            err.to_string()
                .contains("this value can be decoded only by the config format"),
            "{err}"
        );
        assert!(!err.to_string().contains("$vc_node"), "{err}");
    }

    #[test]
    fn encoding_is_unsupported() {
        #[derive(Serialize)]
        struct Out {
            #[serde(with = "crate::bean")]
            person: Person,
        }

        let out = Out {
            person: default_person(),
        };
        let err = to_node(&out).unwrap_err();
        assert_eq!(err.to_string(), "BeanAdapter is not used for encoding");
        assert!(serde_json::to_string(&out).is_err());
    }

    #[test]
    fn factory_errors_are_verbatim() {
        let adapter = BeanAdapter::<Person, _>::with_factory(|_: &ConfigNode, path: &ConfigPath| {
            Err::<Person, _>(format!("no people allowed at {path}"))
        });
        let root = ConfigNode::object([("staff", ConfigNode::object([("boss", person("x", 1))]))]);
        let path = ConfigPath::parse("staff.boss").unwrap();
        let node = root.resolve(&path).unwrap();
        let err = adapter.deserialize(ConfigDeserializer::at(node, path)).unwrap_err();
        assert_eq!(err.to_string(), "no people allowed at staff.boss");
    }

    #[test]
    fn registered_factory() {
        let node = person("foo", 20);
        let path = ConfigPath::parse("person").unwrap();

        let mut registry = BeanRegistry::new();
        let err = BeanAdapter::<Person, _>::with_factory(Registered(&registry))
            .deserialize(ConfigDeserializer::at(&node, path.clone()))
            .unwrap_err();
        assert!(err.to_string().ends_with("is not registered"), "{err}");

        registry.register::<Person>();
        let decoded = BeanAdapter::<Person, _>::with_factory(Registered(&registry))
            .deserialize(ConfigDeserializer::at(&node, path))
            .unwrap();
        assert_eq!(decoded, Person { name: "foo".into(), age: 20 });
    }

    #[test]
    fn derived_factory() {
        const ADAPTER: BeanAdapter<Person, Derived> = BeanAdapter::with_factory(Derived);

        let root = ConfigNode::object([("person", person("foo", 20))]);
        let path = ConfigPath::parse("person").unwrap();
        let node = root.resolve(&path).unwrap();
        let decoded = ADAPTER
            .seed()
            .deserialize(ConfigDeserializer::at(node, path.clone()))
            .unwrap();
        assert_eq!(decoded, Person { name: "foo".into(), age: 20 });

        let bad = ConfigNode::object([("person", ConfigNode::object([("name", ConfigNode::from("foo"))]))]);
        let node = bad.resolve(&path).unwrap();
        let err = ADAPTER
            .seed()
            .deserialize(ConfigDeserializer::at(node, path))
            .unwrap_err();
        assert_eq!(err.to_string(), "missing field `age`");
    }
}
