use alloc::vec::Vec;
use core::any::type_name;
use core::fmt;

use vc_node::{ConfigNode, ConfigObject, ConfigPath};

use crate::value::mistyped;
use crate::{BeanError, Problem, Property};

/// The property table of a bean type.
///
/// Construction starts from the constructor's value and sets every property in
/// table order. All problems are collected before failing, so one error lists
/// every missing or mistyped property with its full path.
pub struct BeanInfo<T: 'static> {
    type_path: &'static str,
    constructor: fn() -> T,
    properties: Vec<Property<T>>,
}

impl<T: Default + 'static> BeanInfo<T> {
    /// Builds a table whose beans start from [`Default::default`].
    #[inline]
    pub fn new(properties: impl IntoIterator<Item = Property<T>>) -> Self {
        Self::with_constructor(T::default, properties)
    }
}

impl<T: 'static> BeanInfo<T> {
    pub fn with_constructor(
        constructor: fn() -> T,
        properties: impl IntoIterator<Item = Property<T>>,
    ) -> Self {
        Self {
            type_path: type_name::<T>(),
            constructor,
            properties: properties.into_iter().collect(),
        }
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn properties(&self) -> &[Property<T>] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&Property<T>> {
        self.properties.iter().find(|property| property.name() == name)
    }

    /// Builds a bean from the object `node`, located at `path`.
    ///
    /// Keys without a matching property are ignored.
    pub fn construct(&self, node: &ConfigNode, path: &ConfigPath) -> Result<T, BeanError> {
        let Some(object) = node.as_object() else {
            return Err(BeanError::NotAnObject {
                type_path: self.type_path,
                path: path.clone(),
                found: node.kind(),
            });
        };
        self.populate(object, path).map_err(|problems| BeanError::Validation {
            type_path: self.type_path,
            problems,
        })
    }

    /// Like [`construct`](Self::construct), for a bean nested in another one.
    pub(crate) fn read(&self, node: &ConfigNode, path: &ConfigPath) -> Result<T, Vec<Problem>> {
        match node.as_object() {
            Some(object) => self.populate(object, path),
            None => Err(mistyped(node, path, "object")),
        }
    }

    fn populate(&self, object: &ConfigObject, path: &ConfigPath) -> Result<T, Vec<Problem>> {
        let mut bean = (self.constructor)();
        let mut problems = Vec::new();

        for property in &self.properties {
            let name = property.name();
            if let Err(mut found) = property.apply(&mut bean, object.get(name), &path.key(name)) {
                problems.append(&mut found);
            }
        }

        if problems.is_empty() {
            Ok(bean)
        } else {
            Err(problems)
        }
    }
}

impl<T: 'static> fmt::Debug for BeanInfo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanInfo")
            .field("type_path", &self.type_path)
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}
