use std::sync::OnceLock;

use vc_node::{ConfigNode, ConfigPath};

use crate::{BeanError, BeanInfo};

/// A type that is built by setting properties on a default instance.
///
/// Implement it with a static [`BeanInfoCell`] so the property table is built once.
///
/// # Examples
///
/// ```
/// use vc_bean::{Bean, BeanInfo, BeanInfoCell, Property};
/// use vc_node::{ConfigNode, ConfigPath};
///
/// #[derive(Default)]
/// struct Person {
///     name: String,
///     age: u32,
/// }
///
/// impl Bean for Person {
///     fn bean_info() -> &'static BeanInfo<Self> {
///         static CELL: BeanInfoCell<Person> = BeanInfoCell::new();
///         CELL.get_or_init(|| BeanInfo::new([
///             Property::new("name", |p: &mut Person, v: String| p.name = v),
///             Property::new("age", |p: &mut Person, v: u32| p.age = v),
///         ]))
///     }
/// }
///
/// let node = ConfigNode::object([("name", ConfigNode::from("foo")), ("age", ConfigNode::from(20))]);
/// let person = Person::from_config(&node, &ConfigPath::root()).unwrap();
/// assert_eq!(person.name, "foo");
/// assert_eq!(person.age, 20);
/// ```
pub trait Bean: Sized + 'static {
    fn bean_info() -> &'static BeanInfo<Self>;

    /// Builds a bean from the object `node`, see [`BeanInfo::construct`].
    #[inline]
    fn from_config(node: &ConfigNode, path: &ConfigPath) -> Result<Self, BeanError> {
        Self::bean_info().construct(node, path)
    }
}

/// Lazily built storage for a [`BeanInfo`].
pub struct BeanInfoCell<T: 'static>(OnceLock<BeanInfo<T>>);

impl<T: 'static> BeanInfoCell<T> {
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the table, building it with `f` on first access.
    #[inline]
    pub fn get_or_init(&self, f: impl FnOnce() -> BeanInfo<T>) -> &BeanInfo<T> {
        self.0.get_or_init(f)
    }
}
