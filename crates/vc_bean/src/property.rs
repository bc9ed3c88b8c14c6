use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use vc_node::{ConfigNode, ConfigPath};

use crate::{Bean, BeanClassHolder, FromConfigValue, Problem};

type Apply<T> =
    Box<dyn Fn(&mut T, Option<&ConfigNode>, &ConfigPath) -> Result<(), Vec<Problem>> + Send + Sync>;

/// One settable property of a bean.
///
/// A property knows its key, the shape it accepts and how to store a decoded
/// value into the bean. Absent entries fail unless the property type is optional.
pub struct Property<T: 'static> {
    name: &'static str,
    expected: &'static str,
    required: bool,
    class: Option<BeanClassHolder>,
    apply: Apply<T>,
}

impl<T: 'static> Property<T> {
    /// A property holding any [`FromConfigValue`] type.
    ///
    /// `Option<V>` properties are optional, every other type is required.
    pub fn new<V: FromConfigValue + 'static>(
        name: &'static str,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        Self::with_reader(
            name,
            V::EXPECTED,
            V::from_missing().is_none(),
            None,
            V::from_config_value,
            V::from_missing,
            set,
        )
    }

    /// A required property holding another bean.
    pub fn bean<B: Bean>(name: &'static str, set: impl Fn(&mut T, B) + Send + Sync + 'static) -> Self {
        Self::with_reader(
            name,
            "object",
            true,
            Some(BeanClassHolder::of::<B>()),
            |node: &ConfigNode, path: &ConfigPath| B::bean_info().read(node, path),
            || None,
            set,
        )
    }

    /// An optional property holding another bean; absent and `null` entries read as `None`.
    pub fn optional_bean<B: Bean>(
        name: &'static str,
        set: impl Fn(&mut T, Option<B>) + Send + Sync + 'static,
    ) -> Self {
        Self::with_reader(
            name,
            "object",
            false,
            Some(BeanClassHolder::of::<B>()),
            |node: &ConfigNode, path: &ConfigPath| match node {
                ConfigNode::Null => Ok(None),
                node => B::bean_info().read(node, path).map(Some),
            },
            || Some(None),
            set,
        )
    }

    fn with_reader<V: 'static>(
        name: &'static str,
        expected: &'static str,
        required: bool,
        class: Option<BeanClassHolder>,
        read: fn(&ConfigNode, &ConfigPath) -> Result<V, Vec<Problem>>,
        missing: fn() -> Option<V>,
        set: impl Fn(&mut T, V) + Send + Sync + 'static,
    ) -> Self {
        let apply: Apply<T> = Box::new(
            move |target: &mut T,
                  node: Option<&ConfigNode>,
                  path: &ConfigPath|
                  -> Result<(), Vec<Problem>> {
                let value = match node {
                    Some(node) => read(node, path)?,
                    None => missing().ok_or_else(|| {
                        alloc::vec![Problem::Missing {
                            path: path.clone(),
                            expected,
                        }]
                    })?,
                };
                set(target, value);
                Ok(())
            },
        );

        Self {
            name,
            expected,
            required,
            class,
            apply,
        }
    }

    /// The key of this property inside the bean's object.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Describes the accepted shape, e.g. `"u32"` or `"list"`.
    #[inline]
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    #[inline]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// The nested bean type, for properties built with [`Property::bean`]
    /// or [`Property::optional_bean`].
    #[inline]
    pub fn class(&self) -> Option<&BeanClassHolder> {
        self.class.as_ref()
    }

    /// Reads `node` (absent when `None`) into `target`.
    #[inline]
    pub(crate) fn apply(
        &self,
        target: &mut T,
        node: Option<&ConfigNode>,
        path: &ConfigPath,
    ) -> Result<(), Vec<Problem>> {
        (self.apply)(target, node, path)
    }
}

impl<T: 'static> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("expected", &self.expected)
            .field("required", &self.required)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}
