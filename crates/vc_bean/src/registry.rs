use alloc::boxed::Box;
use core::any::{Any, TypeId, type_name};
use core::fmt;
use core::hash::BuildHasher;

use foldhash::fast::{FixedState, FoldHasher};
use hashbrown::HashMap;
use log::{debug, trace};
use vc_node::{ConfigNode, ConfigPath};

use crate::{Bean, BeanClassHolder, BeanError};

// -----------------------------------------------------------------------------
// Hashing

const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x5BD1_E995_C4F3_26B2);

#[derive(Copy, Clone, Default, Debug)]
struct FixedHashState;

impl BuildHasher for FixedHashState {
    type Hasher = FoldHasher<'static>;

    #[inline(always)]
    fn build_hasher(&self) -> Self::Hasher {
        FIXED_HASH_STATE.build_hasher()
    }
}

// -----------------------------------------------------------------------------
// BeanRegistration

type ErasedConstruct = fn(&ConfigNode, &ConfigPath) -> Result<Box<dyn Any>, BeanError>;

/// A registered bean type with a type-erased constructor.
#[derive(Clone, Copy, Debug)]
pub struct BeanRegistration {
    class: BeanClassHolder,
    construct: ErasedConstruct,
}

impl BeanRegistration {
    pub fn of<T: Bean>() -> Self {
        Self {
            class: BeanClassHolder::of::<T>(),
            construct: |node, path| T::from_config(node, path).map(|bean| Box::new(bean) as Box<dyn Any>),
        }
    }

    #[inline]
    pub fn class(&self) -> &BeanClassHolder {
        &self.class
    }

    /// Builds the bean behind a `dyn Any`.
    #[inline]
    pub fn construct(&self, node: &ConfigNode, path: &ConfigPath) -> Result<Box<dyn Any>, BeanError> {
        (self.construct)(node, path)
    }
}

// -----------------------------------------------------------------------------
// BeanRegistry

/// Bean types known by [`TypeId`] and by type path.
///
/// # Examples
///
/// ```
/// use std::any::TypeId;
/// use vc_bean::{Bean, BeanInfo, BeanInfoCell, BeanRegistry, Property};
/// use vc_node::{ConfigNode, ConfigPath};
///
/// #[derive(Default)]
/// struct Endpoint {
///     host: String,
/// }
///
/// impl Bean for Endpoint {
///     fn bean_info() -> &'static BeanInfo<Self> {
///         static CELL: BeanInfoCell<Endpoint> = BeanInfoCell::new();
///         CELL.get_or_init(|| BeanInfo::new([
///             Property::new("host", |e: &mut Endpoint, v: String| e.host = v),
///         ]))
///     }
/// }
///
/// let mut registry = BeanRegistry::new();
/// assert!(registry.register::<Endpoint>());
/// assert!(!registry.register::<Endpoint>());
///
/// let registration = registry.get_with_type_path(std::any::type_name::<Endpoint>()).unwrap();
/// let node = ConfigNode::object([("host", ConfigNode::from("localhost"))]);
/// let bean = registration.construct(&node, &ConfigPath::root()).unwrap();
/// assert_eq!(bean.downcast_ref::<Endpoint>().unwrap().host, "localhost");
/// assert!(registry.contains(TypeId::of::<Endpoint>()));
/// ```
pub struct BeanRegistry {
    registrations: HashMap<TypeId, BeanRegistration, FixedHashState>,
    type_path_to_id: HashMap<&'static str, TypeId, FixedHashState>,
}

impl fmt::Debug for BeanRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.type_path_to_id.keys()).finish()
    }
}

impl Default for BeanRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl BeanRegistry {
    #[inline]
    pub const fn new() -> Self {
        Self {
            registrations: HashMap::with_hasher(FixedHashState),
            type_path_to_id: HashMap::with_hasher(FixedHashState),
        }
    }

    /// Registers `T`, returning `false` if it was already registered.
    pub fn register<T: Bean>(&mut self) -> bool {
        self.insert(BeanRegistration::of::<T>())
    }

    /// Inserts a registration, returning `false` and keeping the existing one
    /// if its type is already known.
    pub fn insert(&mut self, registration: BeanRegistration) -> bool {
        let class = registration.class;
        if self.registrations.contains_key(&class.type_id()) {
            debug!("bean `{}` is already registered", class.type_path());
            return false;
        }
        self.registrations.insert(class.type_id(), registration);
        self.type_path_to_id.insert(class.type_path(), class.type_id());
        true
    }

    #[inline]
    pub fn contains(&self, type_id: TypeId) -> bool {
        self.registrations.contains_key(&type_id)
    }

    #[inline]
    pub fn get(&self, type_id: TypeId) -> Option<&BeanRegistration> {
        self.registrations.get(&type_id)
    }

    pub fn get_with_type_path(&self, type_path: &str) -> Option<&BeanRegistration> {
        self.get(*self.type_path_to_id.get(type_path)?)
    }

    /// Builds a `T` through its registration.
    ///
    /// Fails with [`BeanError::Unregistered`] if `T` was never registered.
    pub fn construct<T: Any>(&self, node: &ConfigNode, path: &ConfigPath) -> Result<T, BeanError> {
        let unregistered = || BeanError::Unregistered {
            type_path: type_name::<T>(),
        };
        let registration = self.get(TypeId::of::<T>()).ok_or_else(unregistered)?;
        let bean = registration.construct(node, path)?;
        bean.downcast::<T>().map(|bean| *bean).map_err(|_| unregistered())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BeanRegistration> {
        self.registrations.values()
    }

    /// Registers every bean declared with [`register_bean!`](crate::register_bean).
    ///
    /// Returns `false` without the `auto_register` feature, or on platforms that
    /// `inventory` does not support.
    pub fn auto_register(&mut self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            use crate::__macro_exports::{AutoRegistration, AvailFlag};

            if self.contains(TypeId::of::<AvailFlag>()) {
                return true;
            }
            for entry in inventory::iter::<AutoRegistration> {
                (entry.0)(self);
            }
            trace!("auto registered {} bean types", self.len());
            self.contains(TypeId::of::<AvailFlag>())
        }

        #[cfg(not(feature = "auto_register"))]
        {
            trace!("auto registration is disabled");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use core::any::TypeId;

    use vc_node::{ConfigNode, ConfigPath};

    use super::BeanRegistry;
    use crate::{Bean, BeanError, BeanInfo, BeanInfoCell, Property};

    #[derive(Debug, Default)]
    struct Flag {
        on: bool,
    }

    impl Bean for Flag {
        fn bean_info() -> &'static BeanInfo<Self> {
            static CELL: BeanInfoCell<Flag> = BeanInfoCell::new();
            CELL.get_or_init(|| BeanInfo::new([Property::new("on", |f: &mut Flag, v: bool| f.on = v)]))
        }
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut registry = BeanRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.register::<Flag>());
        assert!(!registry.register::<Flag>());
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(TypeId::of::<Flag>()).unwrap().class().type_path(),
            core::any::type_name::<Flag>()
        );
        assert!(registry.get_with_type_path("Flag").is_none());
    }

    #[cfg(feature = "auto_register")]
    crate::register_bean!(Flag);

    #[test]
    fn construct_through_registration() {
        let node = ConfigNode::object([("on", ConfigNode::from("yes"))]);
        let path = ConfigPath::parse("flag").unwrap();

        let mut registry = BeanRegistry::new();
        let err = registry.construct::<Flag>(&node, &path).unwrap_err();
        assert_eq!(
            err,
            BeanError::Unregistered {
                type_path: core::any::type_name::<Flag>()
            }
        );
        assert!(err.to_string().ends_with("is not registered"));

        registry.register::<Flag>();
        assert!(registry.construct::<Flag>(&node, &path).unwrap().on);

        let err = registry
            .construct::<Flag>(&ConfigNode::from(1), &path)
            .unwrap_err();
        assert!(matches!(err, BeanError::NotAnObject { .. }));
    }

    #[cfg(feature = "auto_register")]
    #[test]
    fn auto_register_collects_declared_beans() {
        use crate::__macro_exports::AvailFlag;

        let mut registry = BeanRegistry::new();
        assert!(registry.auto_register());
        assert!(registry.contains(TypeId::of::<AvailFlag>()));
        assert!(registry.contains(TypeId::of::<Flag>()));

        let len = registry.len();
        assert!(registry.auto_register());
        assert_eq!(registry.len(), len);
    }
}
