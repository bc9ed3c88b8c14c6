#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern crates

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod bean;
mod class_holder;
mod error;
mod info;
mod property;
mod registry;
mod value;

// -----------------------------------------------------------------------------
// Exports

pub use bean::{Bean, BeanInfoCell};
pub use class_holder::BeanClassHolder;
pub use error::{BeanError, Problem};
pub use info::BeanInfo;
pub use property::Property;
pub use registry::{BeanRegistration, BeanRegistry};
pub use value::FromConfigValue;

// -----------------------------------------------------------------------------
// auto_register

/// Declares a bean for [`BeanRegistry::auto_register`].
///
/// Expands to nothing without the `auto_register` feature.
///
/// ```ignore
/// vc_bean::register_bean!(my_crate::Person);
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! register_bean {
    ($ty:ty) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::AutoRegistration($crate::__macro_exports::register::<$ty>)
        }
    };
}

#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! register_bean {
    ($ty:ty) => {};
}

#[cfg(feature = "auto_register")]
#[doc(hidden)]
pub mod __macro_exports {
    pub use inventory;

    use crate::{Bean, BeanInfo, BeanInfoCell, BeanRegistry};

    pub struct AutoRegistration(pub fn(&mut BeanRegistry));

    inventory::collect!(AutoRegistration);

    #[inline]
    pub fn register<T: Bean>(registry: &mut BeanRegistry) {
        registry.register::<T>();
    }

    /// Registered alongside user beans; its presence shows that `inventory` works
    /// on this platform.
    #[derive(Default)]
    pub struct AvailFlag;

    impl Bean for AvailFlag {
        fn bean_info() -> &'static BeanInfo<Self> {
            static CELL: BeanInfoCell<AvailFlag> = BeanInfoCell::new();
            CELL.get_or_init(|| BeanInfo::new([]))
        }
    }

    crate::register_bean!(AvailFlag);
}
