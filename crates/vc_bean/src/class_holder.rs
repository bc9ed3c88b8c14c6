use core::any::{TypeId, type_name};
use core::fmt;

/// Names a bean type as metadata.
///
/// Bean properties that hold another bean carry one, so a property table can be
/// inspected without decoding anything. Holding a `BeanClassHolder` has no effect
/// on how a value is read.
///
/// # Examples
///
/// ```
/// use vc_bean::BeanClassHolder;
///
/// let holder = BeanClassHolder::of::<String>();
/// assert!(holder.is::<String>());
/// assert_eq!(holder.type_path(), "alloc::string::String");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeanClassHolder {
    type_path: &'static str,
    type_id: TypeId,
}

impl BeanClassHolder {
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_path: type_name::<T>(),
            type_id: TypeId::of::<T>(),
        }
    }

    #[inline]
    pub fn type_path(&self) -> &'static str {
        self.type_path
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

impl fmt::Debug for BeanClassHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BeanClassHolder").field(&self.type_path).finish()
    }
}
