use core::fmt;
use core::marker::PhantomData;

use serde_core::de::DeserializeSeed;
use serde_core::{Deserializer, Serializer};

/// A custom serde strategy for values of type `T`.
///
/// Adapters are immutable once built, usually `const` items, and are shared by
/// every call. Either direction may be unsupported, in which case it always fails.
///
/// Use [`adapter_module!`](crate::adapter_module) to expose an adapter to
/// `#[serde(with = "...")]`, or [`seed`](Self::seed) to drive it as a
/// [`DeserializeSeed`].
///
/// # Buffered content
///
/// Adapters must be called with the config deserializer itself. Serde features
/// that first buffer the input, such as `#[serde(flatten)]` fields and
/// `#[serde(untagged)]` or internally tagged enums, hand them a serde-private
/// deserializer instead. Under those attributes adapters fail with
/// [`AdapterError::UnsupportedFormat`](crate::AdapterError::UnsupportedFormat),
/// and an untagged variant that needs one never matches.
pub trait ConfigAdapter<T>: Send + Sync {
    /// A human readable name, used in diagnostics.
    fn name(&self) -> &'static str;

    fn deserialize<'de, D: Deserializer<'de>>(&self, deserializer: D) -> Result<T, D::Error>;

    fn serialize<S: Serializer>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error>;

    /// Borrows the adapter as a [`DeserializeSeed`].
    #[inline]
    fn seed(&self) -> AdapterSeed<'_, Self, T>
    where
        Self: Sized,
    {
        AdapterSeed {
            adapter: self,
            marker: PhantomData,
        }
    }
}

/// A [`DeserializeSeed`] running a borrowed [`ConfigAdapter`].
pub struct AdapterSeed<'a, A, T> {
    adapter: &'a A,
    marker: PhantomData<fn() -> T>,
}

impl<'de, A: ConfigAdapter<T>, T> DeserializeSeed<'de> for AdapterSeed<'_, A, T> {
    type Value = T;

    #[inline]
    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<T, D::Error> {
        self.adapter.deserialize(deserializer)
    }
}

impl<A: ConfigAdapter<T>, T> fmt::Debug for AdapterSeed<'_, A, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AdapterSeed").field(&self.adapter.name()).finish()
    }
}
