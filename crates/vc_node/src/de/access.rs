use alloc::collections::btree_map;
use alloc::string::String;
use core::iter::Enumerate;
use core::slice;

use serde_core::de::value::BorrowedStrDeserializer;
use serde_core::de::{self, DeserializeSeed, Unexpected, Visitor};
use serde_core::{Deserializer, forward_to_deserialize_any};

use super::ConfigDeserializer;
use crate::{ConfigNode, ConfigObject, ConfigPath, Error};

// -----------------------------------------------------------------------------
// ListAccess

pub(super) struct ListAccess<'a, 'de> {
    items: Enumerate<slice::Iter<'de, ConfigNode>>,
    path: &'a ConfigPath,
}

impl<'a, 'de> ListAccess<'a, 'de> {
    #[inline]
    pub(super) fn new(items: &'de [ConfigNode], path: &'a ConfigPath) -> Self {
        Self {
            items: items.iter().enumerate(),
            path,
        }
    }
}

impl<'de> de::SeqAccess<'de> for ListAccess<'_, 'de> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(
        &mut self,
        seed: T,
    ) -> Result<Option<T::Value>, Error> {
        match self.items.next() {
            Some((index, item)) => {
                let path = self.path.index(index);
                seed.deserialize(ConfigDeserializer::at(item, path.clone()))
                    .map(Some)
                    .map_err(|err| err.at(&path))
            }
            None => Ok(None),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

// -----------------------------------------------------------------------------
// ObjectAccess

pub(super) struct ObjectAccess<'a, 'de> {
    entries: btree_map::Iter<'de, String, ConfigNode>,
    pending: Option<(&'de str, &'de ConfigNode)>,
    path: &'a ConfigPath,
}

impl<'a, 'de> ObjectAccess<'a, 'de> {
    #[inline]
    pub(super) fn new(map: &'de ConfigObject, path: &'a ConfigPath) -> Self {
        Self {
            entries: map.iter(),
            pending: None,
            path,
        }
    }
}

impl<'de> de::MapAccess<'de> for ObjectAccess<'_, 'de> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>, Error> {
        let Some((key, value)) = self.entries.next() else {
            return Ok(None);
        };
        let key = key.as_str();
        self.pending = Some((key, value));
        seed.deserialize(KeyDeserializer(key))
            .map(Some)
            .map_err(|err| err.at(&self.path.key(key)))
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value, Error> {
        match self.pending.take() {
            Some((key, value)) => {
                let path = self.path.key(key);
                seed.deserialize(ConfigDeserializer::at(value, path.clone()))
                    .map_err(|err| err.at(&path))
            }
            None => Err(Error::message("value requested before its key")),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

// -----------------------------------------------------------------------------
// KeyDeserializer

/// Object keys are always text; typed map keys are parsed from it.
struct KeyDeserializer<'de>(&'de str);

impl KeyDeserializer<'_> {
    fn parse<T: core::str::FromStr>(&self, expected: &dyn de::Expected) -> Result<T, Error> {
        self.0
            .parse()
            .map_err(|_| <Error as de::Error>::invalid_type(Unexpected::Str(self.0), expected))
    }
}

macro_rules! deserialize_parsed_key {
    ($($method:ident => $ty:ty, $visit:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
                let value: $ty = self.parse(&visitor)?;
                visitor.$visit(value)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for KeyDeserializer<'de> {
    type Error = Error;

    #[inline]
    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_borrowed_str(self.0)
    }

    deserialize_parsed_key! {
        deserialize_bool => bool, visit_bool;
        deserialize_i8 => i8, visit_i8;
        deserialize_i16 => i16, visit_i16;
        deserialize_i32 => i32, visit_i32;
        deserialize_i64 => i64, visit_i64;
        deserialize_i128 => i128, visit_i128;
        deserialize_u8 => u8, visit_u8;
        deserialize_u16 => u16, visit_u16;
        deserialize_u32 => u32, visit_u32;
        deserialize_u64 => u64, visit_u64;
        deserialize_u128 => u128, visit_u128;
        deserialize_f32 => f32, visit_f32;
        deserialize_f64 => f64, visit_f64;
    }

    #[inline]
    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Error> {
        visitor.visit_some(self)
    }

    #[inline]
    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        BorrowedStrDeserializer::<Error>::new(self.0).deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

// -----------------------------------------------------------------------------
// EnumAccess

pub(super) struct EnumAccess<'de> {
    variant: &'de str,
    value: Option<&'de ConfigNode>,
    path: ConfigPath,
}

impl<'de> EnumAccess<'de> {
    /// A variant written as a bare string.
    #[inline]
    pub(super) fn unit(variant: &'de str, path: ConfigPath) -> Self {
        Self {
            variant,
            value: None,
            path,
        }
    }

    /// A variant written as `{ variant: value }`; `path` points at `value`.
    #[inline]
    pub(super) fn with_value(variant: &'de str, value: &'de ConfigNode, path: ConfigPath) -> Self {
        Self {
            variant,
            value: Some(value),
            path,
        }
    }
}

impl<'de> de::EnumAccess<'de> for EnumAccess<'de> {
    type Error = Error;
    type Variant = VariantAccess<'de>;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant), Error> {
        let variant = seed.deserialize(BorrowedStrDeserializer::<Error>::new(self.variant))?;
        Ok((
            variant,
            VariantAccess {
                value: self.value,
                path: self.path,
            },
        ))
    }
}

pub(super) struct VariantAccess<'de> {
    value: Option<&'de ConfigNode>,
    path: ConfigPath,
}

impl VariantAccess<'_> {
    fn expected(&self, expected: &'static str) -> Error {
        let unexpected = self.value.map_or(Unexpected::UnitVariant, ConfigNode::unexpected);
        <Error as de::Error>::invalid_type(unexpected, &expected).at(&self.path)
    }
}

impl<'de> de::VariantAccess<'de> for VariantAccess<'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Error> {
        match self.value {
            None | Some(ConfigNode::Null) => Ok(()),
            Some(_) => Err(self.expected("unit variant")),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value, Error> {
        match self.value {
            Some(value) => seed
                .deserialize(ConfigDeserializer::at(value, self.path.clone()))
                .map_err(|err| err.at(&self.path)),
            None => Err(self.expected("newtype variant")),
        }
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value, Error> {
        match self.value {
            Some(value) => ConfigDeserializer::at(value, self.path).deserialize_seq(visitor),
            None => Err(self.expected("tuple variant")),
        }
    }

    fn struct_variant<V: Visitor<'de>>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error> {
        match self.value {
            Some(value) => ConfigDeserializer::at(value, self.path).deserialize_map(visitor),
            None => Err(self.expected("struct variant")),
        }
    }
}
