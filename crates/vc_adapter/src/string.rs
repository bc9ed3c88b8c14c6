use alloc::string::{String, ToString};
use core::any::type_name;
use core::fmt;
use core::str::FromStr;

use serde_core::de::Error as _;
use serde_core::{Deserializer, Serializer};
use vc_node::capability::FormatDecoder;

use crate::{ConfigAdapter, guard};

fn display<T: fmt::Display>(value: &T) -> String {
    value.to_string()
}

/// An adapter storing `T` as a config string.
///
/// Decoding reads the current node as a string and runs `decode` on it; a decode
/// error is reported with its own message. Encoding writes `encode(value)` as a
/// string node. Both directions need the config format.
///
/// ```
/// use vc_adapter::{ConfigAdapter, StringAdapter};
/// use vc_node::{ConfigDeserializer, ConfigNode};
///
/// const PORT: StringAdapter<u16, &str> =
///     StringAdapter::new(|s| s.strip_prefix(':').and_then(|p| p.parse().ok()).ok_or("not a port"));
///
/// let port = PORT.deserialize(ConfigDeserializer::new(&ConfigNode::from(":8080"))).unwrap();
/// assert_eq!(port, 8080);
///
/// let err = PORT.deserialize(ConfigDeserializer::new(&ConfigNode::from("8080"))).unwrap_err();
/// assert_eq!(err.to_string(), "not a port");
/// ```
pub struct StringAdapter<T, E> {
    decode: fn(&str) -> Result<T, E>,
    encode: fn(&T) -> String,
    name: Option<&'static str>,
}

impl<T: fmt::Display, E> StringAdapter<T, E> {
    /// Decodes with `decode`, encodes with `T`'s `Display`.
    ///
    /// Round trips only hold when `decode` accepts what `Display` writes.
    #[inline]
    pub const fn new(decode: fn(&str) -> Result<T, E>) -> Self {
        Self {
            decode,
            encode: display::<T>,
            name: None,
        }
    }
}

impl<T: FromStr<Err = E> + fmt::Display, E> StringAdapter<T, E> {
    /// Decodes with `FromStr`, encodes with `Display`.
    #[inline]
    pub const fn from_str() -> Self {
        Self::new(T::from_str)
    }
}

impl<T, E> StringAdapter<T, E> {
    /// Replaces the encode function.
    #[inline]
    pub const fn with_encode(mut self, encode: fn(&T) -> String) -> Self {
        self.encode = encode;
        self
    }

    /// Replaces the diagnostic name, which defaults to the type name of `T`.
    #[inline]
    pub const fn with_name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Runs the decode function alone.
    #[inline]
    pub fn decode(&self, text: &str) -> Result<T, E> {
        (self.decode)(text)
    }

    /// Runs the encode function alone.
    #[inline]
    pub fn encode(&self, value: &T) -> String {
        (self.encode)(value)
    }
}

impl<T, E> Clone for StringAdapter<T, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, E> Copy for StringAdapter<T, E> {}

impl<T, E> fmt::Debug for StringAdapter<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StringAdapter")
            .field(&self.name.unwrap_or(type_name::<T>()))
            .finish()
    }
}

impl<T, E: fmt::Display> ConfigAdapter<T> for StringAdapter<T, E> {
    #[inline]
    fn name(&self) -> &'static str {
        match self.name {
            Some(name) => name,
            None => type_name::<T>(),
        }
    }

    fn deserialize<'de, D: Deserializer<'de>>(&self, deserializer: D) -> Result<T, D::Error> {
        let capability = guard::decoder(deserializer)?;
        let Ok(text) = capability.read_current_as_string() else {
            let found = capability.current_node().unexpected();
            return Err(D::Error::invalid_type(found, &"a string"));
        };
        (self.decode)(&text).map_err(guard::user_failure)
    }

    #[inline]
    fn serialize<S: Serializer>(&self, value: &T, serializer: S) -> Result<S::Ok, S::Error> {
        guard::encode_string(serializer, &(self.encode)(value))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use vc_node::{ConfigDeserializer, ConfigNode, ErrorKind, NodeSerializer, from_node, to_node};

    use super::StringAdapter;
    use crate::ConfigAdapter;

    #[derive(Debug, PartialEq)]
    struct Hex(u32);

    impl core::fmt::Display for Hex {
        fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
            write!(f, "0x{:x}", self.0)
        }
    }

    fn parse_hex(s: &str) -> Result<Hex, String> {
        let digits = s.strip_prefix("0x").ok_or_else(|| format!("`{s}` lacks a 0x prefix"))?;
        u32::from_str_radix(digits, 16)
            .map(Hex)
            .map_err(|err| err.to_string())
    }

    const HEX: StringAdapter<Hex, String> = StringAdapter::new(parse_hex).with_name("hex");

    mod hex {
        crate::adapter_module!(super::HEX => super::Hex);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Registers {
        #[serde(with = "hex")]
        pc: Hex,
        #[serde(default, with = "hex::option")]
        sp: Option<Hex>,
    }

    #[test]
    fn decode_and_encode() {
        let node = ConfigNode::object([("pc", ConfigNode::from("0xff"))]);
        let regs: Registers = from_node(&node).unwrap();
        assert_eq!(regs, Registers { pc: Hex(255), sp: None });

        let regs = Registers {
            pc: Hex(16),
            sp: Some(Hex(1)),
        };
        let node = to_node(&regs).unwrap();
        assert_eq!(node.lookup("pc").unwrap(), &ConfigNode::from("0x10"));
        assert_eq!(node.lookup("sp").unwrap(), &ConfigNode::from("0x1"));
        assert_eq!(from_node::<Registers>(&node).unwrap(), regs);
    }

    #[test]
    fn round_trip_many() {
        let values = [0, 1, 15, 16, 255, 0xdead_beef, u32::MAX]
            .into_iter()
            .chain((0..32).map(|shift| 1u32 << shift))
            .chain((0..32u32).map(|i| i.wrapping_mul(0x9e37_79b9)));
        for value in values {
            let regs = Registers {
                pc: Hex(value),
                sp: Some(Hex(!value)),
            };
            let node = to_node(&regs).unwrap();
            assert_eq!(
                node.lookup("pc").unwrap(),
                &ConfigNode::from(format!("0x{value:x}"))
            );
            assert_eq!(from_node::<Registers>(&node).unwrap(), regs);
        }
    }

    #[test]
    fn user_error_surfaces_verbatim() {
        let node = ConfigNode::object([("pc", ConfigNode::from("ff"))]);
        let err = from_node::<Registers>(&node).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "pc");
        assert!(err.to_string().contains("`ff` lacks a 0x prefix"), "{err}");
    }

    #[test]
    fn object_is_not_a_string() {
        let node = ConfigNode::object([("pc", ConfigNode::object([("a", ConfigNode::from(1))]))]);
        let err = from_node::<Registers>(&node).unwrap_err();
        assert!(!matches!(err.kind(), ErrorKind::MissingField(_)));
        assert_eq!(err.to_string(), "invalid type: map, expected a string at `pc`");
    }

    #[test]
    fn foreign_formats_are_rejected() {
        let err = serde_json::from_str::<Registers>(r#"{ "pc": "0x1" }"#).unwrap_err();
        assert!(
            err.to_string()
                .contains("this value can be decoded only by the config format"),
            "{err}"
        );

        let mut out = Vec::new();
        let result = HEX.serialize(&Hex(1), &mut serde_json::Serializer::new(&mut out));
        let err = result.unwrap_err();
        assert!(
            err.to_string()
                .contains("this value can be encoded only by the config format"),
            "{err}"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn custom_encode() {
        let upper = HEX.with_encode(|hex: &Hex| format!("0x{:X}", hex.0));
        let node = upper.serialize(&Hex(255), NodeSerializer).unwrap();
        assert_eq!(node, ConfigNode::from("0xFF"));
        assert_eq!(upper.deserialize(ConfigDeserializer::new(&node)).unwrap(), Hex(255));
    }

    #[test]
    fn naming() {
        assert_eq!(HEX.name(), "hex");
        let plain: StringAdapter<u8, core::num::ParseIntError> = StringAdapter::from_str();
        assert_eq!(plain.name(), "u8");
        assert_eq!(plain.decode("7"), Ok(7));
        assert_eq!(plain.encode(&7), "7");
    }
}
