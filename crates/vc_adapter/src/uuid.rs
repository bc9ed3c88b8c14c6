//! [`Uuid`] values stored as their hyphenated string form.
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use uuid::Uuid;
//! use vc_node::{ConfigNode, from_node, to_node};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Session {
//!     #[serde(with = "vc_adapter::uuid")]
//!     id: Uuid,
//! }
//!
//! let root = ConfigNode::object([("id", ConfigNode::from("b14240e7-acc0-4a19-bc5d-31a7901e36b0"))]);
//! let session: Session = from_node(&root).unwrap();
//! assert_eq!(to_node(&session).unwrap(), root);
//! ```

use uuid::Uuid;

use crate::StringAdapter;

/// Parses with [`Uuid::from_str`](core::str::FromStr), writes the lowercase
/// hyphenated form.
pub const ADAPTER: StringAdapter<Uuid, uuid::Error> = StringAdapter::from_str().with_name("Uuid");

crate::adapter_module!(ADAPTER => Uuid);

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use uuid::Uuid;
    use vc_node::{ConfigNode, from_node, to_node};

    use super::ADAPTER;
    use crate::ConfigAdapter;

    const ID: &str = "b14240e7-acc0-4a19-bc5d-31a7901e36b0";

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Session {
        #[serde(with = "crate::uuid")]
        id: Uuid,
        #[serde(default, with = "crate::uuid::option")]
        parent: Option<Uuid>,
    }

    #[test]
    fn round_trip() {
        let root = ConfigNode::object([("id", ConfigNode::from(ID))]);
        let session: Session = from_node(&root).unwrap();
        assert_eq!(session.id, Uuid::parse_str(ID).unwrap());
        assert_eq!(session.parent, None);

        let node = to_node(&session).unwrap();
        assert_eq!(node.lookup("id").unwrap(), &ConfigNode::from(ID));
        assert_eq!(from_node::<Session>(&node).unwrap(), session);
    }

    #[test]
    fn round_trip_many() {
        let ids = [Uuid::nil(), Uuid::max()]
            .into_iter()
            .chain((0..64u32).map(|i| Uuid::from_u128(0x9e37_79b9_7f4a_7c15_f39c_c060_5ced_c834u128.rotate_left(i * 7))));
        for id in ids {
            let session = Session {
                id,
                parent: Some(Uuid::from_u128(id.as_u128().wrapping_add(1))),
            };
            let node = to_node(&session).unwrap();
            assert_eq!(
                node.lookup("id").unwrap(),
                &ConfigNode::from(id.hyphenated().to_string())
            );
            assert_eq!(from_node::<Session>(&node).unwrap(), session);
        }
    }

    #[test]
    fn buffered_content_is_not_the_config_format() {
        #[derive(Debug, Deserialize)]
        struct Flattened {
            #[serde(flatten)]
            #[allow(dead_code)]
            session: Session,
        }

        #[derive(Debug, PartialEq, Deserialize)]
        #[serde(untagged)]
        enum Reference {
            Id(#[serde(with = "crate::uuid")] Uuid),
            Name(String),
        }

        let root = ConfigNode::object([("id", ConfigNode::from(ID))]);
        let err = from_node::<Flattened>(&root).unwrap_err();
        assert!(
            err.to_string()
                .contains("this value can be decoded only by the config format"),
            "{err}"
        );

        let reference: Reference = from_node(&ConfigNode::from(ID)).unwrap();
        assert_eq!(reference, Reference::Name(ID.into()));
    }

    #[test]
    fn uppercase_reads_and_writes_lowercase() {
        let root = ConfigNode::object([
            ("id", ConfigNode::from(ID.to_uppercase())),
            ("parent", ConfigNode::from(ID)),
        ]);
        let session: Session = from_node(&root).unwrap();
        assert_eq!(session.parent, Some(session.id));
        assert_eq!(to_node(&session).unwrap().lookup("id").unwrap(), &ConfigNode::from(ID));
    }

    #[test]
    fn malformed_uuid() {
        let root = ConfigNode::object([("id", ConfigNode::from("not-a-uuid"))]);
        let err = from_node::<Session>(&root).unwrap_err();
        assert_eq!(err.path().unwrap().to_string(), "id");

        let expected = Uuid::parse_str("not-a-uuid").unwrap_err().to_string();
        assert_eq!(err.to_string(), format!("{expected} at `id`"));
    }

    #[test]
    fn foreign_formats_are_rejected() {
        let json = format!(r#"{{ "id": "{ID}" }}"#);
        let err = serde_json::from_str::<Session>(&json).unwrap_err();
        assert!(
            err.to_string()
                .contains("this value can be decoded only by the config format"),
            "{err}"
        );

        let err = ron::from_str::<Session>(&format!(r#"(id: "{ID}")"#)).unwrap_err();
        assert!(
            err.to_string()
                .contains("this value can be decoded only by the config format"),
            "{err}"
        );

        let session = Session {
            id: Uuid::parse_str(ID).unwrap(),
            parent: None,
        };
        assert!(serde_json::to_string(&session).is_err());
        assert!(ron::to_string(&session).is_err());
        assert_eq!(ADAPTER.name(), "Uuid");
    }
}
