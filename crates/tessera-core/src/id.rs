//! Collision-resistant identifiers.
//!
//! Each identifier kind has a fixed alphabet, length and prefix. Generation
//! never blocks and never fails; collisions are treated as negligible and are
//! not defended against.

use rand::Rng;
use serde::{Deserialize, Serialize};

const ALPHANUMERIC: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const URL_SAFE: &[u8] = b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

pub const ENTITY_ID_LEN: usize = 16;
pub const OPERATION_ID_LEN: usize = 21;
pub const ASSET_ID_PREFIX: &str = "ast_";
pub const WIRE_ID_PREFIX: &str = "wir_";
/// Length of the random part of prefixed ids.
pub const PREFIXED_ID_LEN: usize = 12;

fn random_string(alphabet: &[u8], len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier of an entity in a document.
    EntityId
);
string_id!(
    /// Unique identifier of an asset reference.
    AssetId
);
string_id!(
    /// Unique identifier of an event-to-action wire.
    WireId
);
string_id!(
    /// Unique identifier of a patch operation, used as a log key.
    OperationId
);

impl EntityId {
    /// 16 alphanumeric characters, no prefix.
    pub fn generate() -> Self {
        Self(random_string(ALPHANUMERIC, ENTITY_ID_LEN))
    }
}

impl OperationId {
    /// 21 URL-safe characters (~126 bits of entropy).
    pub fn generate() -> Self {
        Self(random_string(URL_SAFE, OPERATION_ID_LEN))
    }
}

impl AssetId {
    /// `ast_` followed by 12 alphanumeric characters.
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            ASSET_ID_PREFIX,
            random_string(ALPHANUMERIC, PREFIXED_ID_LEN)
        ))
    }
}

impl WireId {
    /// `wir_` followed by 12 alphanumeric characters.
    pub fn generate() -> Self {
        Self(format!(
            "{}{}",
            WIRE_ID_PREFIX,
            random_string(ALPHANUMERIC, PREFIXED_ID_LEN)
        ))
    }
}

/// Identifier of a whole document (UUID v4).
pub fn document_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
