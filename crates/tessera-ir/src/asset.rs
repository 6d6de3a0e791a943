use serde::{Deserialize, Serialize};
use tessera_core::AssetId;

/// The kind of an asset reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Model,
    Texture,
    Material,
    Audio,
    Animation,
    Script,
    Other,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Model => write!(f, "model"),
            AssetKind::Texture => write!(f, "texture"),
            AssetKind::Material => write!(f, "material"),
            AssetKind::Audio => write!(f, "audio"),
            AssetKind::Animation => write!(f, "animation"),
            AssetKind::Script => write!(f, "script"),
            AssetKind::Other => write!(f, "other"),
        }
    }
}

/// A compiled asset reference. Binary content is never carried; `uri` and
/// `data` are explicit nulls when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrAsset {
    pub id: AssetId,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub name: String,
    pub uri: Option<String>,
    pub data: Option<serde_json::Value>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}
