use serde::{Deserialize, Serialize};
use tessera_core::{AssetId, EntityId, WireId};
use tessera_ir::AssetKind;

/// An opaque asset reference. `uri` and `data` are both optional; the
/// binary itself is never part of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Asset {
    pub id: AssetId,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Asset {
    pub fn new(kind: AssetKind, name: impl Into<String>) -> Self {
        Self {
            id: AssetId::generate(),
            kind,
            name: name.into(),
            uri: None,
            data: None,
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }
}

/// When `source_event` fires on the source entity, invoke `target_action`
/// on the target entity. Endpoints are checked at use, not at parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Wire {
    pub id: WireId,
    pub source_entity_id: EntityId,
    pub source_event: String,
    pub target_entity_id: EntityId,
    pub target_action: String,
    #[serde(default)]
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
}

impl Wire {
    pub fn new(
        source_entity_id: EntityId,
        source_event: impl Into<String>,
        target_entity_id: EntityId,
        target_action: impl Into<String>,
    ) -> Self {
        Self {
            id: WireId::generate(),
            source_entity_id,
            source_event: source_event.into(),
            target_entity_id,
            target_action: target_action.into(),
            parameters: None,
        }
    }
}
