use serde::{Deserialize, Serialize};
use tessera_core::{EntityId, WireId};

/// A compiled "when `source_event` fires on the source, invoke
/// `target_action` on the target" edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrWire {
    pub id: WireId,
    pub source_entity_id: EntityId,
    pub source_event: String,
    pub target_entity_id: EntityId,
    pub target_action: String,
    /// Explicit null when the wire carries no parameters.
    pub parameters: Option<serde_json::Map<String, serde_json::Value>>,
}
