use serde::{Deserialize, Serialize};
use tessera_core::{AssetId, Vec3};

/// How the scene background is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SkyboxKind {
    #[default]
    Color,
    Gradient,
    Asset,
}

/// Flattened, fully explicit scene environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrEnvironment {
    pub skybox_kind: SkyboxKind,
    pub skybox_color: String,
    pub skybox_asset_id: Option<AssetId>,
    pub fog_enabled: bool,
    pub fog_color: String,
    pub fog_near: f64,
    pub fog_far: f64,
    pub ambient_color: String,
    pub ambient_intensity: f64,
    pub gravity: Vec3,
}
