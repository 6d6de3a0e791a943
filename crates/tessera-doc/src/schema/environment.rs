use serde::{Deserialize, Serialize};
use tessera_core::{AssetId, Vec3};
use tessera_ir::{neutral_environment, IrEnvironment, SkyboxKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Skybox {
    pub kind: SkyboxKind,
    pub color: String,
    pub asset_id: Option<AssetId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Fog {
    pub enabled: bool,
    pub color: String,
    pub near: f64,
    pub far: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AmbientLight {
    pub color: String,
    pub intensity: f64,
}

/// Scene-wide rendering and physics environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Environment {
    pub skybox: Skybox,
    pub fog: Fog,
    pub ambient_light: AmbientLight,
    pub gravity: Vec3,
}

// The IR's neutral environment is the single source of defaults, so an
// omitted block and a decompiled one agree.
impl Default for Environment {
    fn default() -> Self {
        Environment::from(&neutral_environment())
    }
}

impl Default for Skybox {
    fn default() -> Self {
        Environment::default().skybox
    }
}

impl Default for Fog {
    fn default() -> Self {
        Environment::default().fog
    }
}

impl Default for AmbientLight {
    fn default() -> Self {
        Environment::default().ambient_light
    }
}

impl From<&IrEnvironment> for Environment {
    fn from(ir: &IrEnvironment) -> Self {
        Self {
            skybox: Skybox {
                kind: ir.skybox_kind,
                color: ir.skybox_color.clone(),
                asset_id: ir.skybox_asset_id.clone(),
            },
            fog: Fog {
                enabled: ir.fog_enabled,
                color: ir.fog_color.clone(),
                near: ir.fog_near,
                far: ir.fog_far,
            },
            ambient_light: AmbientLight {
                color: ir.ambient_color.clone(),
                intensity: ir.ambient_intensity,
            },
            gravity: ir.gravity,
        }
    }
}

impl From<&Environment> for IrEnvironment {
    fn from(env: &Environment) -> Self {
        Self {
            skybox_kind: env.skybox.kind,
            skybox_color: env.skybox.color.clone(),
            skybox_asset_id: env.skybox.asset_id.clone(),
            fog_enabled: env.fog.enabled,
            fog_color: env.fog.color.clone(),
            fog_near: env.fog.near,
            fog_far: env.fog.far,
            ambient_color: env.ambient_light.color.clone(),
            ambient_intensity: env.ambient_light.intensity,
            gravity: env.gravity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct RespawnRules {
    pub enabled: bool,
    pub delay_secs: f64,
    /// `None` means unlimited lives.
    pub max_lives: Option<u32>,
}

impl Default for RespawnRules {
    fn default() -> Self {
        Self {
            enabled: true,
            delay_secs: 3.0,
            max_lives: None,
        }
    }
}

/// Multiplayer game rules. Only meaningful to the editor's play mode; never
/// carried into the IR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct GameSettings {
    pub max_players: u32,
    pub round_duration_secs: u32,
    pub respawn: RespawnRules,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_players: 8,
            round_duration_secs: 300,
            respawn: RespawnRules::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_environment_defaults_match_ir() {
        let env = Environment::default();
        let ir = IrEnvironment::from(&env);
        assert_eq!(ir, neutral_environment());
    }

    #[test]
    fn test_partial_environment() {
        let env: Environment = serde_json::from_value(json!({
            "fog": { "enabled": true }
        }))
        .unwrap();
        assert!(env.fog.enabled);
        assert_eq!(env.fog.far, Fog::default().far);
        assert_eq!(env.gravity, Vec3::new(0.0, -9.81, 0.0));
    }

    #[test]
    fn test_game_settings_defaults() {
        let settings: GameSettings = serde_json::from_value(json!({ "maxPlayers": 16 })).unwrap();
        assert_eq!(settings.max_players, 16);
        assert_eq!(settings.round_duration_secs, 300);
        assert!(settings.respawn.enabled);
    }
}
