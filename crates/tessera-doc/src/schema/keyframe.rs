use serde::{Deserialize, Serialize};

/// Interpolation used when animating towards a keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    Step,
}

/// A value at a point in time on an animation track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Keyframe {
    /// Seconds from the start of the clip.
    pub time: f64,
    pub value: serde_json::Value,
    #[serde(default)]
    pub easing: Easing,
}

impl Keyframe {
    pub fn new(time: f64, value: serde_json::Value) -> Self {
        Self {
            time,
            value,
            easing: Easing::Linear,
        }
    }
}
