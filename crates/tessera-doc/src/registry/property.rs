use serde::Serialize;
use serde_json::Value;
use tessera_core::{TesseraError, TesseraResult};
use tessera_ir::AssetKind;

use crate::schema::Keyframe;

/// The value shape a component property accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PropertyKind {
    Number { min: Option<f64>, max: Option<f64> },
    Integer { min: Option<i64>, max: Option<i64> },
    Boolean,
    Text,
    /// `#rrggbb`
    Color,
    Choice { options: &'static [&'static str] },
    Vector3,
    /// Asset id or null.
    AssetRef,
    /// Entity id or null.
    EntityRef,
    /// Track path → time-sorted keyframes.
    Tracks,
    /// Free-form JSON.
    Json,
}

/// How a property editor should present a property.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "camelCase")]
pub enum EditorHint {
    Color,
    Slider { min: f64, max: f64, step: f64 },
    Number { step: f64 },
    Toggle,
    Text { multiline: bool },
    Select { options: &'static [&'static str] },
    Vector3,
    #[serde(rename_all = "camelCase")]
    AssetRef { asset_kind: AssetKind },
    EntityRef,
    Timeline,
    Code,
}

/// One property of a component definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertyDef {
    pub name: &'static str,
    pub kind: PropertyKind,
    pub default: Value,
    pub hint: EditorHint,
}

impl PropertyDef {
    pub fn new(name: &'static str, kind: PropertyKind, default: Value, hint: EditorHint) -> Self {
        Self {
            name,
            kind,
            default,
            hint,
        }
    }
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn expect_number(path: &str, value: &Value) -> TesseraResult<f64> {
    match value.as_f64() {
        Some(n) if n.is_finite() => Ok(n),
        _ => Err(TesseraError::schema(path, "expected a finite number")),
    }
}

impl PropertyKind {
    /// Check `value` against this kind, returning its normalized form.
    pub fn validate(&self, path: &str, value: &Value) -> TesseraResult<Value> {
        match self {
            PropertyKind::Number { min, max } => {
                let n = expect_number(path, value)?;
                if let Some(min) = min {
                    if n < *min {
                        return Err(TesseraError::schema(path, format!("must be >= {min}")));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(TesseraError::schema(path, format!("must be <= {max}")));
                    }
                }
                Ok(value.clone())
            }
            PropertyKind::Integer { min, max } => {
                let n = value
                    .as_i64()
                    .ok_or_else(|| TesseraError::schema(path, "expected an integer"))?;
                if min.is_some_and(|min| n < min) || max.is_some_and(|max| n > max) {
                    return Err(TesseraError::schema(path, "integer out of range"));
                }
                Ok(value.clone())
            }
            PropertyKind::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                _ => Err(TesseraError::schema(path, "expected a boolean")),
            },
            PropertyKind::Text => match value {
                Value::String(_) => Ok(value.clone()),
                _ => Err(TesseraError::schema(path, "expected a string")),
            },
            PropertyKind::Color => match value.as_str() {
                Some(s) if is_hex_color(s) => Ok(value.clone()),
                _ => Err(TesseraError::schema(path, "expected a #rrggbb color")),
            },
            PropertyKind::Choice { options } => match value.as_str() {
                Some(s) if options.contains(&s) => Ok(value.clone()),
                _ => Err(TesseraError::schema(
                    path,
                    format!("expected one of {}", options.join(", ")),
                )),
            },
            PropertyKind::Vector3 => {
                let obj = value
                    .as_object()
                    .ok_or_else(|| TesseraError::schema(path, "expected {x, y, z}"))?;
                if obj.len() != 3 {
                    return Err(TesseraError::schema(path, "expected exactly {x, y, z}"));
                }
                for axis in ["x", "y", "z"] {
                    let component = obj
                        .get(axis)
                        .ok_or_else(|| TesseraError::schema(path, format!("missing axis {axis}")))?;
                    expect_number(&format!("{path}.{axis}"), component)?;
                }
                Ok(value.clone())
            }
            PropertyKind::AssetRef | PropertyKind::EntityRef => match value {
                Value::Null => Ok(Value::Null),
                Value::String(s) if !s.is_empty() => Ok(value.clone()),
                _ => Err(TesseraError::schema(path, "expected an id or null")),
            },
            PropertyKind::Tracks => validate_tracks(path, value),
            PropertyKind::Json => Ok(value.clone()),
        }
    }
}

/// Parse one track's keyframes, requiring finite, non-negative, strictly
/// increasing times.
pub(crate) fn parse_track(path: &str, value: &Value) -> TesseraResult<Vec<Keyframe>> {
    let keyframes: Vec<Keyframe> = serde_json::from_value(value.clone())
        .map_err(|e| TesseraError::schema(path, e.to_string()))?;
    let mut last: Option<f64> = None;
    for keyframe in &keyframes {
        if !keyframe.time.is_finite() || keyframe.time < 0.0 {
            return Err(TesseraError::schema(path, "keyframe time must be >= 0"));
        }
        if last.is_some_and(|t| keyframe.time <= t) {
            return Err(TesseraError::schema(
                path,
                "keyframes must be sorted by strictly increasing time",
            ));
        }
        last = Some(keyframe.time);
    }
    Ok(keyframes)
}

fn validate_tracks(path: &str, value: &Value) -> TesseraResult<Value> {
    let tracks = value
        .as_object()
        .ok_or_else(|| TesseraError::schema(path, "expected an object of tracks"))?;
    let mut normalized = serde_json::Map::new();
    for (name, track) in tracks {
        let track_path = format!("{path}.{name}");
        let keyframes = parse_track(&track_path, track)?;
        let encoded = serde_json::to_value(keyframes)
            .map_err(|e| TesseraError::schema(&track_path, e.to_string()))?;
        normalized.insert(name.clone(), encoded);
    }
    Ok(Value::Object(normalized))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_bounds() {
        let kind = PropertyKind::Number {
            min: Some(0.0),
            max: Some(1.0),
        };
        assert!(kind.validate("p", &json!(0.5)).is_ok());
        assert!(kind.validate("p", &json!(1.5)).is_err());
        assert!(kind.validate("p", &json!("0.5")).is_err());
    }

    #[test]
    fn test_color() {
        assert!(PropertyKind::Color.validate("c", &json!("#a0B1c2")).is_ok());
        assert!(PropertyKind::Color.validate("c", &json!("red")).is_err());
    }

    #[test]
    fn test_vector3() {
        let kind = PropertyKind::Vector3;
        assert!(kind.validate("v", &json!({ "x": 1, "y": 2, "z": 3 })).is_ok());
        assert!(kind.validate("v", &json!({ "x": 1, "y": 2 })).is_err());
        assert!(kind.validate("v", &json!({ "x": 1, "y": 2, "w": 3 })).is_err());
    }

    #[test]
    fn test_tracks_normalize_easing() {
        let value = json!({ "position.x": [{ "time": 0.0, "value": 1.0 }] });
        let normalized = PropertyKind::Tracks.validate("tracks", &value).unwrap();
        assert_eq!(normalized["position.x"][0]["easing"], json!("linear"));
    }

    #[test]
    fn test_tracks_reject_unsorted() {
        let value = json!({ "opacity": [
            { "time": 1.0, "value": 1.0 },
            { "time": 0.5, "value": 0.0 }
        ] });
        assert!(PropertyKind::Tracks.validate("tracks", &value).is_err());
    }

    #[test]
    fn test_asset_ref_accepts_null() {
        assert_eq!(
            PropertyKind::AssetRef.validate("a", &Value::Null).unwrap(),
            Value::Null
        );
        assert!(PropertyKind::AssetRef.validate("a", &json!("")).is_err());
    }
}
