use serde::{Deserialize, Deserializer};

/// Raw batch as received: either `{"waypoints": [...]}` or a bare array.
#[derive(Debug, Clone)]
pub(crate) struct BatchDef {
    pub(crate) waypoints: Vec<WaypointDef>,
}

impl<'de> Deserialize<'de> for BatchDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Wrapped { waypoints: Vec<WaypointDef> },
            Bare(Vec<WaypointDef>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Wrapped { waypoints } | Repr::Bare(waypoints) => Ok(Self { waypoints }),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WaypointDef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) id: Option<String>,
    #[serde(default, alias = "start", deserialize_with = "lenient_f64")]
    pub(crate) activation_start: Option<f64>,
    #[serde(default, alias = "duration", deserialize_with = "lenient_f64")]
    pub(crate) activation_duration: Option<f64>,
    #[serde(default)]
    pub(crate) scene: Option<SceneDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SceneDef {
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) mood: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub(crate) intensity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub(crate) duration_ms: Option<f64>,
    // Kept as raw JSON so one malformed entry drops alone instead of failing the whole scene.
    #[serde(default)]
    pub(crate) layout_hints: Vec<serde_json::Value>,
    #[serde(default)]
    pub(crate) action_beats: Vec<serde_json::Value>,
    #[serde(default, alias = "easing", deserialize_with = "lenient_string")]
    pub(crate) easing_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ActionBeatDef {
    #[serde(default, alias = "entity", deserialize_with = "lenient_string")]
    pub(crate) entity_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) mood: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub(crate) action: Option<String>,
}

/// Hint entry shapes: `[x, y]`, `[x, y, label]` or `{x, y, label?}`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct HintDef {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) label: Option<String>,
}

impl HintDef {
    pub(crate) fn from_value(v: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        let (x, y, label) = match v {
            Value::Array(items) => {
                let x = items.first()?.as_f64()?;
                let y = items.get(1)?.as_f64()?;
                let label = items.get(2).and_then(Value::as_str).map(str::to_owned);
                (x, y, label)
            }
            Value::Object(map) => {
                let x = map.get("x")?.as_f64()?;
                let y = map.get("y")?.as_f64()?;
                let label = map.get("label").and_then(Value::as_str).map(str::to_owned);
                (x, y, label)
            }
            _ => return None,
        };
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(Self { x, y, label })
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
