use crate::animation::ease::Ease;
use crate::foundation::core::{Point, Rgba8};
use crate::foundation::math::clamp01;
use crate::scene::model::{ActionBeatDef, HintDef, SceneDef, WaypointDef};

/// Loop length used when a scene omits or corrupts `durationMs`.
pub const DEFAULT_DURATION_MS: f64 = 6000.0;
/// Intensity used when a scene omits or corrupts `intensity`.
pub const DEFAULT_INTENSITY: f64 = 0.5;
/// Entity used when a scene carries no action beats.
pub const DEFAULT_ENTITY_ID: &str = "narrator";

/// Emotional register of a scene or of a single entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Slow, settled.
    Calm,
    /// Anxious, on edge.
    Tense,
    /// Bright, upbeat.
    Joyful,
    /// Sad, subdued.
    Melancholy,
    /// Uncertain, secretive.
    Mysterious,
    /// Fast, energetic.
    Excited,
    /// No particular register.
    #[default]
    Neutral,
}

impl Mood {
    /// Resolve a mood name; unknown names map to [`Mood::Neutral`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "calm" | "peaceful" => Self::Calm,
            "tense" | "anxious" | "fearful" => Self::Tense,
            "joyful" | "happy" => Self::Joyful,
            "melancholy" | "sad" => Self::Melancholy,
            "mysterious" => Self::Mysterious,
            "excited" | "energetic" => Self::Excited,
            "neutral" => Self::Neutral,
            other => {
                tracing::debug!(mood = other, "unknown mood, using neutral");
                Self::Neutral
            }
        }
    }

    /// Glyph color for this mood.
    pub fn color(self) -> Rgba8 {
        match self {
            Self::Calm => Rgba8::rgb(110, 190, 220),
            Self::Tense => Rgba8::rgb(220, 80, 70),
            Self::Joyful => Rgba8::rgb(250, 200, 60),
            Self::Melancholy => Rgba8::rgb(120, 130, 200),
            Self::Mysterious => Rgba8::rgb(160, 100, 210),
            Self::Excited => Rgba8::rgb(250, 130, 40),
            Self::Neutral => Rgba8::rgb(200, 200, 200),
        }
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Calm => "calm",
            Self::Tense => "tense",
            Self::Joyful => "joyful",
            Self::Melancholy => "melancholy",
            Self::Mysterious => "mysterious",
            Self::Excited => "excited",
            Self::Neutral => "neutral",
        }
    }
}

/// Motion style of an entity along the scene path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Follow the path at the scene rate.
    #[default]
    Walk,
    /// Follow the path at twice the scene rate.
    Run,
    /// Slow vertical bob while following the path.
    Float,
    /// Short repeated bounces while following the path.
    Hop,
    /// Hold at the start of the path.
    Idle,
}

impl Action {
    /// Resolve an action name; unknown names map to [`Action::Walk`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "walk" | "move" | "wander" => Self::Walk,
            "run" | "chase" | "flee" => Self::Run,
            "float" | "drift" | "fly" => Self::Float,
            "hop" | "jump" | "bounce" => Self::Hop,
            "idle" | "wait" | "rest" => Self::Idle,
            other => {
                tracing::debug!(action = other, "unknown action, using walk");
                Self::Walk
            }
        }
    }

    /// Multiplier applied to looped scene progress.
    pub fn rate(self) -> f64 {
        match self {
            Self::Run => 2.0,
            Self::Idle => 0.0,
            Self::Walk | Self::Float | Self::Hop => 1.0,
        }
    }

    /// Vertical displacement in pixels at looped progress `t`, before intensity scaling.
    ///
    /// Negative is up.
    pub fn vertical_offset_px(self, t: f64) -> f64 {
        use std::f64::consts::TAU;
        match self {
            Self::Float => -6.0 * (TAU * t * 2.0).sin(),
            Self::Hop => -10.0 * (TAU * t * 6.0).sin().abs(),
            Self::Walk | Self::Run | Self::Idle => 0.0,
        }
    }

    /// Lowercase display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Run => "run",
            Self::Float => "float",
            Self::Hop => "hop",
            Self::Idle => "idle",
        }
    }
}

/// A normalized `[0, 1]` point on the motion path.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LayoutHint {
    /// Horizontal position as a fraction of viewport width.
    pub x: f64,
    /// Vertical position as a fraction of viewport height.
    pub y: f64,
    /// Optional authoring label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl LayoutHint {
    /// Unlabeled hint, clamped into `[0, 1]`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp01(x),
            y: clamp01(y),
            label: None,
        }
    }

    /// Viewport center.
    pub fn center() -> Self {
        Self::new(0.5, 0.5)
    }

    /// Return the hint as a point, or `None` when a coordinate is not finite.
    pub fn point(&self) -> Option<Point> {
        (self.x.is_finite() && self.y.is_finite()).then(|| Point::new(self.x, self.y))
    }

    fn from_def(def: HintDef) -> Self {
        Self {
            x: clamp01(def.x),
            y: clamp01(def.y),
            label: def.label,
        }
    }
}

/// One entity's assignment within a scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBeat {
    /// Entity identifier; also keys the entity's trail.
    pub entity_id: String,
    /// Entity mood (drives glyph color).
    pub mood: Mood,
    /// Motion style.
    pub action: Action,
}

/// Resolved scene: every field present and finite.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    /// Scene mood.
    pub mood: Mood,
    /// Motion intensity in `[0, 1]`.
    pub intensity: f64,
    /// Loop length in milliseconds (`> 0`).
    pub duration_ms: f64,
    /// Ordered path hints (never empty).
    pub layout_hints: Vec<LayoutHint>,
    /// Entities animated in this scene (never empty).
    pub action_beats: Vec<ActionBeat>,
    /// Easing applied to looped progress.
    pub easing: Ease,
}

impl Default for Scene {
    fn default() -> Self {
        Self::from_def(SceneDef::default())
    }
}

impl Scene {
    pub(crate) fn from_def(def: SceneDef) -> Self {
        let mood = def.mood.as_deref().map(Mood::from_name).unwrap_or_default();
        let intensity = clamp01(def.intensity.unwrap_or(DEFAULT_INTENSITY));
        let duration_ms = def
            .duration_ms
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(DEFAULT_DURATION_MS);

        let mut layout_hints: Vec<LayoutHint> = def
            .layout_hints
            .iter()
            .filter_map(HintDef::from_value)
            .map(LayoutHint::from_def)
            .collect();
        if layout_hints.len() < def.layout_hints.len() {
            tracing::debug!(
                dropped = def.layout_hints.len() - layout_hints.len(),
                "dropped malformed layout hints"
            );
        }
        if layout_hints.is_empty() {
            layout_hints.push(LayoutHint::center());
        }

        let mut action_beats: Vec<ActionBeat> = def
            .action_beats
            .into_iter()
            .filter_map(|v| serde_json::from_value::<ActionBeatDef>(v).ok())
            .enumerate()
            .map(|(i, b)| ActionBeat {
                entity_id: b
                    .entity_id
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| format!("entity-{i}")),
                mood: b.mood.as_deref().map(Mood::from_name).unwrap_or(mood),
                action: b.action.as_deref().map(Action::from_name).unwrap_or_default(),
            })
            .collect();
        if action_beats.is_empty() {
            action_beats.push(ActionBeat {
                entity_id: DEFAULT_ENTITY_ID.to_owned(),
                mood,
                action: Action::Walk,
            });
        }

        let easing = def
            .easing_name
            .as_deref()
            .map(Ease::from_name)
            .unwrap_or_default();

        Self {
            mood,
            intensity,
            duration_ms,
            layout_hints,
            action_beats,
            easing,
        }
    }
}

/// A scroll-fraction window bound to one scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    /// Stable identifier used for change detection.
    pub id: String,
    /// Window start in percent, `[0, 100]`.
    pub activation_start: f64,
    /// Window length in percent, `>= 0`.
    pub activation_duration: f64,
    /// Scene played while the window is active.
    pub scene: Scene,
}

impl Waypoint {
    /// Build a waypoint with a default scene.
    pub fn new(id: impl Into<String>, activation_start: f64, activation_duration: f64) -> Self {
        Self {
            id: id.into(),
            activation_start: if activation_start.is_finite() {
                activation_start.clamp(0.0, 100.0)
            } else {
                0.0
            },
            activation_duration: if activation_duration.is_finite() {
                activation_duration.max(0.0)
            } else {
                0.0
            },
            scene: Scene::default(),
        }
    }

    /// Replace the scene.
    pub fn with_scene(mut self, scene: Scene) -> Self {
        self.scene = scene;
        self
    }

    /// Window end in percent.
    pub fn activation_end(&self) -> f64 {
        self.activation_start + self.activation_duration
    }

    /// Return `true` when `scroll_fraction` lies in the activation window.
    ///
    /// Windows are half-open, `[start, end)`, so back-to-back windows hand over exactly at the
    /// shared boundary. A window reaching the end of the document (`end >= 100`) also includes
    /// its end so a fully scrolled reader still resolves a scene.
    pub fn contains(&self, scroll_fraction: f64) -> bool {
        let end = self.activation_end();
        scroll_fraction >= self.activation_start
            && (scroll_fraction < end || (end >= 100.0 && scroll_fraction <= end))
    }

    pub(crate) fn from_def(index: usize, def: WaypointDef) -> Self {
        let id = def
            .id
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| format!("waypoint-{index}"));
        Self::new(
            id,
            def.activation_start.unwrap_or(0.0),
            def.activation_duration.unwrap_or(0.0),
        )
        .with_scene(Scene::from_def(def.scene.unwrap_or_default()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/waypoint.rs"]
mod tests;
