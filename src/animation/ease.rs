/// Easing functions used to map looped scene progress.
///
/// The set is closed: scene data names an easing by string and anything unrecognized resolves to
/// [`Ease::Linear`] through [`Ease::from_name`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Ease {
    /// Identity mapping.
    #[default]
    Linear,
    /// Quadratic ease-in/out.
    EaseInOutQuad,
    /// Cubic ease-out.
    EaseOutCubic,
    /// Overshooting ease-out ("back").
    BackOut,
}

impl Ease {
    const BACK_C1: f64 = 1.70158;
    const BACK_C3: f64 = Self::BACK_C1 + 1.0;

    /// Resolve an easing name, falling back to [`Ease::Linear`].
    ///
    /// Accepts kebab-case (`ease-out-cubic`), camelCase (`easeOutCubic`) and snake_case
    /// spellings, case-insensitively.
    pub fn from_name(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "linear" => Self::Linear,
            "easeinoutquad" | "inoutquad" => Self::EaseInOutQuad,
            "easeoutcubic" | "outcubic" => Self::EaseOutCubic,
            "backout" | "easeoutback" => Self::BackOut,
            _ => {
                tracing::debug!(easing = name, "unknown easing name, using linear");
                Self::Linear
            }
        }
    }

    /// Apply this easing function to normalized progress `t` in `[0, 1]`.
    ///
    /// `BackOut` overshoots 1 slightly mid-curve; callers that need a hard bound clamp after.
    pub fn apply(self, t: f64) -> f64 {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        match self {
            Self::Linear => t,
            Self::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(2) / 2.0)
                }
            }
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::BackOut => {
                let u = t - 1.0;
                1.0 + Self::BACK_C3 * u.powi(3) + Self::BACK_C1 * u.powi(2)
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/ease.rs"]
mod tests;
