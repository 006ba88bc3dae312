use crate::color::{parse_color, Color};

/// Default summon sound effect.
pub const DEFAULT_SOUND_SUMMON: &str = "sfx_skill_statis_prison_summon";
/// Default zap sound effect.
pub const DEFAULT_SOUND_ZAP: &str = "sfx_skill_statis_prison_zap";

/// Stasis prison parameters as written in a `skill.toml` file.
///
/// All fields are optional; missing or invalid values fall back to the
/// defaults of [`SkillConfig`].
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillDetails {
    pub fade_out_color: Option<String>,
    pub fade_out_time: Option<f32>,
    pub height: Option<f32>,
    pub sound_summon: Option<String>,
    pub sound_zap: Option<String>,
    pub pillar_step_delay: Option<f32>,
    pub pillar_move_duration: Option<f32>,
}

impl SkillDetails {
    /// Parse a `skill.toml` string into `SkillDetails`.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Resolve into a complete configuration.
    pub fn resolve(&self) -> SkillConfig {
        let defaults = SkillConfig::default();
        let seconds = |v: Option<f32>, fallback: f32| {
            v.filter(|s| s.is_finite() && *s >= 0.0).unwrap_or(fallback)
        };
        SkillConfig {
            fade_out_color: self
                .fade_out_color
                .as_deref()
                .and_then(parse_color)
                .unwrap_or(defaults.fade_out_color),
            fade_out_time: seconds(self.fade_out_time, defaults.fade_out_time),
            height: self
                .height
                .filter(|h| h.is_finite())
                .unwrap_or(defaults.height),
            sound_summon: self.sound_summon.clone().unwrap_or(defaults.sound_summon),
            sound_zap: self.sound_zap.clone().unwrap_or(defaults.sound_zap),
            pillar_step_delay: seconds(self.pillar_step_delay, defaults.pillar_step_delay),
            pillar_move_duration: seconds(self.pillar_move_duration, defaults.pillar_move_duration),
        }
    }
}

/// Resolved stasis prison parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct SkillConfig {
    /// Color the pillars shift to while fading out
    pub fade_out_color: Color,
    /// Seconds for every fade of the effect
    pub fade_out_time: f32,
    /// Distance pillars drop from
    pub height: f32,
    /// Played when the pillars are summoned; empty disables it
    pub sound_summon: String,
    /// Played with the thunder flash; empty disables it
    pub sound_zap: String,
    /// Unscaled delay before each pillar starts to drop
    pub pillar_step_delay: f32,
    /// Seconds a pillar takes to drop
    pub pillar_move_duration: f32,
}

impl Default for SkillConfig {
    fn default() -> Self {
        Self {
            fade_out_color: Color::WHITE,
            fade_out_time: 0.3,
            height: 3.0,
            sound_summon: DEFAULT_SOUND_SUMMON.to_string(),
            sound_zap: DEFAULT_SOUND_ZAP.to_string(),
            pillar_step_delay: 0.06,
            pillar_move_duration: 0.1,
        }
    }
}
