//! Engine configuration
//!
//! Defaults can be overridden from JSON or from `HOLLOW_*` environment
//! variables.

use crate::types::{CrossingDirection, Sanity, SessionKey, SoundCue, ThresholdCrossing};
use serde::{Deserialize, Serialize};

/// A sanity level whose crossing is announced to listeners
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanityThreshold {
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cue: Option<SoundCue>,
}

impl SanityThreshold {
    pub fn new(level: u8) -> Self {
        Self { level, cue: None }
    }

    pub fn with_cue(level: u8, cue: impl Into<SoundCue>) -> Self {
        Self {
            level,
            cue: Some(cue.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sanity_thresholds: Vec<SanityThreshold>,
    /// Oldest history entries are dropped beyond this many
    pub history_limit: usize,
    /// Queue a background save after every committed change
    pub autosave: bool,
    pub session_key: SessionKey,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sanity_thresholds: vec![
                SanityThreshold::new(75),
                SanityThreshold::new(50),
                SanityThreshold::with_cue(25, "heartbeat"),
                SanityThreshold::with_cue(10, "whispers"),
            ],
            history_limit: 100,
            autosave: true,
            session_key: SessionKey::from("edens-hollow"),
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Defaults overridden by `HOLLOW_AUTOSAVE`, `HOLLOW_SESSION_KEY` and
    /// `HOLLOW_HISTORY_LIMIT`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = lookup("HOLLOW_AUTOSAVE") {
            config.autosave = !matches!(value.trim(), "0" | "false" | "off" | "no");
        }
        if let Some(key) = lookup("HOLLOW_SESSION_KEY").filter(|k| !k.trim().is_empty()) {
            config.session_key = SessionKey::from(key);
        }
        if let Some(value) = lookup("HOLLOW_HISTORY_LIMIT") {
            match value.trim().parse() {
                Ok(limit) => config.history_limit = limit,
                Err(_) => log::warn!("ignoring invalid HOLLOW_HISTORY_LIMIT '{}'", value),
            }
        }

        config
    }

    /// Threshold levels crossed when sanity moves from `before` to `after`
    ///
    /// A level is crossed downward when sanity drops from at or above it to
    /// below it, and upward on the reverse. Crossings are listed in the
    /// order they are passed through.
    pub fn crossings(&self, before: Sanity, after: Sanity) -> Vec<ThresholdCrossing> {
        let (before, after) = (before.value(), after.value());
        let mut crossed: Vec<ThresholdCrossing> = self
            .sanity_thresholds
            .iter()
            .filter_map(|threshold| {
                let level = threshold.level;
                let direction = if before >= level && after < level {
                    CrossingDirection::Falling
                } else if before < level && after >= level {
                    CrossingDirection::Rising
                } else {
                    return None;
                };
                Some(ThresholdCrossing {
                    level,
                    direction,
                    cue: threshold.cue.clone(),
                })
            })
            .collect();

        if after < before {
            crossed.sort_by(|a, b| b.level.cmp(&a.level));
        } else {
            crossed.sort_by(|a, b| a.level.cmp(&b.level));
        }
        crossed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn falling_crossings_are_ordered_high_to_low() {
        let config = EngineConfig::default();
        let crossed = config.crossings(Sanity::clamped(80), Sanity::clamped(20));
        let levels: Vec<u8> = crossed.iter().map(|c| c.level).collect();
        assert_eq!(levels, vec![75, 50, 25]);
        assert!(crossed.iter().all(|c| c.direction == CrossingDirection::Falling));
        assert_eq!(crossed[2].cue, Some(SoundCue::from("heartbeat")));
    }

    #[test]
    fn rising_crossings_are_ordered_low_to_high() {
        let config = EngineConfig::default();
        let crossed = config.crossings(Sanity::clamped(5), Sanity::clamped(55));
        let levels: Vec<u8> = crossed.iter().map(|c| c.level).collect();
        assert_eq!(levels, vec![10, 25, 50]);
        assert!(crossed.iter().all(|c| c.direction == CrossingDirection::Rising));
    }

    #[test]
    fn landing_on_a_level_from_above_is_not_a_crossing() {
        let config = EngineConfig::default();
        assert!(config.crossings(Sanity::clamped(60), Sanity::clamped(50)).is_empty());
        assert_eq!(config.crossings(Sanity::clamped(50), Sanity::clamped(49)).len(), 1);
    }

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("HOLLOW_AUTOSAVE", "off"),
            ("HOLLOW_SESSION_KEY", "slot-2"),
            ("HOLLOW_HISTORY_LIMIT", "12"),
        ]);
        let config = EngineConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert!(!config.autosave);
        assert_eq!(config.session_key, SessionKey::from("slot-2"));
        assert_eq!(config.history_limit, 12);
    }

    #[test]
    fn invalid_history_limit_keeps_default() {
        let config = EngineConfig::from_lookup(|name| {
            (name == "HOLLOW_HISTORY_LIMIT").then(|| "lots".to_string())
        });
        assert_eq!(config.history_limit, 100);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "autosave": false }"#).unwrap();
        assert!(!config.autosave);
        assert_eq!(config.history_limit, 100);
        assert_eq!(config.sanity_thresholds.len(), 4);
    }
}
