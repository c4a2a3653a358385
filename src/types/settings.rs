//! Player preferences carried with the session
//!
//! Settings are opaque to narrative logic; the engine only stores and
//! persists them for the presentation and audio layers.

use serde::{Deserialize, Serialize};

const MAX_VOLUME: u8 = 100;

/// How fast passage text is revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextSpeed {
    Slow,
    #[default]
    Normal,
    Fast,
    Instant,
}

/// Presentation and audio preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub master_volume: u8,
    pub music_volume: u8,
    pub sfx_volume: u8,
    pub muted: bool,
    pub text_speed: TextSpeed,
    /// Distortion and flicker effects at low sanity
    pub screen_effects: bool,
    pub high_contrast: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            master_volume: 80,
            music_volume: 70,
            sfx_volume: 90,
            muted: false,
            text_speed: TextSpeed::Normal,
            screen_effects: true,
            high_contrast: false,
        }
    }
}

/// A single settings change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum SettingUpdate {
    MasterVolume(u8),
    MusicVolume(u8),
    SfxVolume(u8),
    Muted(bool),
    TextSpeed(TextSpeed),
    ScreenEffects(bool),
    HighContrast(bool),
}

impl GameSettings {
    /// Apply an update; volumes above 100 are clamped
    pub fn apply(&mut self, update: SettingUpdate) {
        match update {
            SettingUpdate::MasterVolume(v) => self.master_volume = v.min(MAX_VOLUME),
            SettingUpdate::MusicVolume(v) => self.music_volume = v.min(MAX_VOLUME),
            SettingUpdate::SfxVolume(v) => self.sfx_volume = v.min(MAX_VOLUME),
            SettingUpdate::Muted(m) => self.muted = m,
            SettingUpdate::TextSpeed(s) => self.text_speed = s,
            SettingUpdate::ScreenEffects(e) => self.screen_effects = e,
            SettingUpdate::HighContrast(h) => self.high_contrast = h,
        }
    }

    /// Copy with every volume clamped to 100, for settings read from a save
    pub fn normalized(mut self) -> Self {
        for volume in [
            &mut self.master_volume,
            &mut self.music_volume,
            &mut self.sfx_volume,
        ] {
            *volume = (*volume).min(MAX_VOLUME);
        }
        self
    }

    /// Effective sound-effect volume in `0.0..=1.0`
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.muted {
            return 0.0;
        }
        f32::from(self.master_volume) / 100.0 * f32::from(self.sfx_volume) / 100.0
    }
}
