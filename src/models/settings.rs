//! Practice settings
//!
//! Mode, automatic page turning and loop bounds. Loop bounds only take
//! effect in practice mode; they are kept (but ignored) in performance mode.

use serde::{Deserialize, Serialize};

use crate::errors::PracticeError;

/// Whether the user is practicing or performing
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    #[default]
    Practice,
    Performance,
}

impl PracticeMode {
    /// Human-readable label for record lists
    pub fn label(self) -> &'static str {
        match self {
            PracticeMode::Practice => "Practice Mode",
            PracticeMode::Performance => "Performance Mode",
        }
    }
}

/// Settings supplied by the settings collaborator
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PracticeSettings {
    pub mode: PracticeMode,
    pub auto_turn_page: bool,
    pub loop_start: Option<u32>,
    pub loop_end: Option<u32>,
}

/// A loop over a page range, inclusive
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopRange {
    pub start: u32,
    pub end: Option<u32>,
}

impl PracticeSettings {
    pub fn is_practice(&self) -> bool {
        self.mode == PracticeMode::Practice
    }

    /// Play/pause is a practice-mode control
    pub fn playback_controls_enabled(&self) -> bool {
        self.is_practice()
    }

    /// The loop in effect, if any
    pub fn active_loop(&self) -> Option<LoopRange> {
        if !self.is_practice() {
            return None;
        }
        self.loop_start.map(|start| LoopRange {
            start,
            end: self.loop_end,
        })
    }

    /// Loop reset button is shown only with an active loop
    pub fn loop_controls_enabled(&self) -> bool {
        self.active_loop().is_some()
    }

    /// Check loop bounds against each other
    pub fn validate(&self) -> Result<(), PracticeError> {
        if let (Some(start), Some(end)) = (self.loop_start, self.loop_end) {
            if end < start {
                return Err(PracticeError::InvalidLoop { start, end });
            }
        }
        Ok(())
    }

    /// Merge a partial update, validating the result before applying it
    pub fn apply(&mut self, patch: SettingsPatch) -> Result<(), PracticeError> {
        let mut updated = self.clone();
        if let Some(mode) = patch.mode {
            updated.mode = mode;
        }
        if let Some(auto_turn_page) = patch.auto_turn_page {
            updated.auto_turn_page = auto_turn_page;
        }
        if let Some(loop_start) = patch.loop_start {
            updated.loop_start = loop_start;
        }
        if let Some(loop_end) = patch.loop_end {
            updated.loop_end = loop_end;
        }
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}

/// Partial settings update.
///
/// Loop bounds use a nested option: `Some(None)` clears a bound, `None`
/// leaves it untouched.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub mode: Option<PracticeMode>,
    pub auto_turn_page: Option<bool>,
    #[serde(deserialize_with = "deserialize_some")]
    pub loop_start: Option<Option<u32>>,
    #[serde(deserialize_with = "deserialize_some")]
    pub loop_end: Option<Option<u32>>,
}

/// Distinguish an explicit `null` from a missing field
fn deserialize_some<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loop_only_active_in_practice_mode() {
        let mut settings = PracticeSettings {
            loop_start: Some(2),
            loop_end: Some(4),
            ..Default::default()
        };
        assert_eq!(
            settings.active_loop(),
            Some(LoopRange { start: 2, end: Some(4) })
        );

        settings.mode = PracticeMode::Performance;
        assert!(settings.active_loop().is_none());
        assert!(!settings.loop_controls_enabled());
        assert!(!settings.playback_controls_enabled());
        // Bounds survive the mode switch
        assert_eq!(settings.loop_start, Some(2));
    }

    #[test]
    fn test_apply_patch_merges_fields() {
        let mut settings = PracticeSettings::default();
        settings
            .apply(SettingsPatch {
                auto_turn_page: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert!(settings.auto_turn_page);
        assert_eq!(settings.mode, PracticeMode::Practice);
    }

    #[test]
    fn test_invalid_loop_patch_leaves_settings_untouched() {
        let mut settings = PracticeSettings {
            loop_start: Some(3),
            ..Default::default()
        };
        let result = settings.apply(SettingsPatch {
            loop_end: Some(Some(1)),
            ..Default::default()
        });

        assert_eq!(result, Err(PracticeError::InvalidLoop { start: 3, end: 1 }));
        assert_eq!(settings.loop_end, None);
    }

    #[test]
    fn test_patch_json_null_clears_loop() {
        let mut settings = PracticeSettings {
            loop_start: Some(3),
            loop_end: Some(5),
            ..Default::default()
        };
        let patch: SettingsPatch = serde_json::from_str(r#"{"loopStart": null}"#).unwrap();
        settings.apply(patch).unwrap();

        assert_eq!(settings.loop_start, None);
        assert_eq!(settings.loop_end, Some(5));
    }

    #[test]
    fn test_settings_json_shape() {
        let settings: PracticeSettings =
            serde_json::from_str(r#"{"mode": "performance", "autoTurnPage": true}"#).unwrap();
        assert_eq!(settings.mode, PracticeMode::Performance);
        assert!(settings.auto_turn_page);
        assert_eq!(settings.loop_start, None);
    }
}
