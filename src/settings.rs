//! Creature settings and the built-in roster
//!
//! Every creature is configured from a static per-identity table. Pages may
//! override individual fields with JSON (camelCase keys, unknown keys ignored).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Left/right sprite images for asymmetric creatures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Textures {
    pub left: String,
    pub right: String,
}

impl Textures {
    fn roster(name: &str) -> Self {
        Self {
            left: format!("../source/tinipix/tinipix_{name}_left.png"),
            right: format!("../source/tinipix/tinipix_{name}_right.png"),
        }
    }
}

/// Per-creature configuration (immutable once the creature is spawned)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActorSettings {
    /// Downward acceleration (px/tick²)
    pub gravity: f32,
    /// Hop launch speed (px/tick)
    pub jump_strength: f32,
    /// Chance per grounded tick to stop and stay
    pub stay_chance: f32,
    /// Stay dwell range (ms)
    pub stay_duration_min: f32,
    pub stay_duration_max: f32,
    /// Display scale applied to the sprite's natural size
    pub pixel_scale: f32,
    /// Multiplier on horizontal velocity
    pub walk_speed: f32,
    /// Chance to turn around on each landing while walking
    pub walk_flip_chance: f32,
    /// Chance per second of dwell to turn around while staying
    pub stay_flip_chance: f32,
    /// Delay range between look-around flips (ms)
    pub look_around_interval: [f32; 2],
    /// Swap textures instead of mirroring when turning around
    pub asymmetric: bool,
    /// Push apart from other avoiding creatures
    pub avoid_collision: bool,
    /// Minimum gap to other staying creatures, in sprite widths
    pub stay_spacing: f32,
    /// Facing textures (None keeps the element's own image)
    pub textures: Option<Textures>,
}

impl Default for ActorSettings {
    fn default() -> Self {
        Self {
            gravity: 0.25,
            jump_strength: 2.0,
            stay_chance: 0.1,
            stay_duration_min: 2000.0,
            stay_duration_max: 5000.0,
            pixel_scale: 2.0,
            walk_speed: 0.5,
            walk_flip_chance: 0.01,
            stay_flip_chance: 0.02,
            look_around_interval: [1000.0, 3000.0],
            asymmetric: false,
            avoid_collision: false,
            stay_spacing: 0.0,
            textures: None,
        }
    }
}

impl ActorSettings {
    /// Clamp every numeric field into its usable range.
    ///
    /// Non-finite values fall back to the default, negative speeds and
    /// durations clamp to zero, chances clamp to `[0, 1]` and reversed
    /// ranges are swapped. Each correction is logged.
    pub fn validated(mut self, identity: &str) -> Self {
        let defaults = Self::default();

        let fix = |field: &str, value: &mut f32, fallback: f32, min: f32, max: f32| {
            let corrected = if value.is_finite() {
                value.clamp(min, max)
            } else {
                fallback
            };
            if corrected != *value {
                log::warn!("{identity}: {field} {value} corrected to {corrected}");
                *value = corrected;
            }
        };

        fix("gravity", &mut self.gravity, defaults.gravity, 0.0, f32::MAX);
        fix("jumpStrength", &mut self.jump_strength, defaults.jump_strength, 0.0, f32::MAX);
        fix("stayChance", &mut self.stay_chance, defaults.stay_chance, 0.0, 1.0);
        fix(
            "stayDurationMin",
            &mut self.stay_duration_min,
            defaults.stay_duration_min,
            0.0,
            f32::MAX,
        );
        fix(
            "stayDurationMax",
            &mut self.stay_duration_max,
            defaults.stay_duration_max,
            0.0,
            f32::MAX,
        );
        fix("walkSpeed", &mut self.walk_speed, defaults.walk_speed, 0.0, f32::MAX);
        fix("walkFlipChance", &mut self.walk_flip_chance, defaults.walk_flip_chance, 0.0, 1.0);
        fix("stayFlipChance", &mut self.stay_flip_chance, defaults.stay_flip_chance, 0.0, 1.0);
        fix("staySpacing", &mut self.stay_spacing, defaults.stay_spacing, 0.0, f32::MAX);
        let [mut look_min, mut look_max] = self.look_around_interval;
        fix(
            "lookAroundInterval[0]",
            &mut look_min,
            defaults.look_around_interval[0],
            0.0,
            f32::MAX,
        );
        fix(
            "lookAroundInterval[1]",
            &mut look_max,
            defaults.look_around_interval[1],
            0.0,
            f32::MAX,
        );

        // Zero scale would make the sprite vanish
        if !self.pixel_scale.is_finite() || self.pixel_scale <= 0.0 {
            log::warn!("{identity}: pixelScale {} corrected to 1", self.pixel_scale);
            self.pixel_scale = 1.0;
        }

        if self.stay_duration_min > self.stay_duration_max {
            log::warn!("{identity}: stay duration range reversed, swapping");
            std::mem::swap(&mut self.stay_duration_min, &mut self.stay_duration_max);
        }
        if look_min > look_max {
            log::warn!("{identity}: look-around interval reversed, swapping");
            std::mem::swap(&mut look_min, &mut look_max);
        }
        self.look_around_interval = [look_min, look_max];

        if self.asymmetric && self.textures.is_none() {
            log::warn!("{identity}: asymmetric without textures, mirroring instead");
            self.asymmetric = false;
        }

        self
    }

    /// Apply a partial JSON object on top of these settings
    pub fn with_overrides(&self, identity: &str, json: &str) -> Result<Self, SettingsError> {
        let patch: Value = serde_json::from_str(json)?;
        let Value::Object(patch) = patch else {
            return Err(SettingsError::NotAnObject(identity.to_string()));
        };

        let mut base = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut base {
            fields.extend(patch);
        }
        Ok(serde_json::from_value(base)?)
    }
}

/// Settings lookup failures
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("malformed settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings for `{0}` must be a JSON object")]
    NotAnObject(String),
}

/// Settings keyed by creature identity (the sprite element's id)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsTable {
    entries: BTreeMap<String, ActorSettings>,
}

impl SettingsTable {
    /// The page's own cast of creatures
    pub fn builtin() -> Self {
        let asymmetric = |name: &str, stay_chance, min, max, walk_speed, stay_flip| {
            let settings = ActorSettings {
                stay_chance,
                stay_duration_min: min,
                stay_duration_max: max,
                pixel_scale: 1.0,
                walk_speed,
                stay_flip_chance: stay_flip,
                asymmetric: true,
                textures: Some(Textures::roster(name)),
                ..Default::default()
            };
            (name.to_string(), settings)
        };
        let mirrored = |name: &str, stay_chance, min, max, walk_speed, stay_flip| {
            let settings = ActorSettings {
                stay_chance,
                stay_duration_min: min,
                stay_duration_max: max,
                pixel_scale: 1.0,
                walk_speed,
                stay_flip_chance: stay_flip,
                ..Default::default()
            };
            (name.to_string(), settings)
        };

        let entries = [
            asymmetric("favian", 0.5, 500.0, 3000.0, 0.5, 0.009),
            asymmetric("olen", 0.5, 150.0, 2000.0, 0.3, 0.04),
            asymmetric("tennuqi", 0.8, 150.0, 50000.0, 0.5, 0.04),
            mirrored("kikan", 0.05, 1500.0, 2000.0, 0.5, 0.05),
            mirrored("duck", 0.05, 1500.0, 2000.0, 0.25, 0.05),
            mirrored("fyn", 0.09, 1500.0, 50000.0, 0.5, 0.06),
            asymmetric("liner", 0.8, 150.0, 50000.0, 0.5, 0.04),
            asymmetric("mega", 0.05, 20000.0, 50000.0, 0.5, 0.03),
        ]
        .into_iter()
        .collect();

        Self { entries }
    }

    /// Parse a whole table from a JSON object of identity -> settings
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Validated settings for an identity, defaults if unknown
    pub fn get(&self, identity: &str) -> ActorSettings {
        match self.entries.get(identity) {
            Some(settings) => settings.clone().validated(identity),
            None => {
                log::debug!("{identity}: no roster entry, using defaults");
                ActorSettings::default()
            }
        }
    }

    /// Validated settings with a page-supplied JSON override applied.
    ///
    /// A malformed override is logged and ignored.
    pub fn get_with_overrides(&self, identity: &str, json: Option<&str>) -> ActorSettings {
        let base = self.entries.get(identity).cloned().unwrap_or_default();
        let merged = match json {
            Some(json) => base.with_overrides(identity, json).unwrap_or_else(|e| {
                log::warn!("{identity}: ignoring settings override ({e})");
                base.clone()
            }),
            None => base,
        };
        merged.validated(identity)
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.contains_key(identity)
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_roster() {
        let table = SettingsTable::builtin();
        assert_eq!(table.len(), 8);

        let favian = table.get("favian");
        assert!(favian.asymmetric);
        assert_eq!(favian.stay_chance, 0.5);
        assert_eq!(
            favian.textures.unwrap().left,
            "../source/tinipix/tinipix_favian_left.png"
        );

        let duck = table.get("duck");
        assert!(!duck.asymmetric);
        assert_eq!(duck.walk_speed, 0.25);
        assert!(duck.textures.is_none());
    }

    #[test]
    fn test_unknown_identity_uses_defaults() {
        let table = SettingsTable::builtin();
        assert_eq!(table.get("nobody"), ActorSettings::default());
    }

    #[test]
    fn test_json_camel_case_and_unknown_keys() {
        let json = r#"{
            "ghost": {
                "stayChance": 0.3,
                "walkSpeed": 1.5,
                "walkDistanceMin": 10,
                "avoidCollision": true
            }
        }"#;
        let table = SettingsTable::from_json(json).unwrap();
        let ghost = table.get("ghost");
        assert_eq!(ghost.stay_chance, 0.3);
        assert_eq!(ghost.walk_speed, 1.5);
        assert!(ghost.avoid_collision);
        // Missing keys keep their defaults
        assert_eq!(ghost.gravity, 0.25);
        assert_eq!(ghost.look_around_interval, [1000.0, 3000.0]);
    }

    #[test]
    fn test_validation_clamps() {
        let settings = ActorSettings {
            gravity: f32::NAN,
            walk_speed: -1.0,
            stay_chance: 3.0,
            stay_duration_min: 4000.0,
            stay_duration_max: 1000.0,
            look_around_interval: [500.0, -5.0],
            pixel_scale: 0.0,
            asymmetric: true,
            textures: None,
            ..Default::default()
        }
        .validated("test");

        assert_eq!(settings.gravity, 0.25);
        assert_eq!(settings.walk_speed, 0.0);
        assert_eq!(settings.stay_chance, 1.0);
        assert_eq!(settings.stay_duration_min, 1000.0);
        assert_eq!(settings.stay_duration_max, 4000.0);
        assert_eq!(settings.look_around_interval, [0.0, 500.0]);
        assert_eq!(settings.pixel_scale, 1.0);
        assert!(!settings.asymmetric);
    }

    #[test]
    fn test_overrides_merge_onto_roster_entry() {
        let table = SettingsTable::builtin();
        let patch = r#"{"avoidCollision": true, "staySpacing": 1.5}"#;
        let olen = table.get_with_overrides("olen", Some(patch));
        assert!(olen.avoid_collision);
        assert_eq!(olen.stay_spacing, 1.5);
        assert_eq!(olen.walk_speed, 0.3);
        assert!(olen.asymmetric);
    }

    #[test]
    fn test_malformed_override_is_ignored() {
        let table = SettingsTable::builtin();
        assert_eq!(table.get_with_overrides("kikan", Some("[1, 2")), table.get("kikan"));
        assert_eq!(table.get_with_overrides("kikan", Some("[1, 2]")), table.get("kikan"));

        let err = table.get("kikan").with_overrides("kikan", "42").unwrap_err();
        assert!(matches!(err, SettingsError::NotAnObject(_)));
    }
}
