//! World generation configuration.
//!
//! Loaded by the binary from a JSON5 file; every field has a default so a
//! partial file is valid.

use serde::{Deserialize, Serialize};
use steel_density::{DensityError, NoiseGeneratorSettings, presets};

/// Terrain shape preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Preset {
    /// Solid layers from Y 0 up to `layers`, no caves.
    Flat {
        /// Number of solid layers.
        layers: u32,
    },
    /// Continents, mountains, caves and ore veins.
    Overworld,
}

impl Preset {
    /// Builds the generator settings of this preset.
    pub fn settings(self, legacy_random_source: bool) -> Result<NoiseGeneratorSettings, DensityError> {
        let mut settings = match self {
            Self::Flat { layers } => presets::flat(layers)?,
            Self::Overworld => presets::overworld()?,
        };
        settings.use_legacy_random_source = legacy_random_source;
        Ok(settings)
    }
}

/// Replaces the block chosen by the noise stage, for inspecting terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebugOverride {
    /// Place what the noise stage computes.
    #[default]
    None,
    /// Place nothing; chunks stay empty but heightmaps are still computed by queries.
    VoidTerrain,
    /// Fill every column with the default block up to its preliminary surface level.
    PreliminarySurface,
}

/// Settings read by the generator binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenConfig {
    /// World seed. Empty picks a random one, integers are used as is, anything
    /// else is hashed.
    pub seed: String,
    /// Terrain preset.
    pub preset: Preset,
    /// Use the legacy LCG for every stream.
    pub legacy_random_source: bool,
    /// Chunks generated around the origin, in each direction.
    pub chunk_radius: u32,
    /// Block override for debugging.
    pub debug: DebugOverride,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: String::new(),
            preset: Preset::Overworld,
            legacy_random_source: false,
            chunk_radius: 4,
            debug: DebugOverride::None,
        }
    }
}

/// Parses a configured seed.
///
/// Returns `None` for an empty seed so the caller can pick a random one.
/// Integers parse directly; any other text is folded with the 31 multiplier
/// hash so that word seeds stay stable.
#[must_use]
pub fn parse_seed(seed: &str) -> Option<i64> {
    let seed = seed.trim();
    if seed.is_empty() {
        return None;
    }
    Some(seed.parse().unwrap_or_else(|_| {
        let mut hash: i64 = 0;
        for byte in seed.bytes() {
            hash = hash.wrapping_mul(31).wrapping_add(i64::from(byte));
        }
        hash
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seed() {
        assert_eq!(parse_seed(""), None);
        assert_eq!(parse_seed("  "), None);
        assert_eq!(parse_seed("-42"), Some(-42));
        assert_eq!(parse_seed("a"), Some(97));
        assert_eq!(parse_seed("ab"), Some(97 * 31 + 98));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: WorldGenConfig =
            serde_json::from_str(r#"{"seed": "steel", "preset": {"type": "flat", "layers": 5}}"#).unwrap();
        assert_eq!(config.seed, "steel");
        assert_eq!(config.preset, Preset::Flat { layers: 5 });
        assert_eq!(config.chunk_radius, 4);
        assert_eq!(config.debug, DebugOverride::None);
    }

    #[test]
    fn test_preset_applies_legacy_flag() {
        let settings = Preset::Flat { layers: 3 }.settings(true).unwrap();
        assert!(settings.use_legacy_random_source);
    }
}
