use crate::error::ConfigError;
use crate::types::Seed;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::path::Path;

/// Deepest recursion accepted by [`TreeParams::validate`].
pub const MAX_DEPTH_LIMIT: u32 = 10;

/// Largest worst-case instance count accepted by [`TreeParams::validate`].
pub const MAX_INSTANCES: u64 = 4_000_000;

/// Seed of the reference tree.
pub const DEFAULT_SEED: Seed = 45;

/// Shape parameters of the branch generator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParams {
    /// Recursion depth at which branches stop emitting.
    pub max_depth: u32,
    /// Multiplier applied to the segment length for each child.
    pub length_decay: f64,
    /// Child invocations spawned from each segment end.
    pub branch_factor: u32,
    pub initial_length: f64,
    /// Trunk direction in the XY plane, radians.
    pub initial_angle: f64,
    pub samples_per_segment: u32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 4,
            length_decay: 0.85,
            branch_factor: 6,
            initial_length: 27.0,
            initial_angle: FRAC_PI_2,
            samples_per_segment: 60,
        }
    }
}

impl TreeParams {
    /// Upper bound on emitted instances: one full segment for every
    /// invocation of a never-pruned tree.
    pub fn max_instances(&self) -> u64 {
        let bf = self.branch_factor as u64;
        let mut level = 1u64;
        let mut segments = 0u64;
        for _ in 0..self.max_depth {
            segments = segments.saturating_add(level);
            level = level.saturating_mul(bf);
        }
        segments.saturating_mul(self.samples_per_segment as u64)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("length_decay", self.length_decay),
            ("initial_length", self.initial_length),
            ("initial_angle", self.initial_angle),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field, value });
            }
        }
        if self.initial_length <= 0.0 {
            return Err(ConfigError::NonPositiveLength(self.initial_length));
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::DepthTooLarge {
                depth: self.max_depth,
                limit: MAX_DEPTH_LIMIT,
            });
        }
        let bound = self.max_instances();
        if bound > MAX_INSTANCES {
            return Err(ConfigError::TooManyInstances {
                bound,
                limit: MAX_INSTANCES,
            });
        }
        Ok(())
    }
}

/// Everything needed to reproduce one tree.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub seed: Seed,
    pub params: TreeParams,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            params: TreeParams::default(),
        }
    }
}

impl TreeConfig {
    /// Parses and validates a JSON config. Missing fields take their
    /// default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.params.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_json_str(&json)?;
        log::info!("loaded tree config from {}", path.display());
        Ok(cfg)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_the_reference_tree() {
        let cfg = TreeConfig::default();
        assert_eq!(cfg.seed, 45);
        assert_eq!(cfg.params.max_depth, 4);
        assert_eq!(cfg.params.length_decay, 0.85);
        assert_eq!(cfg.params.branch_factor, 6);
        assert_eq!(cfg.params.initial_length, 27.0);
        assert_eq!(cfg.params.initial_angle, std::f64::consts::PI * 0.5);
        assert_eq!(cfg.params.samples_per_segment, 60);
        assert!(cfg.params.validate().is_ok());
    }

    #[test]
    fn max_instances_sums_every_level() {
        // 1 + 6 + 36 + 216 segments of 60 samples.
        assert_eq!(TreeParams::default().max_instances(), 259 * 60);

        let mut p = TreeParams::default();
        p.max_depth = 0;
        assert_eq!(p.max_instances(), 0);

        p.max_depth = 5;
        p.branch_factor = 0;
        assert_eq!(p.max_instances(), 60);
    }

    #[test]
    fn max_instances_saturates() {
        let mut p = TreeParams::default();
        p.max_depth = 200;
        p.branch_factor = u32::MAX;
        p.samples_per_segment = u32::MAX;
        assert_eq!(p.max_instances(), u64::MAX);
    }

    #[test]
    fn validate_rejects_non_finite_values() {
        let mut p = TreeParams::default();
        p.length_decay = f64::NAN;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::NonFinite { field: "length_decay", .. })
        ));

        let mut p = TreeParams::default();
        p.initial_angle = f64::INFINITY;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::NonFinite { field: "initial_angle", .. })
        ));
    }

    #[test]
    fn validate_rejects_bad_length_and_depth() {
        let mut p = TreeParams::default();
        p.initial_length = 0.0;
        assert!(matches!(p.validate(), Err(ConfigError::NonPositiveLength(_))));

        let mut p = TreeParams::default();
        p.max_depth = MAX_DEPTH_LIMIT + 1;
        assert!(matches!(p.validate(), Err(ConfigError::DepthTooLarge { .. })));
    }

    #[test]
    fn validate_rejects_explosive_branching() {
        let mut p = TreeParams::default();
        p.max_depth = 10;
        p.branch_factor = 8;
        assert!(matches!(
            p.validate(),
            Err(ConfigError::TooManyInstances { .. })
        ));
    }

    #[test]
    fn degenerate_shapes_are_valid() {
        let mut p = TreeParams::default();
        p.max_depth = 0;
        assert!(p.validate().is_ok());

        let mut p = TreeParams::default();
        p.branch_factor = 0;
        assert!(p.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = TreeConfig::from_json_str(r#"{ "seed": 7, "params": { "max_depth": 3 } }"#).unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.params.max_depth, 3);
        assert_eq!(cfg.params.branch_factor, 6);

        let cfg = TreeConfig::from_json_str("{}").unwrap();
        assert_eq!(cfg, TreeConfig::default());
    }

    #[test]
    fn json_roundtrip_preserves_config() {
        let mut cfg = TreeConfig::default();
        cfg.seed = 1234;
        cfg.params.length_decay = 0.7;
        let json = cfg.to_json_pretty().unwrap();
        assert_eq!(TreeConfig::from_json_str(&json).unwrap(), cfg);
    }

    #[test]
    fn invalid_json_and_invalid_params_are_errors() {
        assert!(matches!(
            TreeConfig::from_json_str("{ not json"),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(
            TreeConfig::from_json_str(r#"{ "params": { "max_depth": 50 } }"#),
            Err(ConfigError::DepthTooLarge { .. })
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = TreeConfig::from_path("/definitely/not/here.json").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => {
                assert_eq!(path, std::path::PathBuf::from("/definitely/not/here.json"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
