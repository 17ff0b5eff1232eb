//! Physical design configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::Level;

use crate::mincross::MincrossParams;
use crate::plane::PlaneParams;
use crate::{Error, Result};

/// Parameters of the physical design flow.
///
/// Every table and key is optional; missing values fall back to their defaults.
///
/// # Example
///
/// ```
/// # use nanoplace::config::PhysicalDesignConfig;
/// let config = PhysicalDesignConfig::from_toml_str(
///     r#"
///     [mincross]
///     fixed_pis = true
///
///     [plane]
///     num_clock_phases = 3
///     "#,
/// )
/// .unwrap();
/// assert!(config.mincross.fixed_pis);
/// assert_eq!(config.mincross.max_iter, 24);
/// assert_eq!(config.plane.num_clock_phases, 3);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhysicalDesignConfig {
    /// Parameters of the crossing minimizer.
    pub mincross: MincrossParams,
    /// Parameters of the placer.
    pub plane: PlaneParams,
}

impl PhysicalDesignConfig {
    /// Parses a configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.plane.clocking_scheme()?;
        if !(0.0..=1.0).contains(&config.mincross.convergence) {
            return Err(Error::Config(format!(
                "convergence must lie between 0 and 1, got {}",
                config.mincross.convergence
            )));
        }
        Ok(config)
    }

    /// Reads a configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::event!(Level::DEBUG, path = ?path, "reading physical design configuration");
        let s = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&s)
    }

    /// Serializes the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = PhysicalDesignConfig::from_toml_str("").unwrap();
        assert_eq!(config, PhysicalDesignConfig::default());
        assert!(config.mincross.optimize);
        assert_eq!(config.mincross.min_quit, 8);
        assert_eq!(config.mincross.init_refine_max_iters, 4);
        assert_eq!(config.plane.num_clock_phases, 4);
        assert!(!config.plane.verbose);
    }

    #[test]
    fn partial_tables_keep_defaults() {
        let config = PhysicalDesignConfig::from_toml_str(
            r#"
            [mincross]
            max_iter = 48
            convergence = 0.9

            [plane]
            verbose = true
            "#,
        )
        .unwrap();
        assert_eq!(config.mincross.max_iter, 48);
        approx::assert_relative_eq!(config.mincross.convergence, 0.9);
        assert!(!config.mincross.fixed_pis);
        assert!(config.plane.verbose);
        assert_eq!(config.plane.num_clock_phases, 4);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        for s in [
            "[plane]\nnum_clock_phases = 5\n",
            "[mincross]\nconvergence = 2.0\n",
            "[mincross]\nmax_iter = \"many\"\n",
            "[placer]\n",
        ] {
            assert!(
                matches!(
                    PhysicalDesignConfig::from_toml_str(s),
                    Err(Error::Config(_))
                ),
                "{s}"
            );
        }
    }

    #[test]
    fn configs_round_trip_through_toml() {
        let config = PhysicalDesignConfig {
            plane: PlaneParams::builder()
                .num_clock_phases(3)
                .verbose(true)
                .build()
                .unwrap(),
            ..Default::default()
        };
        let s = config.to_toml_string().unwrap();
        assert_eq!(PhysicalDesignConfig::from_toml_str(&s).unwrap(), config);
    }
}
