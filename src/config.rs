//! Engine configuration
//!
//! Every banding threshold, decay constant, and fallback default used by the
//! calculators lives here so the scientific assumptions are auditable and
//! swappable per test. Components take `&EngineConfig` rather than reading
//! globals; a TOML file can override any field.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration for all calculators.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub metrics: MetricsConfig,
    pub load: LoadConfig,
    pub recovery: RecoveryConfig,
    pub distribution: DistributionConfig,
    pub adaptation: AdaptationConfig,
}

/// Fitness-metrics constants (aerobic index, critical speed, economy).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Conservative aerobic index when no usable session exists
    pub default_aerobic_index: f64,

    /// Valid aerobic-index domain for pace derivation
    pub min_aerobic_index: f64,
    pub max_aerobic_index: f64,

    /// Minimum distance for a session to count as a time trial (km)
    pub min_trial_km: f64,

    /// RPE at or above which a session counts as race effort
    pub race_effort_rpe: u8,

    /// RPE at or above which a session qualifies for the critical-speed model
    pub high_effort_rpe: u8,

    /// RPE at or below which a session qualifies for the economy estimate
    pub easy_effort_rpe: u8,

    /// Minimum duration for economy-qualifying sessions (minutes)
    pub economy_min_duration_min: f64,

    /// Fallback critical speed (km/h) with fewer than two qualifying trials
    pub default_critical_speed_kmh: f64,

    /// Fallback running economy (ml/kg/km); lower is better
    pub default_economy: f64,

    /// Threshold velocity as a fraction of aerobic-index velocity
    pub threshold_fraction: f64,

    /// Assumed max/resting HR for the heart-rate-reserve economy proxy when
    /// the athlete profile is not available
    pub assumed_max_hr: f64,
    pub assumed_resting_hr: f64,

    /// How many recent sessions the fastest-session fallback scans
    pub fallback_window: usize,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            default_aerobic_index: 35.0,
            min_aerobic_index: 30.0,
            max_aerobic_index: 85.0,
            min_trial_km: 3.0,
            race_effort_rpe: 9,
            high_effort_rpe: 8,
            easy_effort_rpe: 6,
            economy_min_duration_min: 20.0,
            default_critical_speed_kmh: 10.0,
            default_economy: 200.0,
            threshold_fraction: 0.88,
            assumed_max_hr: 190.0,
            assumed_resting_hr: 60.0,
            fallback_window: 20,
        }
    }
}

/// Training-load constants (EWMA windows, ratio bands).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadConfig {
    /// Acute load half-life in days (EWMA decay exp(-1/n))
    pub acute_days: f64,

    /// Chronic load half-life in days
    pub chronic_days: f64,

    /// Sessions to look back for the trend comparison
    pub trend_lookback: usize,

    /// Percent change beyond which the trend is increasing/decreasing
    pub trend_threshold_pct: f64,

    /// Acute:chronic ratio bands
    pub ratio_low: f64,
    pub ratio_caution: f64,
    pub ratio_high: f64,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            acute_days: 7.0,
            chronic_days: 28.0,
            trend_lookback: 7,
            trend_threshold_pct: 10.0,
            ratio_low: 0.8,
            ratio_caution: 1.3,
            ratio_high: 1.5,
        }
    }
}

/// Recovery-score and injury-risk constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Recovery score baseline before adjustments
    pub baseline: f64,

    /// Points deducted per hard session in the trailing window
    pub hard_session_penalty: f64,

    /// RPE at or above which a session counts as hard
    pub hard_rpe: u8,

    /// Trailing window in days for the hard-session count
    pub window_days: i64,

    /// HRV bands (RMSSD, ms) and the adjustment they apply
    pub hrv_good: f64,
    pub hrv_poor: f64,

    /// Resting-HR bands (bpm)
    pub rhr_good: u16,
    pub rhr_poor: u16,

    /// Size of each HRV/RHR adjustment in points
    pub band_adjustment: f64,

    /// Injury-risk points per acute:chronic ratio band
    /// [optimal, undertraining, moderate, high]
    pub ratio_points: [f64; 4],

    /// Injury-risk points per weekly-growth band
    pub growth_points: [f64; 4],

    /// Weekly-growth band breakpoints, in percent
    pub growth_breakpoints: [f64; 3],

    /// Weight of (100 - recovery) in the injury-risk sum
    pub recovery_weight: f64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            baseline: 70.0,
            hard_session_penalty: 5.0,
            hard_rpe: 7,
            window_days: 7,
            hrv_good: 60.0,
            hrv_poor: 40.0,
            rhr_good: 55,
            rhr_poor: 70,
            band_adjustment: 10.0,
            ratio_points: [10.0, 20.0, 25.0, 40.0],
            growth_points: [0.0, 10.0, 20.0, 30.0],
            growth_breakpoints: [5.0, 10.0, 20.0],
            recovery_weight: 0.3,
        }
    }
}

/// Intensity-distribution classification and compliance constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Intensity below this percent is easy
    pub easy_below: f64,

    /// Intensity above this percent is hard; between is moderate
    pub hard_above: f64,

    /// Deviation (percentage points) beyond which a bucket is a violation
    pub tolerance_pct: f64,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            easy_below: 70.0,
            hard_above: 87.0,
            tolerance_pct: 10.0,
        }
    }
}

/// Adaptation-engine rule thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptationConfig {
    /// Recovery score below which the athlete is overreached
    pub low_recovery: f64,

    /// Recovery score below which the injury protocol triggers
    pub critical_recovery: f64,

    /// Muscle soreness (1-10) at or above which recovery rules trigger
    pub soreness_high: u8,

    /// Soreness at or above which the injury protocol triggers
    pub soreness_critical: u8,

    /// Adherence percent at or above which adherence counts as good
    pub good_adherence: f64,

    /// Prior stable evaluations before a plateau is called
    pub plateau_evaluations: usize,

    /// Prior declining evaluations that escalate priority to high
    pub decline_escalation: usize,

    /// Default volume reduction proposed for overreach, in percent
    pub overreach_volume_cut_pct: f64,

    /// Default intensity reduction proposed for overreach, in percent
    pub overreach_intensity_cut_pct: f64,
}

impl Default for AdaptationConfig {
    fn default() -> Self {
        Self {
            low_recovery: 40.0,
            critical_recovery: 30.0,
            soreness_high: 7,
            soreness_critical: 9,
            good_adherence: 80.0,
            plateau_evaluations: 2,
            decline_escalation: 2,
            overreach_volume_cut_pct: 20.0,
            overreach_intensity_cut_pct: 15.0,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    pub fn from_path(path: &Path) -> crate::error::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = toml::from_str(&text)
            .map_err(|e| crate::error::RunSenseError::Configuration(e.to_string()))?;
        Ok(config)
    }

    /// Default config file location (`$CONFIG_DIR/runsense/config.toml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("runsense").join("config.toml"))
    }

    /// Load from the default path, falling back to defaults when the file
    /// does not exist.
    pub fn load_or_default() -> crate::error::Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_path(&path),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_documented_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.metrics.default_aerobic_index, 35.0);
        assert_eq!(config.load.acute_days, 7.0);
        assert_eq!(config.load.chronic_days, 28.0);
        assert_eq!(config.recovery.baseline, 70.0);
        assert_eq!(config.distribution.easy_below, 70.0);
        assert_eq!(config.distribution.hard_above, 87.0);
    }

    #[test]
    fn test_partial_toml_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[load]\nacute_days = 5.0").unwrap();

        let config = EngineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.load.acute_days, 5.0);
        // Untouched sections keep their defaults
        assert_eq!(config.load.chronic_days, 28.0);
        assert_eq!(config.recovery.baseline, 70.0);
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[load]\nacute_days = \"seven\"").unwrap();

        let result = EngineConfig::from_path(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_roundtrip_serialization() {
        let config = EngineConfig::default();
        let text = toml::to_string(&config).unwrap();
        let back: EngineConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
