//! Fitness metrics estimation
//!
//! Derives an aerobic index (VDOT-style single-number fitness estimate),
//! critical speed, running economy, and lactate-threshold pace from a
//! chronological session history. Sparse histories fall back to fixed
//! conservative defaults so a new athlete always gets usable numbers.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::{EngineConfig, MetricsConfig};
use crate::load::LoadTracker;
use crate::models::SessionRecord;
use crate::{recovery, weekly};

/// Fitness-metric calculation errors
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The aerobic index fed to pace derivation is outside the valid
    /// physiological domain. Deriving paces from it would be materially
    /// wrong rather than merely imprecise, so this is a hard error.
    #[error("Aerobic index {value} is outside the valid range [30, 85]")]
    InvalidAerobicIndex { value: f64 },
}

/// Derived physiological estimates for one athlete. Recomputed on demand
/// from a session window; never persisted by this crate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessMetrics {
    /// VDOT-style aerobic capacity proxy
    pub aerobic_index: f64,

    /// Critical speed in km/h from the two-point hyperbolic model
    pub critical_speed_kmh: f64,

    /// Oxygen cost per km (ml/kg/km); lower is better
    pub running_economy: f64,

    /// Lactate-threshold pace in min/km
    pub lactate_threshold_pace: Decimal,

    /// Current acute training load
    pub training_load: f64,

    /// Injury risk score (0-100)
    pub injury_risk: f64,

    /// Recovery score (0-100)
    pub recovery_score: f64,
}

/// Training paces derived from the aerobic index, in min/km.
///
/// Invariant: `repetition < interval < threshold < marathon < easy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingPaces {
    pub easy: Decimal,
    pub marathon: Decimal,
    pub threshold: Decimal,
    pub interval: Decimal,
    pub repetition: Decimal,
}

/// Core fitness-metrics engine
pub struct FitnessCalculator {
    config: EngineConfig,
}

impl FitnessCalculator {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Compute the full metrics bundle from a chronological session history.
    ///
    /// Never fails: insufficient data resolves to conservative defaults so
    /// callers needing strictness should validate history length beforehand.
    pub fn compute(&self, sessions: &[SessionRecord]) -> FitnessMetrics {
        let aerobic_index = self.aerobic_index(sessions);
        let critical_speed_kmh = self.critical_speed(sessions);
        let running_economy = self.running_economy(sessions, aerobic_index);
        let lactate_threshold_pace =
            threshold_pace_from_index(aerobic_index, &self.config.metrics);

        let tracker = LoadTracker::new(self.config.load.clone());
        let load = tracker.compute(sessions, lactate_threshold_pace);

        let recovery_score = recovery::compute_recovery_score(sessions, None, None, &self.config);
        let growth = weekly::weekly_volume_growth_pct(sessions);
        let injury_risk =
            recovery::compute_injury_risk(&load, growth, recovery_score, &self.config);

        debug!(
            aerobic_index,
            critical_speed_kmh, injury_risk, "computed fitness metrics"
        );

        FitnessMetrics {
            aerobic_index,
            critical_speed_kmh,
            running_economy,
            lactate_threshold_pace,
            training_load: load.acute,
            injury_risk,
            recovery_score,
        }
    }

    /// Aerobic index from race efforts, falling back to the fastest recent
    /// session of trial distance, falling back to the configured default.
    pub fn aerobic_index(&self, sessions: &[SessionRecord]) -> f64 {
        let cfg = &self.config.metrics;

        let best_race = sessions
            .iter()
            .filter(|s| s.is_race || s.effort_at_least(cfg.race_effort_rpe))
            .filter_map(session_aerobic_estimate)
            .fold(None::<f64>, |best, v| Some(best.map_or(v, |b| b.max(v))));

        if let Some(index) = best_race {
            return index;
        }

        // No race efforts: use the fastest of the recent trial-distance runs
        let recent_start = sessions.len().saturating_sub(cfg.fallback_window);
        sessions[recent_start..]
            .iter()
            .filter(|s| s.distance_km >= cfg.min_trial_km)
            .max_by(|a, b| {
                let va = a.velocity_m_per_min().unwrap_or(0.0);
                let vb = b.velocity_m_per_min().unwrap_or(0.0);
                va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
            })
            .and_then(session_aerobic_estimate)
            .unwrap_or(cfg.default_aerobic_index)
    }

    /// Critical speed (km/h) from the two fastest/slowest high-effort time
    /// trials: `CS = (d2 - d1) / (t2 - t1)`.
    pub fn critical_speed(&self, sessions: &[SessionRecord]) -> f64 {
        let cfg = &self.config.metrics;

        let trials: Vec<&SessionRecord> = sessions
            .iter()
            .filter(|s| {
                s.effort_at_least(cfg.high_effort_rpe)
                    && s.distance_km >= cfg.min_trial_km
                    && s.duration_min > 0.0
            })
            .collect();

        if trials.len() < 2 {
            return cfg.default_critical_speed_kmh;
        }

        let fastest = trials
            .iter()
            .max_by(|a, b| cmp_velocity(a, b))
            .copied();
        let slowest = trials
            .iter()
            .min_by(|a, b| cmp_velocity(a, b))
            .copied();

        match (fastest, slowest) {
            (Some(short), Some(long)) => {
                let (d1, t1) = (short.distance_km * 1000.0, short.duration_min);
                let (d2, t2) = (long.distance_km * 1000.0, long.duration_min);
                if d2 > d1 && t2 > t1 {
                    // m/min -> km/h
                    (d2 - d1) / (t2 - t1) * 60.0 / 1000.0
                } else {
                    cfg.default_critical_speed_kmh
                }
            }
            _ => cfg.default_critical_speed_kmh,
        }
    }

    /// Running economy (ml/kg/km) from low-effort steady runs with heart-rate
    /// data, using heart-rate reserve as a VO2 proxy.
    pub fn running_economy(&self, sessions: &[SessionRecord], aerobic_index: f64) -> f64 {
        let cfg = &self.config.metrics;
        let hr_range = cfg.assumed_max_hr - cfg.assumed_resting_hr;

        let costs: Vec<f64> = sessions
            .iter()
            .filter(|s| {
                s.perceived_effort
                    .map(|e| e <= cfg.easy_effort_rpe)
                    .unwrap_or(false)
                    && s.duration_min >= cfg.economy_min_duration_min
            })
            .filter_map(|s| {
                let hr = s.avg_heart_rate? as f64;
                let velocity = s.velocity_m_per_min()?;
                let hr_reserve = ((hr - cfg.assumed_resting_hr) / hr_range).clamp(0.05, 1.0);
                let vo2 = hr_reserve * aerobic_index;
                let speed_km_per_min = velocity / 1000.0;
                Some(vo2 / speed_km_per_min)
            })
            .collect();

        if costs.is_empty() {
            cfg.default_economy
        } else {
            costs.iter().sum::<f64>() / costs.len() as f64
        }
    }
}

fn cmp_velocity(a: &SessionRecord, b: &SessionRecord) -> std::cmp::Ordering {
    let va = a.velocity_m_per_min().unwrap_or(0.0);
    let vb = b.velocity_m_per_min().unwrap_or(0.0);
    va.partial_cmp(&vb).unwrap_or(std::cmp::Ordering::Equal)
}

/// Aerobic index estimate for a single maximal-effort session.
///
/// Oxygen cost of the velocity (`VO2 = -4.6 + 0.182258·v + 0.000104·v²`,
/// v in m/min) divided by the fraction of VO2max sustainable for the
/// session's duration.
fn session_aerobic_estimate(session: &SessionRecord) -> Option<f64> {
    let v = session.velocity_m_per_min()?;
    if session.duration_min <= 0.0 {
        return None;
    }
    let vo2 = -4.6 + 0.182258 * v + 0.000104 * v * v;
    let pct = percent_of_max(session.duration_min);
    if vo2 <= 0.0 || pct <= 0.0 {
        return None;
    }
    Some(vo2 / pct)
}

/// Fraction of VO2max sustainable for an effort of `t` minutes.
fn percent_of_max(t: f64) -> f64 {
    0.8 + 0.1894393 * (-0.012778 * t).exp() + 0.2989558 * (-0.1932605 * t).exp()
}

/// Lactate-threshold pace (min/km) for an aerobic index.
pub fn threshold_pace_from_index(aerobic_index: f64, config: &MetricsConfig) -> Decimal {
    let velocity_kmh = aerobic_index * config.threshold_fraction / 3.5;
    Decimal::from_f64(60.0 / velocity_kmh).unwrap_or_default()
}

/// Derive the five training paces from an aerobic index.
///
/// The only hard-error path in the crate: indexes outside the valid domain
/// are rejected rather than extrapolated.
pub fn derive_training_paces(
    aerobic_index: f64,
    config: &MetricsConfig,
) -> Result<TrainingPaces, MetricsError> {
    if !aerobic_index.is_finite()
        || aerobic_index < config.min_aerobic_index
        || aerobic_index > config.max_aerobic_index
    {
        return Err(MetricsError::InvalidAerobicIndex {
            value: aerobic_index,
        });
    }

    let threshold = threshold_pace_from_index(aerobic_index, config);

    Ok(TrainingPaces {
        easy: threshold * dec_from(1.25),
        marathon: threshold * dec_from(1.07),
        threshold,
        interval: threshold * dec_from(0.94),
        repetition: threshold * dec_from(0.88),
    })
}

fn dec_from(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or_default()
}
