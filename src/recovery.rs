//! Recovery scoring and injury risk
//!
//! The recovery score starts from a baseline and is adjusted down for hard
//! sessions in the trailing week and up or down for heart-rate-variability
//! and resting-heart-rate bands. Injury risk combines the acute:chronic
//! ratio band, weekly volume growth, and the inverse of recovery.
//!
//! Both scores are pure functions of their inputs. The trailing window is
//! anchored to the latest session date rather than the wall clock, so the
//! same history always yields the same score.

use tracing::debug;

use crate::config::EngineConfig;
use crate::load::TrainingLoad;
use crate::models::SessionRecord;

/// Recovery score (0-100, higher is better recovered).
///
/// `resting_hr` and `hrv_rmssd` come from a wearable when available; either
/// may be absent and simply applies no adjustment.
pub fn compute_recovery_score(
    sessions: &[SessionRecord],
    resting_hr: Option<u16>,
    hrv_rmssd: Option<f64>,
    config: &EngineConfig,
) -> f64 {
    let config = &config.recovery;
    let mut score = config.baseline;

    if let Some(latest) = sessions.iter().map(|s| s.date).max() {
        let window_start = latest - chrono::Duration::days(config.window_days - 1);
        let hard_sessions = sessions
            .iter()
            .filter(|s| s.date >= window_start && s.effort_at_least(config.hard_rpe))
            .count();
        score -= hard_sessions as f64 * config.hard_session_penalty;
    }

    if let Some(hrv) = hrv_rmssd {
        if hrv >= config.hrv_good {
            score += config.band_adjustment;
        } else if hrv <= config.hrv_poor {
            score -= config.band_adjustment;
        }
    }

    if let Some(rhr) = resting_hr {
        if rhr <= config.rhr_good {
            score += config.band_adjustment;
        } else if rhr >= config.rhr_poor {
            score -= config.band_adjustment;
        }
    }

    score.clamp(0.0, 100.0)
}

/// Injury risk score (0-100, higher is riskier).
///
/// Sums points for the acute:chronic ratio band and the weekly volume
/// growth band, then adds the recovery deficit weighted down.
pub fn compute_injury_risk(
    load: &TrainingLoad,
    weekly_growth_pct: f64,
    recovery_score: f64,
    config: &EngineConfig,
) -> f64 {
    let bands = &config.load;
    let config = &config.recovery;

    let [optimal, undertraining, moderate, high] = config.ratio_points;
    let ratio_risk = if load.ratio > bands.ratio_high {
        high
    } else if load.ratio > bands.ratio_caution {
        moderate
    } else if load.ratio < bands.ratio_low {
        undertraining
    } else {
        optimal
    };

    let [b1, b2, b3] = config.growth_breakpoints;
    let [g0, g1, g2, g3] = config.growth_points;
    let growth_risk = if weekly_growth_pct <= b1 {
        g0
    } else if weekly_growth_pct <= b2 {
        g1
    } else if weekly_growth_pct <= b3 {
        g2
    } else {
        g3
    };

    let recovery_risk = (100.0 - recovery_score) * config.recovery_weight;

    let risk = (ratio_risk + growth_risk + recovery_risk).clamp(0.0, 100.0);
    debug!(ratio_risk, growth_risk, recovery_risk, risk, "computed injury risk");
    risk
}
