//! Training load tracking
//!
//! Exponentially weighted acute (7-session) and chronic (28-session) loads
//! over per-session training stress, with the acute:chronic ratio and a
//! banded recommendation. The same math as a performance-management chart,
//! keyed to sessions rather than calendar days.

use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::LoadConfig;
use crate::models::SessionRecord;

/// Direction of the acute load compared to the lookback point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Increasing,
    Stable,
    Decreasing,
}

/// Current load state for an athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingLoad {
    /// Short-window exponentially weighted load (fatigue)
    pub acute: f64,

    /// Long-window exponentially weighted load (fitness)
    pub chronic: f64,

    /// Acute:chronic workload ratio; 1.0 when chronic is zero
    pub ratio: f64,

    pub trend: TrendDirection,

    /// Human-readable guidance for the current ratio band
    pub recommendation: String,
}

/// One step of the load series, for plotting and trend analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadPoint {
    pub date: NaiveDate,
    pub tss: f64,
    pub acute: f64,
    pub chronic: f64,
}

/// Exponentially weighted load calculator
pub struct LoadTracker {
    config: LoadConfig,
}

impl LoadTracker {
    pub fn new(config: LoadConfig) -> Self {
        Self { config }
    }

    /// Training stress for one session: `duration_min × IF² × 100 / 60`,
    /// where IF is threshold pace over session pace. A session without a
    /// usable pace contributes zero stress.
    pub fn session_tss(&self, session: &SessionRecord, threshold_pace: Decimal) -> f64 {
        let intensity_factor = match session.effective_pace() {
            Some(pace) if pace > Decimal::ZERO => {
                (threshold_pace / pace).to_f64().unwrap_or(0.0)
            }
            _ => return 0.0,
        };
        session.duration_min * intensity_factor * intensity_factor * 100.0 / 60.0
    }

    /// Full load series over a chronological session history.
    pub fn series(&self, sessions: &[SessionRecord], threshold_pace: Decimal) -> Vec<LoadPoint> {
        let acute_decay = (-1.0 / self.config.acute_days).exp();
        let chronic_decay = (-1.0 / self.config.chronic_days).exp();

        let mut acute = 0.0;
        let mut chronic = 0.0;
        let mut points = Vec::with_capacity(sessions.len());

        for session in sessions {
            let tss = self.session_tss(session, threshold_pace);
            acute = acute * acute_decay + tss * (1.0 - acute_decay);
            chronic = chronic * chronic_decay + tss * (1.0 - chronic_decay);
            points.push(LoadPoint {
                date: session.date,
                tss,
                acute,
                chronic,
            });
        }

        points
    }

    /// Current load state: final series point plus ratio, trend, and the
    /// recommendation for the ratio band.
    pub fn compute(&self, sessions: &[SessionRecord], threshold_pace: Decimal) -> TrainingLoad {
        let series = self.series(sessions, threshold_pace);

        let (acute, chronic) = series
            .last()
            .map(|p| (p.acute, p.chronic))
            .unwrap_or((0.0, 0.0));

        let ratio = if chronic > 0.0 { acute / chronic } else { 1.0 };
        let trend = self.trend(&series);
        let recommendation = self.recommendation(ratio);

        debug!(acute, chronic, ratio, "computed training load");

        TrainingLoad {
            acute,
            chronic,
            ratio,
            trend,
            recommendation,
        }
    }

    /// Acute load now versus `trend_lookback` sessions back.
    fn trend(&self, series: &[LoadPoint]) -> TrendDirection {
        if series.len() <= self.config.trend_lookback {
            return TrendDirection::Stable;
        }

        let current = series[series.len() - 1].acute;
        let past = series[series.len() - 1 - self.config.trend_lookback].acute;
        if past <= 0.0 {
            return TrendDirection::Stable;
        }

        let change_pct = (current - past) / past * 100.0;
        if change_pct > self.config.trend_threshold_pct {
            TrendDirection::Increasing
        } else if change_pct < -self.config.trend_threshold_pct {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }

    fn recommendation(&self, ratio: f64) -> String {
        if ratio < self.config.ratio_low {
            "Load is below the productive range; a gradual volume increase is safe".to_string()
        } else if ratio <= self.config.ratio_caution {
            "Load is in the optimal range; maintain the current progression".to_string()
        } else if ratio <= self.config.ratio_high {
            "Load is climbing fast; hold volume steady and monitor recovery".to_string()
        } else {
            "Load spike detected; reduce volume to bring the ratio down".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn session(day: u32, duration_min: f64, pace: Decimal) -> SessionRecord {
        SessionRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .checked_add_days(chrono::Days::new(day as u64))
                .unwrap(),
            distance_km: 0.0,
            duration_min,
            avg_pace: Some(pace),
            avg_heart_rate: None,
            perceived_effort: None,
            is_race: false,
        }
    }

    fn tracker() -> LoadTracker {
        LoadTracker::new(LoadConfig::default())
    }

    #[test]
    fn test_tss_at_threshold_pace() {
        // One hour exactly at threshold pace is 100 TSS
        let s = session(0, 60.0, dec!(5.0));
        let tss = tracker().session_tss(&s, dec!(5.0));
        assert!((tss - 100.0).abs() < 1e-9, "got {}", tss);
    }

    #[test]
    fn test_tss_scales_with_intensity_squared() {
        let easy = session(0, 60.0, dec!(6.0));
        let hard = session(0, 60.0, dec!(4.0));
        let threshold = dec!(5.0);

        let t = tracker();
        let easy_tss = t.session_tss(&easy, threshold);
        let hard_tss = t.session_tss(&hard, threshold);
        assert!(hard_tss > easy_tss);
        // IF 5/4 = 1.25 -> 156.25 TSS for the hour
        assert!((hard_tss - 156.25).abs() < 0.01, "got {}", hard_tss);
    }

    #[test]
    fn test_tss_zero_without_pace() {
        let mut s = session(0, 60.0, dec!(0));
        s.avg_pace = None;
        s.perceived_effort = Some(8);

        assert_eq!(tracker().session_tss(&s, dec!(5.0)), 0.0);
    }

    #[test]
    fn test_empty_history_is_neutral() {
        let load = tracker().compute(&[], dec!(5.0));
        assert_eq!(load.acute, 0.0);
        assert_eq!(load.chronic, 0.0);
        assert_eq!(load.ratio, 1.0);
        assert_eq!(load.trend, TrendDirection::Stable);
    }

    #[test]
    fn test_acute_reacts_faster_than_chronic() {
        let sessions: Vec<_> = (0..10).map(|d| session(d, 60.0, dec!(5.0))).collect();
        let load = tracker().compute(&sessions, dec!(5.0));
        assert!(load.acute > load.chronic);
        assert!(load.ratio > 1.0);
    }

    #[test]
    fn test_steady_training_converges_toward_session_tss() {
        let sessions: Vec<_> = (0..120).map(|d| session(d, 60.0, dec!(5.0))).collect();
        let load = tracker().compute(&sessions, dec!(5.0));
        assert!((load.acute - 100.0).abs() < 1.0, "acute {}", load.acute);
        assert!((load.chronic - 100.0).abs() < 3.0, "chronic {}", load.chronic);
        assert!((load.ratio - 1.0).abs() < 0.05);
    }

    #[test]
    fn test_trend_increasing_after_volume_jump() {
        let mut sessions: Vec<_> = (0..30).map(|d| session(d, 40.0, dec!(5.0))).collect();
        for d in 30..38 {
            sessions.push(session(d, 90.0, dec!(5.0)));
        }
        let load = tracker().compute(&sessions, dec!(5.0));
        assert_eq!(load.trend, TrendDirection::Increasing);
    }

    #[test]
    fn test_trend_decreasing_after_taper() {
        let mut sessions: Vec<_> = (0..30).map(|d| session(d, 80.0, dec!(5.0))).collect();
        for d in 30..38 {
            sessions.push(session(d, 20.0, dec!(5.0)));
        }
        let load = tracker().compute(&sessions, dec!(5.0));
        assert_eq!(load.trend, TrendDirection::Decreasing);
    }

    #[test]
    fn test_trend_stable_with_short_history() {
        let sessions: Vec<_> = (0..5).map(|d| session(d, 60.0, dec!(5.0))).collect();
        let load = tracker().compute(&sessions, dec!(5.0));
        assert_eq!(load.trend, TrendDirection::Stable);
    }

    #[test]
    fn test_recommendation_bands() {
        let t = tracker();
        assert!(t.recommendation(0.5).contains("increase"));
        assert!(t.recommendation(1.0).contains("optimal"));
        assert!(t.recommendation(1.4).contains("monitor"));
        assert!(t.recommendation(1.8).contains("spike"));
    }
}
