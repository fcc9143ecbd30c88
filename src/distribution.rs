//! Intensity distribution enforcement
//!
//! Classifies planned sessions into easy, moderate, and hard buckets by
//! intensity, time-weights the shares, and compares them against the
//! methodology's target distribution.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::config::EngineConfig;
use crate::models::{PlannedSession, TargetDistribution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityBucket {
    Easy,
    Moderate,
    Hard,
}

impl fmt::Display for IntensityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Easy => write!(f, "easy"),
            Self::Moderate => write!(f, "moderate"),
            Self::Hard => write!(f, "hard"),
        }
    }
}

/// A bucket whose share deviates from target beyond the tolerance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionViolation {
    pub bucket: IntensityBucket,
    pub actual_pct: f64,
    pub target_pct: f64,

    /// Signed deviation (actual minus target), percentage points
    pub deviation_pct: f64,
}

/// Result of checking a plan against its target distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensityReport {
    /// Time-weighted actual shares, in percent
    pub overall: TargetDistribution,
    pub target: TargetDistribution,
    pub violations: Vec<DistributionViolation>,
    pub recommendations: Vec<String>,

    /// 100 minus the mean absolute deviation across buckets, floored at 0
    pub compliance: f64,
}

/// Bucket for a session intensity. The easy bound is inclusive, so a 70%
/// steady run counts as easy and only the tempo band between the bounds is
/// moderate.
pub fn classify(intensity_percent: f64, config: &EngineConfig) -> IntensityBucket {
    if intensity_percent <= config.distribution.easy_below {
        IntensityBucket::Easy
    } else if intensity_percent <= config.distribution.hard_above {
        IntensityBucket::Moderate
    } else {
        IntensityBucket::Hard
    }
}

/// Evaluate a plan's sessions against a target distribution.
///
/// Shares are weighted by session duration, so a 25-minute interval session
/// moves the distribution far less than five hour-long easy runs.
pub fn evaluate(
    sessions: &[PlannedSession],
    target: &TargetDistribution,
    config: &EngineConfig,
) -> IntensityReport {
    let total_min: f64 = sessions.iter().map(|s| s.duration_min).sum();

    if total_min <= 0.0 {
        return IntensityReport {
            overall: TargetDistribution { easy: 0.0, moderate: 0.0, hard: 0.0 },
            target: *target,
            violations: Vec::new(),
            recommendations: vec!["Plan has no training time to evaluate".to_string()],
            compliance: 0.0,
        };
    }

    let mut minutes = [0.0_f64; 3];
    for session in sessions {
        let slot = match classify(session.intensity_percent, config) {
            IntensityBucket::Easy => 0,
            IntensityBucket::Moderate => 1,
            IntensityBucket::Hard => 2,
        };
        minutes[slot] += session.duration_min;
    }

    let actual = TargetDistribution {
        easy: minutes[0] / total_min * 100.0,
        moderate: minutes[1] / total_min * 100.0,
        hard: minutes[2] / total_min * 100.0,
    };

    let pairs = [
        (IntensityBucket::Easy, actual.easy, target.easy),
        (IntensityBucket::Moderate, actual.moderate, target.moderate),
        (IntensityBucket::Hard, actual.hard, target.hard),
    ];

    let mut violations = Vec::new();
    let mut recommendations = Vec::new();
    let mut total_deviation = 0.0;

    for (bucket, actual_pct, target_pct) in pairs {
        let deviation_pct = actual_pct - target_pct;
        total_deviation += deviation_pct.abs();

        if deviation_pct.abs() > config.distribution.tolerance_pct {
            violations.push(DistributionViolation {
                bucket,
                actual_pct,
                target_pct,
                deviation_pct,
            });
            recommendations.push(bucket_recommendation(bucket, deviation_pct));
        }
    }

    let compliance = (100.0 - total_deviation / 3.0).max(0.0);
    debug!(compliance, violations = violations.len(), "evaluated intensity distribution");

    IntensityReport {
        overall: actual,
        target: *target,
        violations,
        recommendations,
        compliance,
    }
}

fn bucket_recommendation(bucket: IntensityBucket, deviation_pct: f64) -> String {
    let direction = if deviation_pct > 0.0 { "above" } else { "below" };
    let action = match (bucket, deviation_pct > 0.0) {
        (IntensityBucket::Easy, true) => "convert some easy volume to quality work",
        (IntensityBucket::Easy, false) => "add easy aerobic volume",
        (IntensityBucket::Moderate, true) => {
            "polarize the plan by moving moderate work to easy or hard"
        }
        (IntensityBucket::Moderate, false) => "add steady or tempo running",
        (IntensityBucket::Hard, true) => "cut interval volume to protect recovery",
        (IntensityBucket::Hard, false) => "add interval or repetition work",
    };
    format!(
        "{} share is {:.0} points {} target; {}",
        bucket,
        deviation_pct.abs(),
        direction,
        action
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn planned(day: u32, duration_min: f64, intensity_percent: f64) -> PlannedSession {
        PlannedSession {
            date: NaiveDate::from_ymd_opt(2024, 6, 3)
                .unwrap()
                .checked_add_days(chrono::Days::new(day as u64))
                .unwrap(),
            duration_min,
            intensity_percent,
            description: String::new(),
        }
    }

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    fn polarized() -> TargetDistribution {
        TargetDistribution { easy: 80.0, moderate: 5.0, hard: 15.0 }
    }

    #[test]
    fn test_classification_boundaries() {
        let cfg = config();
        assert_eq!(classify(70.0, &cfg), IntensityBucket::Easy);
        assert_eq!(classify(70.1, &cfg), IntensityBucket::Moderate);
        assert_eq!(classify(87.0, &cfg), IntensityBucket::Moderate);
        assert_eq!(classify(87.1, &cfg), IntensityBucket::Hard);
    }

    #[test]
    fn test_shares_are_time_weighted() {
        // Five hour-long easy runs and one 25-minute interval session
        let mut sessions: Vec<_> = (0..5).map(|d| planned(d, 60.0, 70.0)).collect();
        sessions.push(planned(5, 25.0, 92.0));

        let report = evaluate(&sessions, &polarized(), &config());
        assert!((report.overall.easy - 92.3).abs() < 0.1, "easy {}", report.overall.easy);
        assert!((report.overall.hard - 7.7).abs() < 0.1, "hard {}", report.overall.hard);
        assert_eq!(report.overall.moderate, 0.0);

        // Easy is 12 points over target, beyond the 10-point tolerance
        assert!(report
            .violations
            .iter()
            .any(|v| v.bucket == IntensityBucket::Easy && v.deviation_pct > 10.0));
        assert!(!report.recommendations.is_empty());
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let sessions = vec![
            planned(0, 45.0, 62.0),
            planned(1, 30.0, 75.0),
            planned(2, 20.0, 95.0),
        ];
        let report = evaluate(&sessions, &polarized(), &config());
        let sum = report.overall.easy + report.overall.moderate + report.overall.hard;
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_compliant_plan_has_no_violations() {
        // 80/5/15 by time, exactly on a polarized target
        let sessions = vec![
            planned(0, 80.0, 65.0),
            planned(1, 5.0, 75.0),
            planned(2, 15.0, 92.0),
        ];
        let report = evaluate(&sessions, &polarized(), &config());
        assert!(report.violations.is_empty());
        assert_eq!(report.compliance, 100.0);
    }

    #[test]
    fn test_compliance_decreases_with_deviation() {
        let on_target = vec![
            planned(0, 80.0, 65.0),
            planned(1, 5.0, 75.0),
            planned(2, 15.0, 92.0),
        ];
        let skewed = vec![planned(0, 50.0, 65.0), planned(1, 50.0, 95.0)];

        let cfg = config();
        let good = evaluate(&on_target, &polarized(), &cfg);
        let bad = evaluate(&skewed, &polarized(), &cfg);
        assert!(bad.compliance < good.compliance);
    }

    #[test]
    fn test_empty_plan() {
        let report = evaluate(&[], &polarized(), &config());
        assert_eq!(report.compliance, 0.0);
        assert!(report.violations.is_empty());
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn test_all_hard_plan_flags_both_directions() {
        let sessions = vec![planned(0, 60.0, 95.0)];
        let report = evaluate(&sessions, &polarized(), &config());

        let buckets: Vec<_> = report.violations.iter().map(|v| v.bucket).collect();
        assert!(buckets.contains(&IntensityBucket::Easy));
        assert!(buckets.contains(&IntensityBucket::Hard));
    }
}
