use chrono::NaiveDate;
use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single logged run. Immutable historical fact supplied by the workout
/// logger; the engine never mutates these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Date of the session
    pub date: NaiveDate,

    /// Distance covered in kilometers
    pub distance_km: f64,

    /// Duration in minutes
    pub duration_min: f64,

    /// Average pace in minutes per kilometer, if recorded
    pub avg_pace: Option<Decimal>,

    /// Average heart rate in bpm, if recorded
    pub avg_heart_rate: Option<u16>,

    /// Rate of perceived exertion (1-10), if recorded
    pub perceived_effort: Option<u8>,

    /// True if the session was a race effort
    #[serde(default)]
    pub is_race: bool,
}

impl SessionRecord {
    /// Average pace in min/km, derived from distance and duration when the
    /// logged pace is missing. None when neither is usable.
    pub fn effective_pace(&self) -> Option<Decimal> {
        if let Some(pace) = self.avg_pace {
            if pace > Decimal::ZERO {
                return Some(pace);
            }
        }
        if self.distance_km > 0.0 && self.duration_min > 0.0 {
            return Decimal::from_f64(self.duration_min / self.distance_km);
        }
        None
    }

    /// Average velocity in meters per minute
    pub fn velocity_m_per_min(&self) -> Option<f64> {
        if self.distance_km > 0.0 && self.duration_min > 0.0 {
            Some(self.distance_km * 1000.0 / self.duration_min)
        } else {
            None
        }
    }

    /// True when logged at or above the given RPE
    pub fn effort_at_least(&self, rpe: u8) -> bool {
        self.perceived_effort.map(|e| e >= rpe).unwrap_or(false)
    }
}

/// A planned (or planned-and-completed) session as handed across the boundary
/// by the plan-generation layer. Intensity is a percentage of maximum effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedSession {
    pub date: NaiveDate,

    /// Planned duration in minutes
    pub duration_min: f64,

    /// Planned intensity as a percentage of maximum (0-100+)
    pub intensity_percent: f64,

    /// Short description ("6x800m @ interval pace")
    #[serde(default)]
    pub description: String,
}

/// Subjective and device-sourced recovery data from an external tracker.
/// Read-only input to the adaptation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryMetrics {
    /// Overall recovery score (0-100)
    pub recovery_score: f64,

    /// Sleep quality (1-10)
    pub sleep_quality: Option<u8>,

    /// Sleep duration in hours
    pub sleep_duration: Option<f64>,

    /// Perceived stress (1-10)
    pub stress_level: Option<u8>,

    /// Muscle soreness (1-10)
    pub muscle_soreness: Option<u8>,

    /// Energy level (1-10)
    pub energy_level: Option<u8>,

    /// Motivation (1-10)
    pub motivation: Option<u8>,
}

/// Training plan phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingPhase {
    Base,
    Build,
    Peak,
    Taper,
    Recovery,
}

impl TrainingPhase {
    pub fn from_str_loose(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "base" => Ok(Self::Base),
            "build" => Ok(Self::Build),
            "peak" => Ok(Self::Peak),
            "taper" => Ok(Self::Taper),
            "recovery" => Ok(Self::Recovery),
            _ => anyhow::bail!("Unknown training phase: {}", s),
        }
    }
}

/// Training methodology governing the target intensity distribution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Methodology {
    /// 80/20 polarized training
    Polarized,
    /// Pyramidal distribution with more moderate work
    Pyramidal,
    /// Threshold-focused distribution
    Threshold,
}

impl Methodology {
    pub fn from_str_loose(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "polarized" => Ok(Self::Polarized),
            "pyramidal" => Ok(Self::Pyramidal),
            "threshold" => Ok(Self::Threshold),
            _ => anyhow::bail!("Unknown methodology: {}", s),
        }
    }
}

/// Target share of training time per intensity bucket, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetDistribution {
    pub easy: f64,
    pub moderate: f64,
    pub hard: f64,
}

impl TargetDistribution {
    /// Methodology- and phase-specific target distribution.
    ///
    /// Taper and recovery phases back off hard work regardless of
    /// methodology; the remaining phases follow the methodology's shape.
    pub fn for_phase(methodology: Methodology, phase: TrainingPhase) -> Self {
        match (methodology, phase) {
            (_, TrainingPhase::Recovery) => Self { easy: 95.0, moderate: 5.0, hard: 0.0 },
            (_, TrainingPhase::Taper) => Self { easy: 85.0, moderate: 5.0, hard: 10.0 },
            (Methodology::Polarized, TrainingPhase::Base) => {
                Self { easy: 85.0, moderate: 5.0, hard: 10.0 }
            }
            (Methodology::Polarized, _) => Self { easy: 80.0, moderate: 5.0, hard: 15.0 },
            (Methodology::Pyramidal, TrainingPhase::Base) => {
                Self { easy: 80.0, moderate: 15.0, hard: 5.0 }
            }
            (Methodology::Pyramidal, _) => Self { easy: 70.0, moderate: 20.0, hard: 10.0 },
            (Methodology::Threshold, _) => Self { easy: 65.0, moderate: 25.0, hard: 10.0 },
        }
    }
}

/// Per-athlete limits that bound every numeric adjustment the adaptation
/// engine proposes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AthleteConstraints {
    /// Minimum recovery days per week the athlete requires
    pub min_recovery_days: u8,

    /// Maximum weekly training hours
    pub max_weekly_hours: f64,

    /// Largest volume reduction the athlete will accept, in percent
    pub max_volume_reduction_pct: f64,
}

impl Default for AthleteConstraints {
    fn default() -> Self {
        Self {
            min_recovery_days: 1,
            max_weekly_hours: 12.0,
            max_volume_reduction_pct: 50.0,
        }
    }
}

/// The slice of an in-progress plan the adaptation engine needs: identity,
/// where in the plan the athlete is, and the limits to respect. The plan
/// layer owns the full structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanContext {
    pub athlete_id: String,
    pub methodology: Methodology,
    pub phase: TrainingPhase,

    /// Current planned weekly hours
    pub weekly_hours: f64,

    #[serde(default)]
    pub constraints: AthleteConstraints,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn session(distance_km: f64, duration_min: f64) -> SessionRecord {
        SessionRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            distance_km,
            duration_min,
            avg_pace: None,
            avg_heart_rate: None,
            perceived_effort: None,
            is_race: false,
        }
    }

    #[test]
    fn test_effective_pace_prefers_logged_value() {
        let mut s = session(10.0, 55.0);
        s.avg_pace = Some(dec!(5.4));
        assert_eq!(s.effective_pace(), Some(dec!(5.4)));
    }

    #[test]
    fn test_effective_pace_derived_from_distance() {
        let s = session(10.0, 50.0);
        assert_eq!(s.effective_pace(), Some(dec!(5.0)));
    }

    #[test]
    fn test_effective_pace_missing() {
        let s = session(0.0, 0.0);
        assert_eq!(s.effective_pace(), None);
    }

    #[test]
    fn test_velocity() {
        let s = session(5.0, 25.0);
        assert_eq!(s.velocity_m_per_min(), Some(200.0));
    }

    #[test]
    fn test_target_distribution_polarized_build() {
        let t = TargetDistribution::for_phase(Methodology::Polarized, TrainingPhase::Build);
        assert_eq!(t.easy, 80.0);
        assert_eq!(t.hard, 15.0);
    }

    #[test]
    fn test_target_distribution_recovery_has_no_hard() {
        for m in [Methodology::Polarized, Methodology::Pyramidal, Methodology::Threshold] {
            let t = TargetDistribution::for_phase(m, TrainingPhase::Recovery);
            assert_eq!(t.hard, 0.0);
        }
    }

    #[test]
    fn test_session_serialization() {
        let mut s = session(12.5, 70.0);
        s.perceived_effort = Some(6);
        let json = serde_json::to_string(&s).unwrap();
        let back: SessionRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_is_race_defaults_false() {
        let json = r#"{"date":"2024-06-03","distance_km":5.0,"duration_min":25.0,
            "avg_pace":null,"avg_heart_rate":null,"perceived_effort":null}"#;
        let s: SessionRecord = serde_json::from_str(json).unwrap();
        assert!(!s.is_race);
    }
}
