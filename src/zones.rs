//! Training zone personalization
//!
//! A canonical seven-tier zone table defined in percent of max heart rate
//! and in pace factors relative to threshold pace. `personalize_zones`
//! instantiates the table for one athlete's max HR and threshold pace.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of the canonical zone table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneDef {
    pub number: u8,
    pub name: &'static str,

    /// Intensity band in percent of max HR
    pub min_hr_percent: f64,
    pub max_hr_percent: f64,

    /// Pace band as multiples of threshold pace (min/km, so larger is
    /// slower); fast bound first
    pub fast_pace_factor: f64,
    pub slow_pace_factor: f64,

    /// Perceived-effort band (1-10)
    pub min_rpe: u8,
    pub max_rpe: u8,

    pub description: &'static str,
    pub purpose: &'static str,
}

/// The canonical table. Bands are contiguous; the intensity breakpoints at
/// 60/70/80/87/92/97 percent separate adjacent zones.
pub const ZONE_TABLE: [ZoneDef; 7] = [
    ZoneDef {
        number: 1,
        name: "Recovery",
        min_hr_percent: 50.0,
        max_hr_percent: 60.0,
        fast_pace_factor: 1.35,
        slow_pace_factor: 1.50,
        min_rpe: 1,
        max_rpe: 2,
        description: "Very easy jogging for active recovery",
        purpose: "Active recovery between quality days",
    },
    ZoneDef {
        number: 2,
        name: "Easy",
        min_hr_percent: 60.0,
        max_hr_percent: 70.0,
        fast_pace_factor: 1.20,
        slow_pace_factor: 1.35,
        min_rpe: 3,
        max_rpe: 4,
        description: "Conversational aerobic base building",
        purpose: "Aerobic base and capillary development",
    },
    ZoneDef {
        number: 3,
        name: "Steady",
        min_hr_percent: 70.0,
        max_hr_percent: 80.0,
        fast_pace_factor: 1.10,
        slow_pace_factor: 1.20,
        min_rpe: 5,
        max_rpe: 6,
        description: "Moderate aerobic running, marathon effort and below",
        purpose: "Aerobic strength and fatigue resistance",
    },
    ZoneDef {
        number: 4,
        name: "Tempo",
        min_hr_percent: 80.0,
        max_hr_percent: 87.0,
        fast_pace_factor: 1.02,
        slow_pace_factor: 1.10,
        min_rpe: 6,
        max_rpe: 7,
        description: "Comfortably hard running just below threshold",
        purpose: "Sustained effort tolerance",
    },
    ZoneDef {
        number: 5,
        name: "Threshold",
        min_hr_percent: 87.0,
        max_hr_percent: 92.0,
        fast_pace_factor: 0.97,
        slow_pace_factor: 1.02,
        min_rpe: 7,
        max_rpe: 8,
        description: "Lactate threshold intervals and cruise repeats",
        purpose: "Raise the lactate threshold",
    },
    ZoneDef {
        number: 6,
        name: "VO2max",
        min_hr_percent: 92.0,
        max_hr_percent: 97.0,
        fast_pace_factor: 0.90,
        slow_pace_factor: 0.97,
        min_rpe: 8,
        max_rpe: 9,
        description: "Hard intervals at aerobic capacity",
        purpose: "Maximal aerobic power development",
    },
    ZoneDef {
        number: 7,
        name: "Neuromuscular",
        min_hr_percent: 97.0,
        max_hr_percent: 100.0,
        fast_pace_factor: 0.80,
        slow_pace_factor: 0.90,
        min_rpe: 9,
        max_rpe: 10,
        description: "Short repetitions for speed and economy",
        purpose: "Speed, power, and running economy",
    },
];

/// A zone instantiated for one athlete
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingZone {
    pub number: u8,
    pub name: String,

    /// Heart-rate band in bpm
    pub min_hr: u16,
    pub max_hr: u16,

    /// Pace band in min/km, fast bound first
    pub fast_pace: Decimal,
    pub slow_pace: Decimal,

    /// Perceived-effort band (1-10)
    pub min_rpe: u8,
    pub max_rpe: u8,

    pub description: String,
    pub purpose: String,
}

/// Instantiate the canonical table for an athlete's max HR and threshold
/// pace. Always returns all seven zones, in order.
pub fn personalize_zones(max_hr: u16, threshold_pace: Decimal) -> Vec<TrainingZone> {
    ZONE_TABLE
        .iter()
        .map(|def| TrainingZone {
            number: def.number,
            name: def.name.to_string(),
            min_hr: (max_hr as f64 * def.min_hr_percent / 100.0).round() as u16,
            max_hr: (max_hr as f64 * def.max_hr_percent / 100.0).round() as u16,
            fast_pace: threshold_pace * factor(def.fast_pace_factor),
            slow_pace: threshold_pace * factor(def.slow_pace_factor),
            min_rpe: def.min_rpe,
            max_rpe: def.max_rpe,
            description: def.description.to_string(),
            purpose: def.purpose.to_string(),
        })
        .collect()
}

fn factor(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or_default()
}

/// The zone an intensity (percent of max effort) falls in.
pub fn zone_for_intensity(intensity_percent: f64) -> &'static ZoneDef {
    let index = if intensity_percent < 60.0 {
        0
    } else if intensity_percent < 70.0 {
        1
    } else if intensity_percent < 80.0 {
        2
    } else if intensity_percent < 87.0 {
        3
    } else if intensity_percent < 92.0 {
        4
    } else if intensity_percent < 97.0 {
        5
    } else {
        6
    };
    &ZONE_TABLE[index]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_table_is_contiguous_and_ordered() {
        for pair in ZONE_TABLE.windows(2) {
            assert_eq!(pair[0].max_hr_percent, pair[1].min_hr_percent);
            assert_eq!(pair[0].number + 1, pair[1].number);
            // Higher zones are faster and harder
            assert!(pair[1].slow_pace_factor <= pair[0].fast_pace_factor + 1e-9);
            assert!(pair[1].min_rpe >= pair[0].min_rpe);
            assert!(pair[1].max_rpe >= pair[0].max_rpe);
        }
    }

    #[test]
    fn test_personalize_returns_seven_zones() {
        let zones = personalize_zones(190, dec!(5.0));
        assert_eq!(zones.len(), 7);
        assert_eq!(zones[0].name, "Recovery");
        assert_eq!(zones[6].name, "Neuromuscular");
    }

    #[test]
    fn test_personalized_hr_bands() {
        let zones = personalize_zones(190, dec!(5.0));
        // Easy zone for max HR 190: 60-70% -> 114-133 bpm
        assert_eq!(zones[1].min_hr, 114);
        assert_eq!(zones[1].max_hr, 133);
        assert_eq!(zones[6].max_hr, 190);
    }

    #[test]
    fn test_personalized_pace_bands() {
        let zones = personalize_zones(190, dec!(5.0));
        // Threshold zone straddles the threshold pace
        assert_eq!(zones[4].fast_pace, dec!(4.85));
        assert_eq!(zones[4].slow_pace, dec!(5.10));
        // Recovery is the slowest band
        assert_eq!(zones[0].slow_pace, dec!(7.50));
    }

    #[test]
    fn test_pace_bands_monotonically_faster() {
        let zones = personalize_zones(185, dec!(4.5));
        for pair in zones.windows(2) {
            assert!(pair[1].fast_pace < pair[0].fast_pace);
            assert!(pair[1].slow_pace < pair[0].slow_pace);
        }
    }

    #[test]
    fn test_zone_for_intensity_breakpoints() {
        assert_eq!(zone_for_intensity(45.0).name, "Recovery");
        assert_eq!(zone_for_intensity(65.0).name, "Easy");
        assert_eq!(zone_for_intensity(70.0).name, "Steady");
        assert_eq!(zone_for_intensity(85.0).name, "Tempo");
        assert_eq!(zone_for_intensity(87.0).name, "Threshold");
        assert_eq!(zone_for_intensity(95.0).name, "VO2max");
        assert_eq!(zone_for_intensity(97.0).name, "Neuromuscular");
        assert_eq!(zone_for_intensity(105.0).name, "Neuromuscular");
    }
}
