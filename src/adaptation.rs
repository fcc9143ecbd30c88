//! Adaptive plan modification
//!
//! Evaluates how an athlete is responding to a plan and proposes
//! modifications. Each evaluation is a pure function of the plan context,
//! progress data, and optional recovery metrics plus the athlete's
//! accumulated pattern history; the history store is the only mutable
//! state and is injected rather than held internally.
//!
//! The decision logic is a rule table evaluated in fixed priority order.
//! Several rules may fire on one evaluation; the output is ordered by
//! priority but never deduplicated by type.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::config::AdaptationConfig;
use crate::models::{PlanContext, PlannedSession, RecoveryMetrics, SessionRecord};

/// Direction of recent performance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTrend {
    Improving,
    Stable,
    Declining,
}

/// How the athlete is tracking against the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressData {
    /// Completed over planned sessions, percent, capped at 100
    pub adherence_rate: f64,

    pub performance_trend: PerformanceTrend,

    /// The completed sessions the trend was inferred from
    pub completed_workouts: Vec<SessionRecord>,
}

/// Pace change (percent) beyond which the trend is not stable
const TREND_PACE_THRESHOLD_PCT: f64 = 2.0;

/// Fewest completed sessions needed to infer a trend
const TREND_MIN_SESSIONS: usize = 4;

/// Build progress data from a (completed, planned) session pairing.
///
/// The trend compares average pace over the first half of the completed
/// sessions to the second half; fewer than four paced sessions reads as
/// stable. An empty plan counts as full adherence.
pub fn analyze_progress(
    completed: &[SessionRecord],
    planned: &[PlannedSession],
) -> ProgressData {
    let adherence_rate = if planned.is_empty() {
        100.0
    } else {
        (completed.len() as f64 / planned.len() as f64 * 100.0).min(100.0)
    };

    ProgressData {
        adherence_rate,
        performance_trend: pace_trend(completed),
        completed_workouts: completed.to_vec(),
    }
}

fn pace_trend(completed: &[SessionRecord]) -> PerformanceTrend {
    let paces: Vec<f64> = completed
        .iter()
        .filter_map(|s| {
            use rust_decimal::prelude::ToPrimitive;
            s.effective_pace()?.to_f64()
        })
        .collect();

    if paces.len() < TREND_MIN_SESSIONS {
        return PerformanceTrend::Stable;
    }

    let mid = paces.len() / 2;
    let first = paces[..mid].iter().sum::<f64>() / mid as f64;
    let second = paces[mid..].iter().sum::<f64>() / (paces.len() - mid) as f64;
    let change_pct = (second - first) / first * 100.0;

    // Lower pace is faster
    if change_pct < -TREND_PACE_THRESHOLD_PCT {
        PerformanceTrend::Improving
    } else if change_pct > TREND_PACE_THRESHOLD_PCT {
        PerformanceTrend::Declining
    } else {
        PerformanceTrend::Stable
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationType {
    ReduceVolume,
    ReduceIntensity,
    AddRecovery,
    SubstituteWorkout,
    DelayProgression,
    InjuryProtocol,
    PhaseAdjustment,
}

/// Modification urgency; orders high before low
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Concrete adjustment payload, specific to the modification type.
/// Percentages are pre-clamped to the athlete's constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestedChanges {
    VolumeReduction { percent: f64 },
    IntensityReduction { percent: f64 },
    AdditionalRecovery { days: u8 },
    WorkoutSubstitution { replace: String, with: String },
    ProgressionDelay { weeks: u8 },
    RestAndCrossTrain { no_run_days: u8 },
    VolumeIncrease { percent: f64 },
}

/// A proposed plan change. Output-only; the plan layer applies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanModification {
    pub modification_type: ModificationType,
    pub reason: String,
    pub priority: Priority,
    pub suggested_changes: SuggestedChanges,
}

/// One evaluation's outcome, accumulated per athlete across calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptationPattern {
    pub date: NaiveDate,
    pub trend: PerformanceTrend,
    pub recovery_score: Option<f64>,
    pub modifications: Vec<ModificationType>,
}

/// Per-athlete pattern history. Implementations must serialize updates for
/// the same athlete; evaluations for different athletes are independent.
pub trait PatternStore: Send + Sync {
    fn history(&self, athlete_id: &str) -> Vec<AdaptationPattern>;
    fn record(&self, athlete_id: &str, pattern: AdaptationPattern);
}

/// Process-local store backed by a mutex-guarded map
#[derive(Default)]
pub struct InMemoryPatternStore {
    inner: Mutex<HashMap<String, Vec<AdaptationPattern>>>,
}

impl InMemoryPatternStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatternStore for InMemoryPatternStore {
    fn history(&self, athlete_id: &str) -> Vec<AdaptationPattern> {
        match self.inner.lock() {
            Ok(map) => map.get(athlete_id).cloned().unwrap_or_default(),
            Err(poisoned) => {
                warn!("pattern store mutex poisoned; recovering");
                poisoned.into_inner().get(athlete_id).cloned().unwrap_or_default()
            }
        }
    }

    fn record(&self, athlete_id: &str, pattern: AdaptationPattern) {
        let mut map = match self.inner.lock() {
            Ok(map) => map,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.entry(athlete_id.to_string()).or_default().push(pattern);
    }
}

/// The rule table, in evaluation order. Earlier rules handle the more
/// serious conditions; a rule firing never suppresses later rules.
const RULES: &[Rule] = &[
    Rule::InjuryMarkers,
    Rule::Overreach,
    Rule::DecliningPerformance,
    Rule::Plateau,
    Rule::GoodAdaptation,
];

#[derive(Debug, Clone, Copy)]
enum Rule {
    InjuryMarkers,
    Overreach,
    DecliningPerformance,
    Plateau,
    GoodAdaptation,
}

struct Evaluation<'a> {
    plan: &'a PlanContext,
    progress: &'a ProgressData,
    recovery: Option<&'a RecoveryMetrics>,
    history: &'a [AdaptationPattern],
}

pub struct AdaptationEngine {
    config: AdaptationConfig,
    store: Arc<dyn PatternStore>,
}

impl AdaptationEngine {
    pub fn new(config: AdaptationConfig, store: Arc<dyn PatternStore>) -> Self {
        Self { config, store }
    }

    /// Evaluate the athlete's current response and propose modifications,
    /// ordered by priority. Records the evaluation in the pattern history.
    pub fn suggest(
        &self,
        plan: &PlanContext,
        progress: &ProgressData,
        recovery: Option<&RecoveryMetrics>,
        today: NaiveDate,
    ) -> Vec<PlanModification> {
        let history = self.store.history(&plan.athlete_id);
        let eval = Evaluation {
            plan,
            progress,
            recovery,
            history: &history,
        };

        let mut modifications = Vec::new();
        for rule in RULES {
            self.apply_rule(*rule, &eval, &mut modifications);
        }
        modifications.sort_by_key(|m| m.priority);

        self.store.record(
            &plan.athlete_id,
            AdaptationPattern {
                date: today,
                trend: progress.performance_trend,
                recovery_score: recovery.map(|r| r.recovery_score),
                modifications: modifications.iter().map(|m| m.modification_type).collect(),
            },
        );

        debug!(
            athlete = %plan.athlete_id,
            count = modifications.len(),
            "evaluated adaptation rules"
        );
        modifications
    }

    fn apply_rule(&self, rule: Rule, eval: &Evaluation, out: &mut Vec<PlanModification>) {
        match rule {
            Rule::InjuryMarkers => self.injury_markers(eval, out),
            Rule::Overreach => self.overreach(eval, out),
            Rule::DecliningPerformance => self.declining(eval, out),
            Rule::Plateau => self.plateau(eval, out),
            Rule::GoodAdaptation => self.good_adaptation(eval, out),
        }
    }

    fn injury_markers(&self, eval: &Evaluation, out: &mut Vec<PlanModification>) {
        let Some(recovery) = eval.recovery else { return };

        let critical_recovery = recovery.recovery_score < self.config.critical_recovery;
        let critical_soreness = recovery
            .muscle_soreness
            .map(|s| s >= self.config.soreness_critical)
            .unwrap_or(false);

        if critical_recovery || critical_soreness {
            out.push(PlanModification {
                modification_type: ModificationType::InjuryProtocol,
                reason: format!(
                    "Acute injury markers: recovery {:.0}, soreness {}",
                    recovery.recovery_score,
                    recovery
                        .muscle_soreness
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                ),
                priority: Priority::High,
                suggested_changes: SuggestedChanges::RestAndCrossTrain { no_run_days: 3 },
            });
        }
    }

    fn overreach(&self, eval: &Evaluation, out: &mut Vec<PlanModification>) {
        let Some(recovery) = eval.recovery else { return };

        let low_recovery = recovery.recovery_score < self.config.low_recovery;
        let high_soreness = recovery
            .muscle_soreness
            .map(|s| s >= self.config.soreness_high)
            .unwrap_or(false);

        if !(low_recovery || high_soreness) {
            return;
        }

        let constraints = &eval.plan.constraints;
        let cut = self
            .config
            .overreach_volume_cut_pct
            .min(constraints.max_volume_reduction_pct)
            .min(100.0);

        out.push(PlanModification {
            modification_type: ModificationType::ReduceVolume,
            reason: format!(
                "Recovery score {:.0} signals accumulated fatigue",
                recovery.recovery_score
            ),
            priority: Priority::High,
            suggested_changes: SuggestedChanges::VolumeReduction { percent: cut },
        });

        out.push(PlanModification {
            modification_type: ModificationType::AddRecovery,
            reason: "Additional recovery needed before the next quality session".to_string(),
            priority: Priority::High,
            suggested_changes: SuggestedChanges::AdditionalRecovery {
                days: constraints.min_recovery_days.max(1),
            },
        });

        if high_soreness {
            out.push(PlanModification {
                modification_type: ModificationType::ReduceIntensity,
                reason: "High muscle soreness; back off intensity while it resolves"
                    .to_string(),
                priority: Priority::Medium,
                suggested_changes: SuggestedChanges::IntensityReduction {
                    percent: self.config.overreach_intensity_cut_pct.min(100.0),
                },
            });
        }
    }

    fn declining(&self, eval: &Evaluation, out: &mut Vec<PlanModification>) {
        if eval.progress.performance_trend != PerformanceTrend::Declining {
            return;
        }

        // Escalate when the decline has persisted across prior evaluations
        let prior_declines = trailing_trend_count(eval.history, PerformanceTrend::Declining);
        let priority = if prior_declines >= self.config.decline_escalation {
            Priority::High
        } else {
            Priority::Medium
        };

        out.push(PlanModification {
            modification_type: ModificationType::AddRecovery,
            reason: format!(
                "Performance declining across {} evaluation(s)",
                prior_declines + 1
            ),
            priority,
            suggested_changes: SuggestedChanges::AdditionalRecovery {
                days: eval.plan.constraints.min_recovery_days.max(2),
            },
        });
    }

    fn plateau(&self, eval: &Evaluation, out: &mut Vec<PlanModification>) {
        if eval.progress.performance_trend != PerformanceTrend::Stable {
            return;
        }

        let prior_stable = trailing_trend_count(eval.history, PerformanceTrend::Stable);
        if prior_stable < self.config.plateau_evaluations {
            return;
        }

        out.push(PlanModification {
            modification_type: ModificationType::SubstituteWorkout,
            reason: format!(
                "No pace change across {} evaluations; vary the stimulus",
                prior_stable + 1
            ),
            priority: Priority::Medium,
            suggested_changes: SuggestedChanges::WorkoutSubstitution {
                replace: "steady run".to_string(),
                with: "interval session".to_string(),
            },
        });

        out.push(PlanModification {
            modification_type: ModificationType::DelayProgression,
            reason: "Hold the current load until the response improves".to_string(),
            priority: Priority::Low,
            suggested_changes: SuggestedChanges::ProgressionDelay { weeks: 1 },
        });
    }

    fn good_adaptation(&self, eval: &Evaluation, out: &mut Vec<PlanModification>) {
        let recovered = eval
            .recovery
            .map(|r| r.recovery_score >= self.config.low_recovery)
            .unwrap_or(true);

        let adapting = eval.progress.adherence_rate >= self.config.good_adherence
            && eval.progress.performance_trend == PerformanceTrend::Improving
            && recovered;

        if !adapting {
            return;
        }

        // Suggest progressive loading only when the schedule has headroom
        let constraints = &eval.plan.constraints;
        if eval.plan.weekly_hours < constraints.max_weekly_hours {
            let headroom_pct = (constraints.max_weekly_hours - eval.plan.weekly_hours)
                / eval.plan.weekly_hours
                * 100.0;
            out.push(PlanModification {
                modification_type: ModificationType::PhaseAdjustment,
                reason: "Adapting well; ready for progressive loading".to_string(),
                priority: Priority::Low,
                suggested_changes: SuggestedChanges::VolumeIncrease {
                    percent: headroom_pct.min(10.0),
                },
            });
        }
    }
}

/// Consecutive most-recent history entries with the given trend
fn trailing_trend_count(history: &[AdaptationPattern], trend: PerformanceTrend) -> usize {
    history.iter().rev().take_while(|p| p.trend == trend).count()
}
