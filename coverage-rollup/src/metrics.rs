use crate::filter::PatternFilter;
use crate::model::Package;
use serde::{Deserialize, Serialize};

/// Qualitative labels for abstractness.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AbstractionEval {
    Abstract,
    Mixed,
    Concrete,
}

/// Qualitative labels for stability.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StabilityEval {
    Stable,
    Moderate,
    Unstable,
}

/// Qualitative labels for distance from the main sequence.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DistanceEval {
    Good,
    Balanced,
    Painful,
    Useless,
}

/// Qualitative labels for line coverage.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoverageEval {
    High,
    Medium,
    Low,
}

/// Labels evaluating package metrics.
#[derive(Debug, Serialize, Clone)]
pub struct Evaluation {
    pub abstractness: AbstractionEval,
    pub stability: StabilityEval,
    pub distance: DistanceEval,
    pub coverage: CoverageEval,
}

/// Threshold values used when evaluating metrics.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EvaluationThresholds {
    #[serde(default)]
    pub abstraction: AbstractionThresholds,
    #[serde(default)]
    pub stability: StabilityThresholds,
    #[serde(default)]
    pub distance: DistanceThresholds,
    #[serde(default)]
    pub coverage: CoverageThresholds,
}

/// Root structure for configuration files.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub evaluation: EvaluationThresholds,
    /// Package name patterns deciding which packages are aggregated.
    #[serde(default)]
    pub filter: PatternFilter,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AbstractionThresholds {
    #[serde(default = "default_abstract_min")]
    pub abstract_min: f64,
    #[serde(default = "default_concrete_max")]
    pub concrete_max: f64,
}

fn default_abstract_min() -> f64 {
    0.7
}

fn default_concrete_max() -> f64 {
    0.3
}

impl Default for AbstractionThresholds {
    fn default() -> Self {
        Self {
            abstract_min: default_abstract_min(),
            concrete_max: default_concrete_max(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StabilityThresholds {
    #[serde(default = "default_unstable_min")]
    pub unstable_min: f64,
    #[serde(default = "default_stable_max")]
    pub stable_max: f64,
}

fn default_unstable_min() -> f64 {
    0.7
}

fn default_stable_max() -> f64 {
    0.3
}

impl Default for StabilityThresholds {
    fn default() -> Self {
        Self {
            unstable_min: default_unstable_min(),
            stable_max: default_stable_max(),
        }
    }
}

/// Bounds on the normalized distance `|A + I - 1|`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DistanceThresholds {
    #[serde(default = "default_good_max")]
    pub good_max: f64,
    #[serde(default = "default_bad_min")]
    pub bad_min: f64,
}

fn default_good_max() -> f64 {
    0.4
}

fn default_bad_min() -> f64 {
    0.6
}

impl Default for DistanceThresholds {
    fn default() -> Self {
        Self {
            good_max: default_good_max(),
            bad_min: default_bad_min(),
        }
    }
}

/// Coverage percentages.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CoverageThresholds {
    #[serde(default = "default_high_min")]
    pub high_min: f64,
    #[serde(default = "default_low_max")]
    pub low_max: f64,
}

fn default_high_min() -> f64 {
    80.0
}

fn default_low_max() -> f64 {
    50.0
}

impl Default for CoverageThresholds {
    fn default() -> Self {
        Self {
            high_min: default_high_min(),
            low_max: default_low_max(),
        }
    }
}

/// Assign qualitative labels to an aggregated package.
///
/// Thresholds loosely follow the metrics described in Robert C. Martin's *Agile Software Development*.
pub fn evaluate_package(p: &Package) -> Evaluation {
    evaluate_package_with(p, &EvaluationThresholds::default())
}

/// Assign qualitative labels to an aggregated package using custom thresholds.
pub fn evaluate_package_with(p: &Package, t: &EvaluationThresholds) -> Evaluation {
    let a_label = if p.abstractness >= t.abstraction.abstract_min {
        AbstractionEval::Abstract
    } else if p.abstractness <= t.abstraction.concrete_max {
        AbstractionEval::Concrete
    } else {
        AbstractionEval::Mixed
    };

    let i_label = if p.stability >= t.stability.unstable_min {
        StabilityEval::Unstable
    } else if p.stability <= t.stability.stable_max {
        StabilityEval::Stable
    } else {
        StabilityEval::Moderate
    };

    let normalized = p.distance * 2f64.sqrt();
    let d_label = if normalized <= t.distance.good_max {
        DistanceEval::Good
    } else if normalized >= t.distance.bad_min {
        if p.abstractness + p.stability - 1.0 >= 0.0 {
            DistanceEval::Useless
        } else {
            DistanceEval::Painful
        }
    } else {
        DistanceEval::Balanced
    };

    let c_label = if p.coverage >= t.coverage.high_min {
        CoverageEval::High
    } else if p.coverage <= t.coverage.low_max {
        CoverageEval::Low
    } else {
        CoverageEval::Medium
    };

    Evaluation {
        abstractness: a_label,
        stability: i_label,
        distance: d_label,
        coverage: c_label,
    }
}
