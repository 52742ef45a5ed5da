//! Bottom-up roll-up of coverage, complexity and coupling metrics.
//!
//! Methods are processed first, then the classes owning them, then the
//! package. Each level only reads values already finalized on the level
//! below, so a single sequential walk of the tree is enough.
use crate::filter::InclusionFilter;
use crate::model::{Class, Method, Package, Project};
use crate::store::{ProjectStore, RootKey, StoreError};
use log::{debug, error, info};
use serde::Serialize;
use std::collections::HashSet;

/// Data fault found while rolling up a single method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
pub enum MethodFault {
    #[error("line {line} has no execution counter")]
    MissingCounter { line: u32 },
    #[error("execution count overflowed at line {line}")]
    ExecutionOverflow { line: u32 },
}

/// A method that could not be aggregated, with the path to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodFailure {
    pub package: String,
    pub class: String,
    pub method: String,
    pub fault: MethodFault,
}

/// Structural problems that invalidate the whole run.
#[derive(Debug, thiserror::Error)]
pub enum AggregateError {
    #[error("method {class}::{method} has non-finite complexity {complexity}")]
    NonFiniteComplexity {
        class: String,
        method: String,
        complexity: f64,
    },
    #[error("line count of {owner} overflows")]
    LineCountOverflow { owner: String },
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
}

/// Outcome of one aggregation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub packages_aggregated: usize,
    pub skipped_packages: Vec<String>,
    pub method_faults: Vec<MethodFailure>,
}

impl RunReport {
    /// `true` when no method faulted.
    pub fn is_clean(&self) -> bool {
        self.method_faults.is_empty()
    }
}

/// Compute executed line count, coverage and total executions of a method.
///
/// Coverage is measured against the declared line count. A method declaring
/// no lines has 0% coverage. On error nothing is written, so the method keeps
/// whatever values it had before.
pub fn aggregate_method(method: &mut Method) -> Result<(), MethodFault> {
    let mut executed = 0u64;
    let mut total = 0u64;
    for line in &method.line_data {
        let counter = line
            .counter
            .ok_or(MethodFault::MissingCounter { line: line.number })?;
        total = total
            .checked_add(counter)
            .ok_or(MethodFault::ExecutionOverflow { line: line.number })?;
        if counter > 0 {
            executed += 1;
        }
    }
    method.coverage = if method.lines > 0 {
        (executed as f64 / method.lines as f64) * 100.0
    } else {
        0.0
    };
    method.total_executions = total;
    Ok(())
}

/// Roll up a class from its already aggregated methods.
///
/// Complexity and coverage are averages weighted by method line count.
/// Methods without lines are left out of the sum entirely.
pub fn aggregate_class(class: &mut Class) -> Result<(), AggregateError> {
    let lines = class
        .methods
        .iter()
        .try_fold(0u64, |acc, m| acc.checked_add(m.lines))
        .ok_or_else(|| AggregateError::LineCountOverflow {
            owner: format!("class {}", class.name),
        })?;
    let mut complexity = 0.0;
    let mut coverage = 0.0;
    if lines > 0 {
        for method in class.methods.iter().filter(|m| m.lines > 0) {
            if !method.complexity.is_finite() {
                return Err(AggregateError::NonFiniteComplexity {
                    class: class.name.clone(),
                    method: method.name.clone(),
                    complexity: method.complexity,
                });
            }
            let weight = method.lines as f64 / lines as f64;
            complexity += method.complexity * weight;
            coverage += method.coverage * weight;
        }
    }

    let efferent = class.efferent_packages.len();
    let afferent = class.afferent_packages.len();

    class.lines = lines;
    class.complexity = complexity;
    class.coverage = coverage;
    class.efferent = efferent;
    class.afferent = afferent;
    class.stability = ratio(efferent, efferent + afferent);
    debug!(
        "class {}: lines={} complexity={:.3} coverage={:.3} Ce={} Ca={} I={:.3}",
        class.name, lines, complexity, coverage, efferent, afferent, class.stability
    );
    Ok(())
}

/// Roll up a package from its already aggregated classes.
///
/// Every class takes part in the weighted sums, including those without
/// lines, which contribute a weight of zero. Nothing is written when the
/// class line counts overflow.
pub fn aggregate_package(package: &mut Package) -> Result<(), AggregateError> {
    let mut interfaces = 0usize;
    let mut implementations = 0usize;
    let mut efference = HashSet::new();
    let mut afference = HashSet::new();
    let mut lines = 0u64;

    for class in &package.classes {
        if class.interface {
            interfaces += 1;
        } else {
            implementations += 1;
        }
        efference.extend(class.efferent_packages.iter().cloned());
        afference.extend(class.afferent_packages.iter().cloned());
        lines = lines
            .checked_add(class.lines)
            .ok_or_else(|| AggregateError::LineCountOverflow {
                owner: format!("package {}", package.name),
            })?;
    }

    let mut complexity = 0.0;
    let mut coverage = 0.0;
    if lines > 0 {
        for class in &package.classes {
            let weight = class.lines as f64 / lines as f64;
            complexity += weight * class.complexity;
            coverage += weight * class.coverage;
        }
    }

    let abstractness = ratio(interfaces, interfaces + implementations);
    let efferent = efference.len();
    let afferent = afference.len();
    let stability = ratio(efferent, efferent + afferent);
    let distance = distance_from_main_sequence(stability, abstractness);

    debug!(
        "package {}: lines={} complexity={:.3} coverage={:.3} Ce={} Ca={} A={:.3} I={:.3} D={:.3}",
        package.name, lines, complexity, coverage, efferent, afferent, abstractness, stability, distance
    );

    package.efference = efference;
    package.afference = afference;
    package.lines = lines;
    package.complexity = complexity;
    package.coverage = coverage;
    package.interfaces = interfaces;
    package.implementations = implementations;
    package.abstractness = abstractness;
    package.efferent = efferent;
    package.afferent = afferent;
    package.stability = stability;
    package.distance = distance;
    Ok(())
}

/// Perpendicular distance of `(stability, abstractness)` from the line
/// `stability + abstractness = 1`.
pub fn distance_from_main_sequence(stability: f64, abstractness: f64) -> f64 {
    let (a, b) = (-1f64, -1f64);
    (a * stability + b * abstractness + 1.0).abs() / (a * a + b * b).sqrt()
}

// Denominator floored at 1 so empty inputs give 0.
fn ratio(part: usize, whole: usize) -> f64 {
    part as f64 / whole.max(1) as f64
}

/// Runs the three passes over every included package of a project.
pub struct Aggregator<F> {
    filter: F,
}

impl<F: InclusionFilter> Aggregator<F> {
    pub fn new(filter: F) -> Self {
        Self { filter }
    }

    /// Aggregate `project` in place.
    ///
    /// Excluded packages are not touched at all. Method faults are logged and
    /// collected in the report while the run carries on; structural errors
    /// abort it.
    pub fn run(&self, project: &mut Project) -> Result<RunReport, AggregateError> {
        info!(
            "aggregating project {} with {} packages",
            project.name,
            project.packages.len()
        );
        let mut report = RunReport::default();
        for package in project.packages.iter_mut() {
            debug!("processing package {}", package.name);
            if !self.filter.included(&package.name) {
                debug!("package {} is excluded", package.name);
                report.skipped_packages.push(package.name.clone());
                continue;
            }
            for class in package.classes.iter_mut() {
                for method in class.methods.iter_mut() {
                    if let Err(fault) = aggregate_method(method) {
                        error!(
                            "failed to aggregate method {}::{}::{}: {}",
                            package.name, class.name, method.name, fault
                        );
                        report.method_faults.push(MethodFailure {
                            package: package.name.clone(),
                            class: class.name.clone(),
                            method: method.name.clone(),
                            fault,
                        });
                    }
                }
                aggregate_class(class)?;
            }
            aggregate_package(package)?;
            report.packages_aggregated += 1;
        }
        info!(
            "aggregated {} packages, skipped {}, {} method faults",
            report.packages_aggregated,
            report.skipped_packages.len(),
            report.method_faults.len()
        );
        Ok(report)
    }
}

/// Load the project stored under `key` and aggregate it.
pub fn run_keyed<S, F>(
    store: &S,
    key: &RootKey,
    filter: F,
) -> Result<(Project, RunReport), RunError>
where
    S: ProjectStore + ?Sized,
    F: InclusionFilter,
{
    let mut project = store.load(key)?;
    let report = Aggregator::new(filter).run(&mut project)?;
    Ok((project, report))
}
