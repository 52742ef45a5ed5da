//! Roll up line coverage, complexity and package coupling metrics over a
//! project → package → class → method tree.

mod aggregate;
mod cycles;
mod filter;
mod metrics;
mod model;
mod store;
mod utils;
pub use utils::{error_with_location, LocatedError};

pub use model::{Afferent, Class, Efferent, Line, Method, Package, Project};

pub use aggregate::{
    aggregate_class, aggregate_method, aggregate_package, distance_from_main_sequence,
    run_keyed, AggregateError, Aggregator, MethodFailure, MethodFault, RunError, RunReport,
};

pub use filter::{IncludeAll, InclusionFilter, PatternFilter};

pub use metrics::{
    evaluate_package, evaluate_package_with, AbstractionEval, AbstractionThresholds, Config,
    CoverageEval, CoverageThresholds, DistanceEval, DistanceThresholds, Evaluation,
    EvaluationThresholds, StabilityEval, StabilityThresholds,
};

pub use store::{load_snapshot, DirStore, ProjectStore, RootKey, StoreError};

pub use cycles::dependency_cycles;
