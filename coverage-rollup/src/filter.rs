//! Deciding which packages take part in aggregation.
use serde::{Deserialize, Serialize};

/// Predicate consulted once per package before it is aggregated.
pub trait InclusionFilter {
    fn included(&self, package: &str) -> bool;
}

impl<F> InclusionFilter for F
where
    F: Fn(&str) -> bool,
{
    fn included(&self, package: &str) -> bool {
        self(package)
    }
}

/// Accepts every package.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncludeAll;

impl InclusionFilter for IncludeAll {
    fn included(&self, _package: &str) -> bool {
        true
    }
}

/// Include/exclude lists of package name patterns.
///
/// A pattern matches a package of the same name and every package nested
/// below it (`com.acme` matches `com.acme.io`, not `com.acmeio`). A trailing
/// `*` matches any name starting with the text before it. An empty include
/// list includes everything not excluded.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PatternFilter {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl PatternFilter {
    pub fn new(include: Vec<String>, exclude: Vec<String>) -> Self {
        Self { include, exclude }
    }
}

fn matches(pattern: &str, package: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        return package.starts_with(prefix);
    }
    package == pattern
        || package
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with('.'))
}

impl InclusionFilter for PatternFilter {
    fn included(&self, package: &str) -> bool {
        let included =
            self.include.is_empty() || self.include.iter().any(|p| matches(p, package));
        included && !self.exclude.iter().any(|p| matches(p, package))
    }
}
