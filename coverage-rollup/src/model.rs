//! Containment tree rolled up by the aggregator.
//!
//! Raw inputs (declared line counts, complexity, line counters, interface
//! flags and per-class dependency sets) are filled in by the instrumentation
//! collaborator. Every other field is derived and written by
//! [`crate::Aggregator`].
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::hash::Hash;

/// Root of the tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub packages: Vec<Package>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            packages: Vec::new(),
        }
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.iter().find(|p| p.name == name)
    }
}

/// A package of classes together with its rolled up metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    pub name: String,
    pub classes: Vec<Class>,
    pub lines: u64,
    pub complexity: f64,
    pub coverage: f64,
    pub interfaces: usize,
    pub implementations: usize,
    pub abstractness: f64,
    pub efferent: usize,
    pub afferent: usize,
    pub stability: f64,
    pub distance: f64,
    /// Packages this package depends on, merged from its classes.
    #[serde(serialize_with = "sorted")]
    pub efference: HashSet<Efferent>,
    /// Packages depending on this package, merged from its classes.
    #[serde(serialize_with = "sorted")]
    pub afference: HashSet<Afferent>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.name == name)
    }
}

/// A class or interface.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Class {
    pub name: String,
    pub interface: bool,
    pub methods: Vec<Method>,
    #[serde(serialize_with = "sorted")]
    pub efferent_packages: HashSet<Efferent>,
    #[serde(serialize_with = "sorted")]
    pub afferent_packages: HashSet<Afferent>,
    pub lines: u64,
    pub complexity: f64,
    pub coverage: f64,
    pub efferent: usize,
    pub afferent: usize,
    pub stability: f64,
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn new_interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            interface: true,
            ..Default::default()
        }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

/// A method with its declared size, complexity and executable lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Method {
    pub name: String,
    /// Declared line count, used as the coverage denominator.
    pub lines: u64,
    pub complexity: f64,
    pub line_data: Vec<Line>,
    pub coverage: f64,
    pub total_executions: u64,
}

impl Method {
    pub fn new(name: impl Into<String>, lines: u64, complexity: f64) -> Self {
        Self {
            name: name.into(),
            lines,
            complexity,
            ..Default::default()
        }
    }

    /// Append an executable line with the given counter.
    pub fn with_line(mut self, number: u32, counter: u64) -> Self {
        self.line_data.push(Line::new(number, counter));
        self
    }
}

/// An executable line. `counter` is `None` when the instrumentation lost
/// the data for this line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    pub number: u32,
    #[serde(default)]
    pub counter: Option<u64>,
}

impl Line {
    pub fn new(number: u32, counter: u64) -> Self {
        Self {
            number,
            counter: Some(counter),
        }
    }
}

/// Outgoing dependency on another package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Efferent {
    pub package: String,
}

impl Efferent {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

/// Incoming dependency from another package.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Afferent {
    pub package: String,
}

impl Afferent {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
        }
    }
}

// Hash sets iterate in arbitrary order; emit them sorted so output is stable.
fn sorted<T, S>(set: &HashSet<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize + Ord + Hash,
    S: Serializer,
{
    let mut items: Vec<&T> = set.iter().collect();
    items.sort();
    serializer.collect_seq(items)
}
