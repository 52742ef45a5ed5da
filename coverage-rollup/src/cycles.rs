use crate::model::Project;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

/// Determine dependency cycles between the packages of an aggregated project.
///
/// Edges follow each package's merged efferent set. Packages listed in
/// `skipped` were not aggregated in this run, so their efference may be stale;
/// they take no part in the graph, either as source or as target. Targets
/// outside the project are ignored as well. Internally uses Tarjan's strongly
/// connected components algorithm. Every cycle is sorted by package name and
/// the list of cycles is sorted too.
pub fn dependency_cycles(project: &Project, skipped: &[String]) -> Vec<Vec<String>> {
    let known: HashSet<&str> = project
        .packages
        .iter()
        .map(|p| p.name.as_str())
        .filter(|name| !skipped.iter().any(|s| s == name))
        .collect();

    // Ordered maps keep the traversal deterministic
    let mut graph: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for package in &project.packages {
        if !known.contains(package.name.as_str()) {
            continue;
        }
        let targets: BTreeSet<String> = package
            .efference
            .iter()
            .filter(|e| known.contains(e.package.as_str()))
            .map(|e| e.package.clone())
            .collect();
        graph
            .entry(package.name.clone())
            .or_default()
            .extend(targets);
    }

    struct Tarjan<'a> {
        graph: &'a BTreeMap<String, Vec<String>>,
        index: usize,
        stack: Vec<&'a str>,
        indices: HashMap<&'a str, usize>,
        lowlink: HashMap<&'a str, usize>,
        on_stack: HashSet<&'a str>,
        result: Vec<Vec<String>>,
    }

    impl<'a> Tarjan<'a> {
        fn strongconnect(&mut self, v: &'a str) {
            self.indices.insert(v, self.index);
            self.lowlink.insert(v, self.index);
            self.index += 1;
            self.stack.push(v);
            self.on_stack.insert(v);

            let graph = self.graph;
            if let Some(neigh) = graph.get(v) {
                for w in neigh {
                    let w = w.as_str();
                    if !self.indices.contains_key(w) {
                        self.strongconnect(w);
                        let lw = self.lowlink[w];
                        if lw < self.lowlink[v] {
                            self.lowlink.insert(v, lw);
                        }
                    } else if self.on_stack.contains(w) {
                        let iw = self.indices[w];
                        if iw < self.lowlink[v] {
                            self.lowlink.insert(v, iw);
                        }
                    }
                }
            }

            if self.indices.get(v) == self.lowlink.get(v) {
                let mut scc = Vec::new();
                while let Some(w) = self.stack.pop() {
                    self.on_stack.remove(w);
                    scc.push(w.to_string());
                    if w == v {
                        break;
                    }
                }
                let self_loop = graph
                    .get(v)
                    .is_some_and(|targets| targets.iter().any(|t| t == v));
                if scc.len() > 1 || self_loop {
                    scc.sort();
                    self.result.push(scc);
                }
            }
        }
    }

    let mut tarjan = Tarjan {
        graph: &graph,
        index: 0,
        stack: Vec::new(),
        indices: HashMap::new(),
        lowlink: HashMap::new(),
        on_stack: HashSet::new(),
        result: Vec::new(),
    };
    for v in graph.keys() {
        if !tarjan.indices.contains_key(v.as_str()) {
            tarjan.strongconnect(v);
        }
    }

    let mut cycles = tarjan.result;
    cycles.sort();
    cycles
}
