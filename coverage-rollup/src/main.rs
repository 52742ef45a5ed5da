//! CLI entry point for the coverage-rollup tool.
use clap::{Arg, ArgAction, Command};
use coverage_rollup::{
    dependency_cycles, evaluate_package_with, load_snapshot, Aggregator, Class, Config,
    Evaluation, MethodFailure, Package,
};
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};

const METRICS_HELP: &[&str] = &[
    "Metrics:",
    "  coverage    - executed lines / declared lines * 100, weighted by lines",
    "  complexity  - cyclomatic complexity, weighted by lines",
    "  Ce          - efferent coupling: packages this package depends on",
    "  Ca          - afferent coupling: packages depending on this package",
    "  A           - abstractness: interfaces / classes",
    "  I           - stability: Ce / (Ce + Ca)",
    "  D           - distance from main sequence: |A + I - 1| / sqrt(2)",
];

const EVALUATION_HELP: &[&str] = &[
    "Evaluation:",
    "  A        - >=0.7 abstract, <=0.3 concrete, otherwise mixed",
    "  I        - >=0.7 unstable, <=0.3 stable, otherwise moderate",
    "  D        - |A + I - 1| <=0.4 good; >=0.6 useless if A+I-1 >= 0 else painful; otherwise balanced",
    "  coverage - >=80 high, <=50 low, otherwise medium",
];

const CONFIG_TEMPLATE: &str = "# Configuration for coverage-rollup\n\n\
[filter]\n\
# Package name patterns to aggregate (empty means all)\n\
include = []\n\
# Package name patterns to skip\n\
exclude = []\n\
\n\
[evaluation]\n\
  [evaluation.abstraction]\n\
  # Minimum ratio considered abstract\n\
  abstract_min = 0.7\n\
  # Maximum ratio considered concrete\n\
  concrete_max = 0.3\n\
\n\
  [evaluation.stability]\n\
  # Minimum ratio considered unstable\n\
  unstable_min = 0.7\n\
  # Maximum ratio considered stable\n\
  stable_max = 0.3\n\
\n\
  [evaluation.distance]\n\
  # Maximum normalized distance considered good\n\
  good_max = 0.4\n\
  # Minimum normalized distance considered bad\n\
  bad_min = 0.6\n\
\n\
  [evaluation.coverage]\n\
  # Minimum percentage considered high\n\
  high_min = 80.0\n\
  # Maximum percentage considered low\n\
  low_max = 50.0\n";

fn init_config<P: AsRef<Path>>(path: P) -> Result<(), Box<dyn std::error::Error>> {
    let p = path.as_ref();
    if p.exists() {
        eprintln!("{} already exists", p.display());
        return Ok(());
    }
    std::fs::write(p, CONFIG_TEMPLATE)?;
    println!("created {}", p.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    match std::fs::read_to_string(path) {
        Ok(s) => match toml::from_str::<Config>(&s) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("failed to parse config: {}", e);
                Config::default()
            }
        },
        Err(e) => {
            eprintln!("failed to read config: {}", e);
            Config::default()
        }
    }
}

#[derive(Serialize)]
struct PackageEntry<'a> {
    name: &'a str,
    lines: u64,
    complexity: f64,
    coverage: f64,
    interfaces: usize,
    implementations: usize,
    abstractness: f64,
    efferent: usize,
    afferent: usize,
    stability: f64,
    distance: f64,
    efference: Vec<&'a str>,
    afference: Vec<&'a str>,
    evaluation: Evaluation,
    #[serde(skip_serializing_if = "Option::is_none")]
    classes: Option<&'a [Class]>,
}

impl<'a> PackageEntry<'a> {
    fn new(p: &'a Package, evaluation: Evaluation, show_classes: bool) -> Self {
        let mut efference: Vec<&str> = p.efference.iter().map(|e| e.package.as_str()).collect();
        efference.sort();
        let mut afference: Vec<&str> = p.afference.iter().map(|a| a.package.as_str()).collect();
        afference.sort();
        Self {
            name: &p.name,
            lines: p.lines,
            complexity: p.complexity,
            coverage: p.coverage,
            interfaces: p.interfaces,
            implementations: p.implementations,
            abstractness: p.abstractness,
            efferent: p.efferent,
            afferent: p.afferent,
            stability: p.stability,
            distance: p.distance,
            efference,
            afference,
            evaluation,
            classes: show_classes.then_some(p.classes.as_slice()),
        }
    }
}

#[derive(Serialize)]
struct Warnings<'a> {
    dependency_cycles: Vec<Vec<String>>,
    skipped_packages: &'a [String],
    method_faults: &'a [MethodFailure],
}

#[derive(Serialize, Clone)]
struct ToolInfo {
    version: &'static str,
    target: String,
}

#[derive(Serialize, Clone)]
struct Meta {
    #[serde(rename = "coverage-rollup")]
    coverage_rollup: ToolInfo,
    project: String,
    config: Config,
}

#[derive(Serialize)]
struct OutputRoot<'a> {
    meta: Meta,
    packages: Vec<PackageEntry<'a>>,
    warnings: Warnings<'a>,
}

fn emit_results(root: &OutputRoot<'_>, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let out_str = match format {
        "json" => coverage_rollup::loc_try!(serde_json::to_string(root)),
        "yaml" => coverage_rollup::loc_try!(serde_yaml::to_string(root)),
        other => {
            eprintln!("unknown output format: {}", other);
            return Ok(());
        }
    };
    println!("{}", out_str);
    Ok(())
}

// An unparseable gate is reported and then ignored.
fn gate_value(matches: &clap::ArgMatches, name: &str) -> Option<f64> {
    let raw = matches.get_one::<String>(name)?;
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            eprintln!("ignoring invalid --{} value: {}", name, raw);
            None
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_default_env()
        .format_source_path(true)
        .format_line_number(true)
        .init();

    let matches = Command::new("coverage-rollup")
        .version(env!("CARGO_PKG_VERSION"))
        .disable_help_flag(true)
        .subcommand_negates_reqs(true)
        .after_help(format!(
            "{}\n\n{}",
            METRICS_HELP.join("\n"),
            EVALUATION_HELP.join("\n")
        ))
        .subcommand(
            Command::new("init")
                .about("Generate a template config")
                .arg(
                    Arg::new("path")
                        .value_name("PATH")
                        .help("Where to create the config file")
                        .required(false),
                ),
        )
        .arg(
            Arg::new("snapshot")
                .value_name("SNAPSHOT")
                .help("Project snapshot to aggregate (.json, .yaml or .yml)")
                .required(true),
        )
        .arg(
            Arg::new("all")
                .short('a')
                .long("all")
                .help("Include classes and methods in the output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Output format: json or yaml")
                .value_name("FORMAT")
                .default_value("json"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to config file")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("coverage-lt")
                .long("coverage-lt")
                .value_name("VAL")
                .help("Fail if any package coverage < VAL"),
        )
        .arg(
            Arg::new("distance-gt")
                .long("distance-gt")
                .value_name("VAL")
                .help("Fail if any package distance > VAL"),
        )
        .arg(
            Arg::new("fail-on-fault")
                .long("fail-on-fault")
                .help("Fail if any method could not be aggregated")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("help")
                .short('h')
                .action(ArgAction::Help)
                .long("help")
                .visible_short_alias('?')
                .help("Show this help message"),
        )
        .get_matches();

    if let Some(("init", sub_m)) = matches.subcommand() {
        let path = sub_m
            .get_one::<String>("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".rollup.toml"));
        return init_config(path);
    }

    let show_all = matches.get_flag("all");
    let fail_on_fault = matches.get_flag("fail-on-fault");
    let format = matches
        .get_one::<String>("output")
        .map(|s| s.as_str())
        .unwrap_or("json");
    let coverage_lt = gate_value(&matches, "coverage-lt");
    let distance_gt = gate_value(&matches, "distance-gt");

    let config_path: Option<PathBuf> = matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .or_else(|| {
            let default = PathBuf::from(".rollup.toml");
            if default.exists() {
                Some(default)
            } else {
                None
            }
        });
    let config = load_config(config_path.as_deref());

    let snapshot = matches
        .get_one::<String>("snapshot")
        .map(PathBuf::from)
        .ok_or_else(|| coverage_rollup::error_with_location("missing snapshot path"))?;
    let mut project = coverage_rollup::loc_try!(
        load_snapshot(&snapshot),
        "cannot load snapshot {}",
        snapshot.display()
    );
    info!(
        "loaded project {} with {} packages",
        project.name,
        project.packages.len()
    );

    let report = coverage_rollup::loc_try!(
        Aggregator::new(config.filter.clone()).run(&mut project),
        "aggregation of {} aborted",
        project.name
    );
    let cycles = dependency_cycles(&project, &report.skipped_packages);

    let aggregated: Vec<&Package> = project
        .packages
        .iter()
        .filter(|p| !report.skipped_packages.contains(&p.name))
        .collect();

    let mut threshold_failed = fail_on_fault && !report.is_clean();
    for package in &aggregated {
        if let Some(th) = coverage_lt {
            if package.coverage < th {
                threshold_failed = true;
            }
        }
        if let Some(th) = distance_gt {
            if package.distance > th {
                threshold_failed = true;
            }
        }
    }

    let root = OutputRoot {
        meta: Meta {
            coverage_rollup: ToolInfo {
                version: env!("CARGO_PKG_VERSION"),
                target: format!("{}/{}", std::env::consts::OS, std::env::consts::ARCH),
            },
            project: project.name.clone(),
            config: config.clone(),
        },
        packages: aggregated
            .iter()
            .map(|&p| {
                let eval = evaluate_package_with(p, &config.evaluation);
                PackageEntry::new(p, eval, show_all)
            })
            .collect(),
        warnings: Warnings {
            dependency_cycles: cycles,
            skipped_packages: &report.skipped_packages,
            method_faults: &report.method_faults,
        },
    };
    coverage_rollup::loc_try!(emit_results(&root, format));

    if threshold_failed {
        std::process::exit(1);
    }
    Ok(())
}
