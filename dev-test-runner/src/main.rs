//! Runs every fixture schema through parse → generate → render → synthesize
//! and checks the outcomes against `fixtures/manifest.json`.
//!
//! Usage: `cargo run -p dev-test-runner [FIXTURE_DIR]`
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use json_schemac::{Backend, GoBackend, RustBackend, SchemaError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Manifest {
    fixtures: Vec<Expectation>,
}

#[derive(Debug, Deserialize)]
struct Expectation {
    file: String,
    /// `"ok"` or an error code
    #[serde(default = "ok")]
    generate: String,
    /// generated type names, in model order
    #[serde(default)]
    types: Vec<String>,
    /// pointer → `"ok"` or an error code
    #[serde(default)]
    samples: BTreeMap<String, String>,
}

fn ok() -> String {
    "ok".to_string()
}

fn outcome<T>(result: &Result<T, SchemaError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(error) => error.code(),
    }
}

fn check(expectation: &Expectation, dir: &Path) -> anyhow::Result<Vec<String>> {
    let path = dir.join(&expectation.file);
    let source = std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let index = json_schemac::parse(&source)?;
    let mut failures = Vec::new();

    let model = json_schemac::generate(&index);
    let got = outcome(&model);
    if got != expectation.generate {
        failures.push(format!("generate: expected {}, got {got}", expectation.generate));
    }
    if let Ok(model) = &model {
        let names: Vec<&str> = model.types.iter().map(|(_, t)| t.name()).collect();
        if names != expectation.types {
            failures.push(format!("types: expected {:?}, got {names:?}", expectation.types));
        }
        let rust = RustBackend::new().package_src(model);
        let go = GoBackend::default().package_src(model);
        for name in &names {
            if !rust.contains(&format!("pub struct {name}")) {
                failures.push(format!("rust: missing type {name}"));
            }
            if !go.contains(&format!("type {name} ")) {
                failures.push(format!("go: missing type {name}"));
            }
        }
    }

    for (pointer, expected) in &expectation.samples {
        let sample = index
            .lookup(pointer)
            .and_then(|node| json_schemac::synthesize(node, &index));
        let got = outcome(&sample);
        if got != expected.as_str() {
            failures.push(format!("sample {pointer}: expected {expected}, got {got}"));
        }
    }
    Ok(failures)
}

fn run(dir: &Path) -> anyhow::Result<bool> {
    let manifest_path = dir.join("manifest.json");
    let manifest_src = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let de = &mut serde_json::Deserializer::from_str(&manifest_src);
    let manifest: Manifest = serde_path_to_error::deserialize(de)
        .map_err(|error| anyhow::anyhow!("invalid manifest at {}: {}", error.path(), error.inner()))?;

    let pattern = dir.join("*.json");
    let on_disk: Vec<PathBuf> = glob::glob(&pattern.to_string_lossy())?
        .collect::<Result<_, _>>()?;
    let mut all_passed = true;
    for path in &on_disk {
        let Some(file) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        if file != "manifest.json" && !manifest.fixtures.iter().any(|e| e.file == file) {
            eprintln!("{} {file}: not listed in manifest", "skip".yellow());
        }
    }

    for expectation in &manifest.fixtures {
        match check(expectation, dir) {
            Ok(failures) if failures.is_empty() => {
                eprintln!("{} {}", "pass".green().bold(), expectation.file);
            }
            Ok(failures) => {
                all_passed = false;
                eprintln!("{} {}", "fail".red().bold(), expectation.file);
                for failure in failures {
                    eprintln!("    {failure}");
                }
            }
            Err(error) => {
                all_passed = false;
                eprintln!("{} {}: {error:#}", "error".red().bold(), expectation.file);
            }
        }
    }
    Ok(all_passed)
}

fn main() -> ExitCode {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("fixtures"));
    match run(&dir) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{} {error:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
