//! CLI: schema files → (generated source | pointer index | sample instance)
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use indexmap::IndexMap;
use json_schemac::{Backend, GoBackend, Index, RustBackend, Schema};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// compile JSON Schema documents into typed models with required-field validation
#[derive(Parser, Debug)]
#[command(name = "json-schemac", version, about)]
pub struct CommandLineInterface {
    /// raise the log level (-v info, -vv debug, -vvv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// generate types and validation methods
    Generate(GenerateOut),
    /// print the pointer index as JSON
    Index(IndexOut),
    /// print a synthesized sample instance of one node
    Sample(SampleOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more inputs. May be literal paths, quoted glob patterns, or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Lang {
    #[default]
    Rust,
    Go,
}

#[derive(clap::Parser, Debug)]
struct GenerateOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// target language
    #[arg(long, value_enum, default_value_t = Lang::Rust)]
    lang: Lang,

    /// Go package clause (ignored for Rust)
    #[arg(long, default_value = "main")]
    package: String,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct IndexOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct SampleOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// node to synthesize (e.g. '#/definitions/user')
    #[arg(long, short)]
    pointer: String,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    /// Parse every input into its own [`Index`], in argument order.
    fn load_process(
        &self,
        mut apply: impl FnMut(&Path, Index) -> anyhow::Result<()>,
    ) -> anyhow::Result<()> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        for source_path in source_paths {
            let source = read_source(&source_path)?;
            let index = json_schemac::parse(&source)
                .with_context(|| format!("failed to parse schema ({})", source_path.display()))?;
            tracing::info!(path = %source_path.display(), nodes = index.len(), "loaded schema");
            apply(&source_path, index)?;
        }
        Ok(())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Generate(target) => {
                let backend: Box<dyn Backend> = match target.lang {
                    Lang::Rust => Box::new(RustBackend::new()),
                    Lang::Go => Box::new(GoBackend::new(target.package.clone())),
                };
                let mut units = Vec::new();
                target.input_settings.load_process(|path, index| {
                    let model = json_schemac::generate(&index).with_context(|| {
                        format!("failed to generate model ({})", path.display())
                    })?;
                    units.push(backend.package_src(&model));
                    Ok(())
                })?;
                emit(target.out.as_deref(), &units.join("\n"))
            }
            Command::Index(target) => {
                let mut files = IndexMap::<String, serde_json::Value>::new();
                target.input_settings.load_process(|path, index| {
                    let nodes: IndexMap<&str, &Schema> = index.iter().collect();
                    files.insert(path.display().to_string(), serde_json::to_value(nodes)?);
                    Ok(())
                })?;
                emit(target.out.as_deref(), &serde_json::to_string_pretty(&files)?)
            }
            Command::Sample(target) => {
                let mut files = IndexMap::<String, serde_json::Value>::new();
                target.input_settings.load_process(|path, index| {
                    let node = index
                        .lookup(&target.pointer)
                        .with_context(|| format!("no sample for {}", path.display()))?;
                    let value = json_schemac::synthesize(node, &index)
                        .with_context(|| format!("failed to synthesize ({})", path.display()))?;
                    files.insert(path.display().to_string(), value);
                    Ok(())
                })?;
                emit(target.out.as_deref(), &serde_json::to_string_pretty(&files)?)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn read_source(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buffer = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buffer)
            .context("failed to read stdin")?;
        return Ok(buffer);
    }
    std::fs::read(path).with_context(|| format!("failed to read source file ({})", path.display()))
}

fn emit(out: Option<&Path>, src: &str) -> anyhow::Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!(path = %out.display(), bytes = src.len(), "wrote output");
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'['))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                matched_any = true;
                out.push(entry?);
            }
            if !matched_any {
                // Pattern was explicitly a glob but matched nothing -> surface as an error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
