//! `ietc lower`: specialize an IET for one platform.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use iet_core::{iet_to_json, load_iet_json};
use iet_lower::{
    default_registry, load_config, Configuration, Lowerer, ModeRequest, OptionOverrides,
};
use iet_targets::Platform;

use crate::commands::platform::{find_platform, load_checked};

/// Configuration file picked up from the working directory.
const DEFAULT_CONFIG: &str = "iet.toml";

/// Arguments of `ietc lower`.
#[derive(Debug, Default)]
pub struct LowerArgs {
    pub input: PathBuf,
    pub platform: Option<String>,
    pub platform_file: Option<PathBuf>,
    pub mode: Option<String>,
    pub passes: Option<String>,
    pub options: Vec<String>,
    pub config: Option<PathBuf>,
    pub profiling: Option<String>,
    pub output: Option<PathBuf>,
}

/// Run the lowering and write the result.
pub fn run(project_dir: &Path, args: &LowerArgs) -> Result<()> {
    let json = lower_to_json(project_dir, args)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("writing {}", path.display()))?
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Lower the input and return the resulting IET as JSON.
pub fn lower_to_json(project_dir: &Path, args: &LowerArgs) -> Result<String> {
    let config = load_configuration(project_dir, args)?;
    let platform = select_platform(project_dir, args, &config)?;

    let iet = load_iet_json(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    let mut overrides = OptionOverrides::new();
    for assignment in &args.options {
        overrides.insert_assignment(assignment)?;
    }

    let request = mode_request(args);
    let registry = default_registry().context("initializing backends")?;
    let lowerer = Lowerer::new(&registry, config);
    let out = lowerer
        .lower(iet, &platform, request.as_ref(), &overrides)
        .with_context(|| format!("lowering {} for {}", args.input.display(), platform.name))?;

    for ignored in &out.ignored {
        eprintln!("warning: ignored unsupported option '{}'", ignored.key);
    }

    Ok(iet_to_json(out.graph.root())?)
}

/// Explicit file, else `iet.toml` in the project directory, else defaults;
/// then the environment, then command-line flags.
fn load_configuration(project_dir: &Path, args: &LowerArgs) -> Result<Configuration> {
    let path = args
        .config
        .clone()
        .or_else(|| Some(project_dir.join(DEFAULT_CONFIG)).filter(|p| p.is_file()));
    let mut config = match path {
        Some(path) => load_config(&path).with_context(|| format!("loading {}", path.display()))?,
        None => Configuration::default(),
    };
    config.apply_env(std::env::vars())?;
    if let Some(level) = &args.profiling {
        config.profiling = level.parse()?;
    }
    Ok(config)
}

fn select_platform(project_dir: &Path, args: &LowerArgs, config: &Configuration) -> Result<Platform> {
    if let Some(path) = &args.platform_file {
        return load_checked(path);
    }
    let name = args.platform.as_deref().unwrap_or(&config.platform);
    find_platform(name, project_dir)
}

fn mode_request(args: &LowerArgs) -> Option<ModeRequest> {
    if let Some(passes) = &args.passes {
        let sequence = passes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();
        return Some(ModeRequest::Passes(sequence));
    }
    args.mode.as_deref().map(ModeRequest::from)
}
