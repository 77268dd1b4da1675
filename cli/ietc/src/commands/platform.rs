//! `ietc platform`: platform listing and description.

use std::path::Path;

use anyhow::{bail, Context, Result};
use iet_targets::{
    builtin_platforms, discover_platforms, load_platform_toml, platform_to_toml,
    resolve_platform, validate_platform, Platform,
};

/// Resolve a platform by name: built-ins first, then
/// `platforms/<name>.platform.toml` under `project_dir`.
pub fn find_platform(name: &str, project_dir: &Path) -> Result<Platform> {
    if let Some(p) = resolve_platform(name) {
        return Ok(p);
    }
    let discovered = discover_platforms(project_dir)
        .with_context(|| format!("scanning {}", project_dir.join("platforms").display()))?;
    match discovered.into_iter().find(|(n, _)| n == name) {
        Some((_, path)) => load_checked(&path),
        None => bail!("unknown platform: '{name}'. Use 'ietc platform list' to see available platforms."),
    }
}

/// Load a platform file and reject it if validation reports errors.
/// Warnings are printed and otherwise ignored.
pub fn load_checked(path: &Path) -> Result<Platform> {
    let platform =
        load_platform_toml(path).with_context(|| format!("loading {}", path.display()))?;
    if let Err(issues) = validate_platform(&platform) {
        let mut errors = 0;
        for issue in &issues {
            eprintln!("{}: {}: {}", issue.severity, path.display(), issue.message);
            if issue.severity == "error" {
                errors += 1;
            }
        }
        if errors > 0 {
            bail!("{} is not a valid platform definition ({errors} error(s))", path.display());
        }
    }
    Ok(platform)
}

/// List built-in and project-defined platforms.
pub fn list(project_dir: &Path) -> Result<()> {
    println!("Built-in platforms:");
    println!();
    for (name, description) in builtin_platforms() {
        println!("  {name:<12} {description}");
    }

    let custom = discover_platforms(project_dir)?;
    if !custom.is_empty() {
        println!();
        println!("Project platforms:");
        println!();
        for (name, path) in custom {
            println!("  {name:<12} {}", path.display());
        }
    }
    println!();
    println!("Use 'ietc platform describe <name>' for details.");
    Ok(())
}

/// Describe a platform.
pub fn describe(name: &str, project_dir: &Path, format: Option<&str>) -> Result<()> {
    let platform = find_platform(name, project_dir)?;
    match format {
        Some("toml") => print!("{}", platform_to_toml(&platform)?),
        Some(other) => bail!("unknown format '{other}' (expected 'toml')"),
        None => print!("{}", render(&platform)),
    }
    Ok(())
}

fn render(p: &Platform) -> String {
    let mut out = format!("=== Platform: {} ===\n", p.name);
    out.push_str(&format!("  Class:       {}\n", p.class));
    out.push_str(&format!("  ISA:         {:?}\n", p.isa));
    out.push_str(&format!(
        "  Cores:       {} ({} logical)\n",
        p.cores_physical,
        p.cores_logical()
    ));
    out.push_str(&format!("  SIMD width:  {} bytes\n", p.simd_reg_bytes));
    out.push_str(&format!("  Block levels: {}\n", p.default_block_levels));
    out
}
