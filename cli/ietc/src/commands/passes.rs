//! `ietc passes`: list the reference backend's passes.

use anyhow::Result;
use iet_lower::backend::cpu_pass_library;

/// Print every pass identifier usable with `--passes`.
pub fn list() -> Result<()> {
    println!("Passes (reference CPU backend):");
    println!();
    for name in pass_names() {
        println!("  {name}");
    }
    println!();
    println!("Use 'ietc lower --passes a,b,c' to run an explicit sequence.");
    Ok(())
}

fn pass_names() -> Vec<String> {
    cpu_pass_library()
        .names()
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_cpu_passes() {
        let names = pass_names();
        assert!(names.iter().any(|n| n == "simd"));
        assert!(names.iter().any(|n| n == "openmp-nested"));
        assert!(list().is_ok());
    }
}
