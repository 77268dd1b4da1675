//! Built-in platform catalogue.

use crate::platform::Platform;

/// Resolve a built-in platform by name.
pub fn resolve_platform(name: &str) -> Option<Platform> {
    match name {
        "cpu64" => Some(Platform::cpu64()),
        "skx" => Some(Platform::skx()),
        "knl" => Some(Platform::knl()),
        "arm" => Some(Platform::arm()),
        "power9" => Some(Platform::power9()),
        "nvidiaX" => Some(Platform::nvidia_x()),
        _ => None,
    }
}

/// List all built-in platform names with a short description.
pub fn builtin_platforms() -> Vec<(&'static str, &'static str)> {
    vec![
        ("cpu64", "Generic 64-bit CPU (scalar)"),
        ("skx", "Intel Skylake-X (AVX-512, 24 cores)"),
        ("knl", "Intel Knights Landing (AVX-512, 68 cores)"),
        ("arm", "Generic AArch64 (NEON, 64 cores)"),
        ("power9", "IBM POWER9 (AltiVec, 22 cores, SMT4)"),
        ("nvidiaX", "Generic NVIDIA GPU"),
    ]
}
