//! Concrete platforms.

use serde::{Deserialize, Serialize};

use crate::class::{classes, PlatformClass};

/// Vector instruction set extension available on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Isa {
    /// Scalar code only.
    Generic,
    Sse,
    Avx,
    Avx2,
    Avx512,
    Neon,
    Altivec,
    /// Offloading device; vectorization is implicit.
    Ptx,
}

/// A target platform: a named piece of hardware plus its class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Platform {
    /// Platform name (e.g., "skx", "power9").
    pub name: String,
    /// Position in the specialization hierarchy.
    pub class: PlatformClass,
    /// Vector extension.
    pub isa: Isa,
    /// Physical core count.
    pub cores_physical: u32,
    /// Hardware threads per core.
    pub threads_per_core: u32,
    /// Width of a SIMD register in bytes (0 if none).
    pub simd_reg_bytes: u32,
    /// Levels of hierarchical blocking applied when the caller does not ask
    /// for a specific number.
    pub default_block_levels: u32,
}

impl Platform {
    /// A single-core scalar platform of the given class; callers adjust the
    /// hardware fields afterwards.
    pub fn new(name: impl Into<String>, class: PlatformClass, isa: Isa) -> Self {
        Self {
            name: name.into(),
            class,
            isa,
            cores_physical: 1,
            threads_per_core: 1,
            simd_reg_bytes: 0,
            default_block_levels: 1,
        }
    }

    /// Logical core count, saturating at `u32::MAX`.
    pub fn cores_logical(&self) -> u32 {
        self.cores_physical.saturating_mul(self.threads_per_core)
    }

    /// Whether the platform is of class `tag` or a specialization of it.
    pub fn is_a(&self, tag: &str) -> bool {
        self.class.is_a(tag)
    }

    /// Generic 64-bit CPU.
    pub fn cpu64() -> Self {
        let mut p = Self::new("cpu64", classes::cpu64(), Isa::Generic);
        p.cores_physical = 4;
        p
    }

    /// Intel Skylake-X.
    pub fn skx() -> Self {
        let mut p = Self::new("skx", classes::intel64_skx(), Isa::Avx512);
        p.cores_physical = 24;
        p.threads_per_core = 2;
        p.simd_reg_bytes = 64;
        p
    }

    /// Intel Knights Landing.
    pub fn knl() -> Self {
        let mut p = Self::new("knl", classes::intel64_knl(), Isa::Avx512);
        p.cores_physical = 68;
        p.threads_per_core = 4;
        p.simd_reg_bytes = 64;
        p.default_block_levels = 2;
        p
    }

    /// Generic AArch64 server part.
    pub fn arm() -> Self {
        let mut p = Self::new("arm", classes::arm(), Isa::Neon);
        p.cores_physical = 64;
        p.simd_reg_bytes = 16;
        p
    }

    /// IBM POWER9.
    pub fn power9() -> Self {
        let mut p = Self::new("power9", classes::power(), Isa::Altivec);
        p.cores_physical = 22;
        p.threads_per_core = 4;
        p.simd_reg_bytes = 16;
        p
    }

    /// Generic NVIDIA GPU.
    pub fn nvidia_x() -> Self {
        let mut p = Self::new("nvidiaX", classes::nvidia(), Isa::Ptx);
        p.cores_physical = 80;
        p
    }
}
