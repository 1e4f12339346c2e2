//! Resource tiers and the fixed limit table.

use serde::{Deserialize, Serialize};

/// Priority bucket controlling a process's resource limits.
///
/// Variants are declared from highest to lowest priority, so the derived
/// ordering puts `Critical` first.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    /// Highest priority; system processes are pinned here.
    Critical,
    /// Default tier for new processes.
    #[default]
    Standard,
    /// Lowest priority.
    BestEffort,
}

impl Tier {
    /// All tiers, highest priority first.
    pub const ALL: [Self; 3] = [Self::Critical, Self::Standard, Self::BestEffort];

    /// Wire name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::Standard => "STANDARD",
            Self::BestEffort => "BEST_EFFORT",
        }
    }

    /// The tier one step below, if any.
    #[must_use]
    pub const fn lower(self) -> Option<Self> {
        match self {
            Self::Critical => Some(Self::Standard),
            Self::Standard => Some(Self::BestEffort),
            Self::BestEffort => None,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a managed process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
    /// Process is running.
    Running,
    /// Process is alive but idle.
    Idle,
    /// Process was terminated; never observed in the registry at rest.
    Terminated,
}

impl ProcessState {
    /// All states in declaration order.
    pub const ALL: [Self; 3] = [Self::Running, Self::Idle, Self::Terminated];

    /// Wire name of the state.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "RUNNING",
            Self::Idle => "IDLE",
            Self::Terminated => "TERMINATED",
        }
    }
}

/// Concrete resource limits derived from a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLimits {
    /// CPU controller share.
    pub cpu_share_percent: u32,
    /// Memory controller limit.
    pub memory_limit_mb: u64,
    /// Open file descriptor ceiling.
    pub max_file_descriptors: u32,
    /// Process/thread count ceiling.
    pub max_processes: u32,
    /// I/O controller weight.
    pub io_weight: u32,
}

const CRITICAL_LIMITS: ResourceLimits = ResourceLimits {
    cpu_share_percent: 80,
    memory_limit_mb: 8192,
    max_file_descriptors: 65535,
    max_processes: 4096,
    io_weight: 1000,
};

const STANDARD_LIMITS: ResourceLimits = ResourceLimits {
    cpu_share_percent: 50,
    memory_limit_mb: 2048,
    max_file_descriptors: 8192,
    max_processes: 1024,
    io_weight: 500,
};

const BEST_EFFORT_LIMITS: ResourceLimits = ResourceLimits {
    cpu_share_percent: 20,
    memory_limit_mb: 512,
    max_file_descriptors: 1024,
    max_processes: 256,
    io_weight: 100,
};

/// Look up the limits for `tier`, doubling memory for database processes.
#[must_use]
pub const fn lookup(tier: Tier, is_database: bool) -> ResourceLimits {
    let mut limits = match tier {
        Tier::Critical => CRITICAL_LIMITS,
        Tier::Standard => STANDARD_LIMITS,
        Tier::BestEffort => BEST_EFFORT_LIMITS,
    };
    if is_database {
        limits.memory_limit_mb *= 2;
    }
    limits
}
