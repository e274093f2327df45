use std::fmt;

use crate::foundation::error::RunpaceResult;

/// Identifier of the all-cores aggregate instance.
pub const TOTAL_INSTANCE: &str = "_Total";

/// CPU counter instance: the all-cores aggregate or one named core.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CpuInstance {
    /// All cores combined.
    #[default]
    Total,
    /// A single core, by the identifier the counter source enumerates (usually numeric).
    Core(String),
}

impl CpuInstance {
    /// Parse an instance identifier. `_Total`, `total` and the empty string denote the aggregate.
    pub fn parse(id: &str) -> Self {
        let id = id.trim();
        if id.is_empty() || id.eq_ignore_ascii_case(TOTAL_INSTANCE) || id.eq_ignore_ascii_case("total")
        {
            Self::Total
        } else {
            Self::Core(id.to_string())
        }
    }

    /// Whether this is the all-cores aggregate.
    pub fn is_total(&self) -> bool {
        matches!(self, Self::Total)
    }

    /// Identifier as understood by counter sources (`_Total` for the aggregate).
    pub fn id(&self) -> &str {
        match self {
            Self::Total => TOTAL_INSTANCE,
            Self::Core(id) => id,
        }
    }

    /// Label for selection menus: `Total CPU` or `CPU<id>`.
    pub fn display_name(&self) -> String {
        match self {
            Self::Total => "Total CPU".to_string(),
            Self::Core(id) => format!("CPU{id}"),
        }
    }

    /// Numeric core index, when the identifier is numeric.
    pub fn core_index(&self) -> Option<u32> {
        match self {
            Self::Total => None,
            Self::Core(id) => id.parse().ok(),
        }
    }
}

impl fmt::Display for CpuInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl From<&str> for CpuInstance {
    fn from(id: &str) -> Self {
        Self::parse(id)
    }
}

/// Unclamped percentages as reported by a counter source for one reading interval.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RawLoad {
    /// User-mode share.
    pub user: f32,
    /// Kernel-mode share.
    pub kernel: f32,
    /// Idle share.
    pub idle: f32,
}

/// An open set of counters for one [`CpuInstance`].
///
/// Dropping the value releases the underlying counters.
pub trait CpuCounters: Send {
    /// Read the load accumulated since the previous read.
    fn read(&mut self) -> RunpaceResult<RawLoad>;
}

/// Platform counter subsystem.
pub trait CounterProvider: Send + Sync {
    /// Open counters for `instance`. The first reading is expected to be consumed here.
    fn open(&self, instance: &CpuInstance) -> RunpaceResult<Box<dyn CpuCounters>>;

    /// Enumerate per-core instance identifiers in source order. May include the aggregate.
    fn instances(&self) -> RunpaceResult<Vec<String>>;
}

/// Enumerate selectable instances: the aggregate first, then cores with numeric identifiers in
/// ascending numeric order, then non-numeric identifiers in enumeration order.
///
/// Enumeration failure yields just the aggregate.
pub fn list_available_instances(provider: &dyn CounterProvider) -> Vec<CpuInstance> {
    let mut out = vec![CpuInstance::Total];
    let ids = match provider.instances() {
        Ok(ids) => ids,
        Err(err) => {
            tracing::warn!(error = %err, "cpu instance enumeration failed");
            return out;
        }
    };

    let mut cores: Vec<CpuInstance> = ids
        .iter()
        .map(|id| CpuInstance::parse(id))
        .filter(|inst| !inst.is_total())
        .collect();
    cores.sort_by_key(|inst| inst.core_index().unwrap_or(u32::MAX));
    cores.dedup();
    out.extend(cores);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/metrics/counters.rs"]
mod tests;
