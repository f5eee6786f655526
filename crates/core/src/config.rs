//! VM resource budgets.
//!
//! Every axis the VM can run away on — operation count, stack depth,
//! SATURATE iterations, binding count — has a knob here. Defaults match
//! the reference implementation's.

use serde::{Deserialize, Serialize};

/// Resource budgets and feature flags for one `Vm::execute` call.
///
/// `Copy` because it is small and read-only for the lifetime of an
/// execution; layering config-file values under CLI flags is the CLI's
/// job, not this type's (see `lmn-cli`'s config loader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct VmConfig {
    pub max_operations: u64,
    pub max_stack_depth: usize,
    pub max_saturate_iterations: u64,
    pub max_bindings: usize,
    pub trace_enabled: bool,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            max_operations: 100_000,
            max_stack_depth: 256,
            max_saturate_iterations: 1_000,
            max_bindings: 1_024,
            trace_enabled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = VmConfig::default();
        assert_eq!(cfg.max_operations, 100_000);
        assert_eq!(cfg.max_stack_depth, 256);
        assert_eq!(cfg.max_saturate_iterations, 1_000);
        assert_eq!(cfg.max_bindings, 1_024);
        assert!(!cfg.trace_enabled);
    }
}
