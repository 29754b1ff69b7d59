//! Configuration for the VM.

/// Configuration for a [`Vm`](crate::Vm) instance.
///
/// Controls resource limits for one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VmConfig {
    /// Maximum nesting of re-entrant procedure calls. Exceeding it is a
    /// fatal fault instead of a host stack overflow. The default fits a
    /// 2 MiB thread stack in unoptimized builds.
    pub max_call_depth: usize,

    /// Initial capacity of the evaluation stack.
    pub stack_capacity: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            stack_capacity: 256,
        }
    }
}

impl VmConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration for embedding hosts with small thread stacks.
    #[must_use]
    pub fn constrained() -> Self {
        Self {
            max_call_depth: 64,
            stack_capacity: 64,
        }
    }

    /// Builder method to set the call depth limit.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Builder method to set the initial stack capacity.
    #[must_use]
    pub fn with_stack_capacity(mut self, capacity: usize) -> Self {
        self.stack_capacity = capacity;
        self
    }
}
