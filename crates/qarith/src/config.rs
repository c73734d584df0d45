use crate::activation::FusedActivation;

/// Largest operand rank the reference runtime accepts for ADD/SUB.
pub const DEFAULT_MAX_RANK: usize = 4;

/// Configuration for the element-wise kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct KernelConfig {
    /// Operands above this rank fail with `RankMismatchUnsupported`.
    pub max_rank: usize,
    /// Output element count at which the loop switches to rayon workers.
    pub parallel_threshold: usize,
    /// Output elements per parallel work item.
    pub chunk_size: usize,
    /// Fused activation applied before saturation.
    pub activation: FusedActivation,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_rank: DEFAULT_MAX_RANK,
            parallel_threshold: 16 * 1024,
            chunk_size: 4096,
            activation: FusedActivation::None,
        }
    }
}

impl KernelConfig {
    pub fn max_rank(mut self, rank: usize) -> Self {
        self.max_rank = rank;
        self
    }

    pub fn parallel_threshold(mut self, n: usize) -> Self {
        self.parallel_threshold = n;
        self
    }

    pub fn chunk_size(mut self, n: usize) -> Self {
        self.chunk_size = n.max(1);
        self
    }

    pub fn activation(mut self, act: FusedActivation) -> Self {
        self.activation = act;
        self
    }

    /// Never split work across threads.
    pub fn sequential(self) -> Self {
        self.parallel_threshold(usize::MAX)
    }
}

/// Configuration for the conformance fixture generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Seed for the deterministic RNG.
    pub seed: u64,
    /// Fixtures emitted per equivalence class and op.
    pub cases_per_class: usize,
    /// Highest rank of generated operands.
    pub max_rank: usize,
    /// Largest generated dimension size.
    pub max_dim: usize,
    /// Scalar activation operand carried by every generated fixture.
    pub activation_code: i32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0x5eed,
            cases_per_class: 4,
            max_rank: DEFAULT_MAX_RANK,
            max_dim: 4,
            activation_code: FusedActivation::None.code(),
        }
    }
}

impl GeneratorConfig {
    pub fn seed(mut self, s: u64) -> Self {
        self.seed = s;
        self
    }

    pub fn cases_per_class(mut self, n: usize) -> Self {
        self.cases_per_class = n;
        self
    }

    pub fn max_rank(mut self, r: usize) -> Self {
        self.max_rank = r.max(1);
        self
    }

    pub fn max_dim(mut self, d: usize) -> Self {
        self.max_dim = d.max(1);
        self
    }

    pub fn activation_code(mut self, code: i32) -> Self {
        self.activation_code = code;
        self
    }
}
