//! Workload plans.
//!
//! A plan is declared before a run and never mutated during it. Its
//! [`OperationMix`] routes iteration `i` to an operation through a fixed
//! cycle, so ratios hold by construction rather than by chance.

/// Operation issued against the engine in one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Read an existing key
    Get,
    /// Overwrite an existing key with a new value
    Put,
    /// Existence check on an existing key
    Exists,
    /// Delete an existing key
    Delete,
    /// Write a brand-new key
    Insert,
}

const PUT_ONLY_CYCLE: &[Operation] = &[Operation::Put];
const READ_ONLY_CYCLE: &[Operation] = &[Operation::Get];
const MIXED_CYCLE: &[Operation] = &[
    Operation::Get,
    Operation::Put,
    Operation::Exists,
    Operation::Insert,
];

/// Fixed operation ratios of a workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMix {
    /// Every iteration writes
    PutOnly,
    /// Every iteration reads
    ReadOnly,
    /// Get, Put, Exists, Insert at 25% each
    Mixed,
}

impl OperationMix {
    /// The cycle of operations this mix repeats
    pub fn cycle(&self) -> &'static [Operation] {
        match self {
            OperationMix::PutOnly => PUT_ONLY_CYCLE,
            OperationMix::ReadOnly => READ_ONLY_CYCLE,
            OperationMix::Mixed => MIXED_CYCLE,
        }
    }

    /// Operation for iteration `i`
    pub fn op_for(&self, i: u64) -> Operation {
        let cycle = self.cycle();
        cycle[(i % cycle.len() as u64) as usize]
    }

    /// Fraction of iterations routed to `op`
    pub fn ratio(&self, op: Operation) -> f64 {
        let cycle = self.cycle();
        cycle.iter().filter(|o| **o == op).count() as f64 / cycle.len() as f64
    }
}

/// A named benchmark configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadPlan {
    /// Case name, used in benchmark ids and logs
    pub name: &'static str,
    /// Key length in bytes
    pub key_size: usize,
    /// Value length in bytes
    pub value_size: usize,
    /// Number of pre-generated items
    pub item_count: usize,
    /// Operation ratios
    pub mix: OperationMix,
}

impl WorkloadPlan {
    /// Create a put-only plan
    pub const fn new(name: &'static str, key_size: usize, value_size: usize, item_count: usize) -> Self {
        Self {
            name,
            key_size,
            value_size,
            item_count,
            mix: OperationMix::PutOnly,
        }
    }

    /// Set the operation mix
    pub fn with_mix(mut self, mix: OperationMix) -> Self {
        self.mix = mix;
        self
    }

    /// Bytes written by one key/value pair of this plan
    pub fn pair_bytes(&self) -> u64 {
        (self.key_size + self.value_size) as u64
    }

    /// Total payload bytes of the pre-generated dataset
    pub fn payload_bytes(&self) -> u64 {
        self.pair_bytes() * self.item_count as u64
    }

    /// Size classes used to observe allocation growth with payload size
    pub fn memory_scaling() -> [WorkloadPlan; 4] {
        [
            WorkloadPlan::new("small", 16, 100, 1000),
            WorkloadPlan::new("medium", 32, 1024, 1000),
            WorkloadPlan::new("large", 64, 10 * 1024, 100),
            WorkloadPlan::new("xlarge", 128, 100 * 1024, 100),
        ]
    }

    /// Default plan for the mixed read/write case
    pub fn mixed() -> WorkloadPlan {
        WorkloadPlan::new("mixed", 16, 100, 1000).with_mix(OperationMix::Mixed)
    }
}
