//! Benchmark driver.
//!
//! Each benchmark sample runs the same sequence:
//!
//! 1. **Setup**: provision a fresh instance and let the workload prepare its
//!    payloads and, when it needs warm data, pre-populate the engine.
//! 2. **Timer reset**: the clock starts only after setup has finished.
//! 3. **Measured loop**: `step(i)` for `i in 0..iterations`, where the
//!    iteration count comes from the measurement framework.
//! 4. **Teardown**: the instance guard closes and removes the engine after the
//!    clock has stopped, and also while unwinding from a fatal abort.
//!
//! Any engine error inside the measured loop aborts the whole case; a sample
//! that hit an unexpected error is never reported.

use std::sync::Barrier;
use std::thread;
use std::time::{Duration, Instant};

use kvprobe_core::{Engine, EngineOpener, Error, Result};
use kvprobe_workload::{sequential_key, Generator, Operation, WorkloadPlan};
use tracing::{debug, error};

use crate::config::HarnessConfig;
use crate::instance::Provisioner;
use crate::report::{BenchContext, Reporter};

/// Iteration count and elapsed time of one measured loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Iterations executed inside the measured loop
    pub iterations: u64,
    /// Wall-clock time of the measured loop only
    pub elapsed: Duration,
    /// Payload bytes written or read by the measured loop
    pub bytes: u64,
}

impl Measurement {
    /// Average nanoseconds per iteration
    pub fn ns_per_op(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.elapsed.as_nanos() as f64 / self.iterations as f64
    }

    /// Iterations per second
    pub fn ops_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.iterations as f64 / secs
    }
}

/// One benchmark case shape.
pub trait Workload: Sync {
    /// Data built during setup and read by every iteration
    type Prepared: Sync;

    /// Case name, used in logs and failure messages
    fn name(&self) -> String;

    /// Setup: generate payloads and pre-populate the engine if needed.
    fn prepare<E: Engine + ?Sized>(
        &self,
        engine: &E,
        generator: &Generator,
        iterations: u64,
    ) -> Result<Self::Prepared>;

    /// One measured iteration.
    fn step<E: Engine + ?Sized>(&self, engine: &E, prepared: &Self::Prepared, i: u64) -> Result<()>;

    /// Payload bytes moved by one iteration
    fn bytes_per_iteration(&self) -> u64 {
        0
    }
}

/// Setup, timer reset, then the measured loop.
pub fn run_measured<E, W>(
    engine: &E,
    generator: &Generator,
    workload: &W,
    iterations: u64,
) -> Result<Measurement>
where
    E: Engine + ?Sized,
    W: Workload,
{
    let prepared = workload.prepare(engine, generator, iterations)?;

    let start = Instant::now();
    for i in 0..iterations {
        if let Err(e) = workload.step(engine, &prepared, i) {
            error!(workload = %workload.name(), iteration = i, error = %e, "measured loop aborted");
            return Err(e);
        }
    }
    let elapsed = start.elapsed();

    Ok(Measurement {
        iterations,
        elapsed,
        bytes: iterations * workload.bytes_per_iteration(),
    })
}

fn key_bytes(prefix: &str, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|i| sequential_key(prefix, i).into_bytes())
        .collect()
}

fn populate<E: Engine + ?Sized>(engine: &E, keys: &[Vec<u8>], value: &[u8]) -> Result<()> {
    for key in keys {
        engine.put(key, value)?;
    }
    Ok(())
}

fn index(i: u64, len: usize) -> usize {
    (i % len as u64) as usize
}

/// One Put, Get, Delete or Exists per iteration.
#[derive(Debug, Clone, Copy)]
pub struct SingleOp {
    /// Operation under test
    pub op: Operation,
    /// Value length in bytes
    pub value_size: usize,
}

impl SingleOp {
    /// Single-operation case with the given value size
    pub fn new(op: Operation, value_size: usize) -> Self {
        Self { op, value_size }
    }
}

/// Payloads of a [`SingleOp`] case
#[derive(Debug)]
pub struct SinglePrepared {
    keys: Vec<Vec<u8>>,
    value: Vec<u8>,
}

impl Workload for SingleOp {
    type Prepared = SinglePrepared;

    fn name(&self) -> String {
        format!("{:?}", self.op).to_lowercase()
    }

    fn prepare<E: Engine + ?Sized>(
        &self,
        engine: &E,
        generator: &Generator,
        iterations: u64,
    ) -> Result<SinglePrepared> {
        let value = generator.generate_value(self.value_size);
        let keys = match self.op {
            // Fresh key per iteration, nothing written yet
            Operation::Put | Operation::Insert => key_bytes("single-", iterations as usize),
            // One warm key read over and over
            Operation::Get | Operation::Exists => {
                let keys = key_bytes("single-", 1);
                populate(engine, &keys, &value)?;
                keys
            }
            // One warm key per iteration so every delete hits
            Operation::Delete => {
                let keys = key_bytes("single-", iterations as usize);
                populate(engine, &keys, &value)?;
                keys
            }
        };
        Ok(SinglePrepared { keys, value })
    }

    fn step<E: Engine + ?Sized>(&self, engine: &E, prepared: &SinglePrepared, i: u64) -> Result<()> {
        match self.op {
            Operation::Put | Operation::Insert => engine.put(&prepared.keys[i as usize], &prepared.value),
            Operation::Get => engine.get(&prepared.keys[0]).map(|_| ()),
            Operation::Exists => engine.exists(&prepared.keys[0]).map(|_| ()),
            Operation::Delete => engine.delete(&prepared.keys[i as usize]),
        }
    }

    fn bytes_per_iteration(&self) -> u64 {
        match self.op {
            Operation::Put | Operation::Insert | Operation::Get => self.value_size as u64,
            Operation::Exists | Operation::Delete => 0,
        }
    }
}

/// A fixed-size batch of sequential Puts per iteration.
#[derive(Debug, Clone, Copy)]
pub struct Batch {
    /// Puts per iteration
    pub size: usize,
    /// Value length in bytes
    pub value_size: usize,
}

impl Batch {
    /// Batch case of `size` puts
    pub fn new(size: usize, value_size: usize) -> Self {
        Self { size, value_size }
    }
}

/// Payloads of a [`Batch`] case
#[derive(Debug)]
pub struct BatchPrepared {
    keys: Vec<Vec<u8>>,
    values: Vec<Vec<u8>>,
}

impl Workload for Batch {
    type Prepared = BatchPrepared;

    fn name(&self) -> String {
        format!("batch_{}", self.size)
    }

    fn prepare<E: Engine + ?Sized>(
        &self,
        _engine: &E,
        generator: &Generator,
        _iterations: u64,
    ) -> Result<BatchPrepared> {
        let keys = key_bytes("batch-", self.size);
        let values = (0..self.size)
            .map(|_| generator.generate_value(self.value_size))
            .collect();
        Ok(BatchPrepared { keys, values })
    }

    fn step<E: Engine + ?Sized>(&self, engine: &E, prepared: &BatchPrepared, _i: u64) -> Result<()> {
        for (key, value) in prepared.keys.iter().zip(&prepared.values) {
            engine.put(key, value)?;
        }
        Ok(())
    }

    fn bytes_per_iteration(&self) -> u64 {
        (self.size * self.value_size) as u64
    }
}

/// Reads over a pre-populated key set; iteration `i` reads key `i mod N`.
#[derive(Debug, Clone, Copy)]
pub struct RandomGet {
    /// Number of pre-populated keys
    pub population: usize,
    /// Value length in bytes
    pub value_size: usize,
}

impl RandomGet {
    /// Random-access case over `population` keys
    pub fn new(population: usize, value_size: usize) -> Self {
        Self {
            population,
            value_size,
        }
    }
}

impl Workload for RandomGet {
    type Prepared = Vec<Vec<u8>>;

    fn name(&self) -> String {
        format!("random_get_{}", self.population)
    }

    fn prepare<E: Engine + ?Sized>(
        &self,
        engine: &E,
        generator: &Generator,
        _iterations: u64,
    ) -> Result<Vec<Vec<u8>>> {
        if self.population == 0 {
            return Err(Error::InvalidOperation(
                "random access needs a non-empty population".to_string(),
            ));
        }
        let keys = key_bytes("random-", self.population);
        populate(engine, &keys, &generator.generate_value(self.value_size))?;
        Ok(keys)
    }

    fn step<E: Engine + ?Sized>(&self, engine: &E, keys: &Vec<Vec<u8>>, i: u64) -> Result<()> {
        engine.get(&keys[index(i, keys.len())]).map(|_| ())
    }

    fn bytes_per_iteration(&self) -> u64 {
        self.value_size as u64
    }
}

/// Read/write mix routed by the plan's operation cycle.
///
/// With [`OperationMix::Mixed`](kvprobe_workload::OperationMix::Mixed),
/// `i mod 4` selects Get, Put (overwrite), Exists, and Insert (brand-new key).
#[derive(Debug, Clone, Copy)]
pub struct Mixed {
    /// Sizes, population and operation mix
    pub plan: WorkloadPlan,
}

impl Mixed {
    /// Mixed case for `plan`
    pub fn new(plan: WorkloadPlan) -> Self {
        Self { plan }
    }
}

/// Payloads of a [`Mixed`] case
#[derive(Debug)]
pub struct MixedPrepared {
    keys: Vec<Vec<u8>>,
    // Overwrites alternate between these so each pass changes the value
    fresh: [Vec<u8>; 2],
}

/// Key written by the Insert path of iteration `i`; never one of the
/// pre-populated keys.
pub fn insert_key(i: u64) -> String {
    format!("new-{:012}", i)
}

impl Workload for Mixed {
    type Prepared = MixedPrepared;

    fn name(&self) -> String {
        self.plan.name.to_string()
    }

    fn prepare<E: Engine + ?Sized>(
        &self,
        engine: &E,
        generator: &Generator,
        _iterations: u64,
    ) -> Result<MixedPrepared> {
        if self.plan.item_count == 0 {
            return Err(Error::InvalidOperation(format!(
                "plan {} has no items to mix over",
                self.plan.name
            )));
        }
        let keys = key_bytes("mixed-", self.plan.item_count);
        populate(engine, &keys, &generator.generate_value(self.plan.value_size))?;
        let first = generator.generate_value(self.plan.value_size);
        let mut second = generator.generate_value(self.plan.value_size);
        if second == first {
            // Fallback payloads repeat
            second.rotate_left(1);
        }
        Ok(MixedPrepared {
            keys,
            fresh: [first, second],
        })
    }

    fn step<E: Engine + ?Sized>(&self, engine: &E, prepared: &MixedPrepared, i: u64) -> Result<()> {
        let key = &prepared.keys[index(i, prepared.keys.len())];
        let cycle = self.plan.mix.cycle().len() as u64;
        let fresh = &prepared.fresh[((i / cycle) % 2) as usize];
        match self.plan.mix.op_for(i) {
            Operation::Get => engine.get(key).map(|_| ()),
            Operation::Put => engine.put(key, fresh),
            Operation::Exists => engine.exists(key).map(|_| ()),
            Operation::Delete => engine.delete(key),
            Operation::Insert => engine.put(insert_key(i).as_bytes(), fresh),
        }
    }

    fn bytes_per_iteration(&self) -> u64 {
        self.plan.value_size as u64
    }
}

/// Put-only workload over a plan's size class, for allocation growth.
#[derive(Debug, Clone, Copy)]
pub struct PutOnly {
    /// Key size, value size and item count
    pub plan: WorkloadPlan,
}

impl PutOnly {
    /// Memory-scaling case for `plan`
    pub fn new(plan: WorkloadPlan) -> Self {
        Self { plan }
    }
}

/// Payloads of a [`PutOnly`] case
#[derive(Debug)]
pub struct PutOnlyPrepared {
    keys: Vec<Vec<u8>>,
    values: Vec<Vec<u8>>,
}

impl Workload for PutOnly {
    type Prepared = PutOnlyPrepared;

    fn name(&self) -> String {
        format!("memory_{}", self.plan.name)
    }

    fn prepare<E: Engine + ?Sized>(
        &self,
        _engine: &E,
        generator: &Generator,
        _iterations: u64,
    ) -> Result<PutOnlyPrepared> {
        if self.plan.item_count == 0 {
            return Err(Error::InvalidOperation(format!(
                "plan {} has no items to write",
                self.plan.name
            )));
        }
        let keys = generator.generate_unique_keys(self.plan.item_count, self.plan.key_size);
        let values = (0..self.plan.item_count)
            .map(|_| generator.generate_value(self.plan.value_size))
            .collect();
        Ok(PutOnlyPrepared { keys, values })
    }

    fn step<E: Engine + ?Sized>(&self, engine: &E, prepared: &PutOnlyPrepared, i: u64) -> Result<()> {
        let n = index(i, prepared.keys.len());
        engine.put(&prepared.keys[n], &prepared.values[n])
    }

    fn bytes_per_iteration(&self) -> u64 {
        self.plan.pair_bytes()
    }
}

/// Put-then-Get units of work spread over parallel workers.
#[derive(Debug, Clone, Copy)]
pub struct ConcurrentPutGet {
    /// Value length in bytes
    pub value_size: usize,
}

/// Key of unit `i` on `worker`; unique across the whole case by construction.
pub fn unit_key(worker: usize, i: u64) -> String {
    format!("w{:03}-{:012}", worker, i)
}

/// Units assigned to `worker` when `total` units are split over `workers`
pub fn units_for(worker: usize, workers: usize, total: u64) -> u64 {
    let workers = workers as u64;
    let base = total / workers;
    if (worker as u64) < total % workers {
        base + 1
    } else {
        base
    }
}

impl ConcurrentPutGet {
    /// Concurrent case with the given value size
    pub fn new(value_size: usize) -> Self {
        Self { value_size }
    }

    /// Case name, used in logs and failure messages
    pub fn name(&self) -> String {
        "concurrent_put_get".to_string()
    }

    /// Run `iterations` units across `workers` threads sharing `engine`.
    ///
    /// Workers start together on a barrier; the clock starts once every
    /// worker is ready and runs until the last one has joined. A read that does not return the
    /// value just written fails the case.
    pub fn run<E: Engine + ?Sized>(
        &self,
        engine: &E,
        generator: &Generator,
        workers: usize,
        iterations: u64,
    ) -> Result<Measurement> {
        let workers = workers.max(1);
        let value = generator.generate_value(self.value_size);
        let barrier = Barrier::new(workers + 1);

        let (elapsed, results) = thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|worker| {
                    let units = units_for(worker, workers, iterations);
                    let barrier = &barrier;
                    let value = &value;
                    s.spawn(move || -> Result<()> {
                        barrier.wait();
                        for i in 0..units {
                            let key = unit_key(worker, i);
                            engine.put(key.as_bytes(), value)?;
                            if engine.get(key.as_bytes())? != *value {
                                return Err(Error::InvalidOperation(format!(
                                    "read back a different value for {}",
                                    key
                                )));
                            }
                        }
                        Ok(())
                    })
                })
                .collect();

            barrier.wait();
            let start = Instant::now();

            let results: Vec<Result<()>> = handles
                .into_iter()
                .map(|h| {
                    h.join().unwrap_or_else(|_| {
                        Err(Error::InvalidOperation("worker panicked".to_string()))
                    })
                })
                .collect();
            (start.elapsed(), results)
        });

        for result in results {
            if let Err(e) = result {
                error!(workers, error = %e, "concurrent case aborted");
                return Err(e);
            }
        }

        Ok(Measurement {
            iterations,
            elapsed,
            bytes: iterations * self.value_size as u64,
        })
    }
}

/// Runs workloads against freshly provisioned instances.
pub struct Driver<O: EngineOpener> {
    provisioner: Provisioner<O>,
    generator: Generator,
    workers: usize,
}

impl<O: EngineOpener> Driver<O> {
    /// Driver over `provisioner`, seeded and sized from its configuration
    pub fn new(provisioner: Provisioner<O>) -> Self {
        let config = provisioner.config();
        let generator = Generator::secure().with_seed(config.seed);
        let workers = config.workers.max(1);
        Self {
            provisioner,
            generator,
            workers,
        }
    }

    /// Driver for `opener` configured by `config`
    pub fn from_config(opener: O, config: HarnessConfig) -> Self {
        Self::new(Provisioner::new(opener, config))
    }

    /// Replace the payload generator
    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = generator;
        self
    }

    /// Set the number of parallel workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Parallel workers used by [`measure_parallel`](Self::measure_parallel)
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// The underlying provisioner
    pub fn provisioner(&self) -> &Provisioner<O> {
        &self.provisioner
    }

    /// Measure one sample of `workload`; any failure aborts the case.
    pub fn measure<W: Workload>(&self, ctx: &BenchContext, workload: &W, iterations: u64) -> Measurement {
        let instance = self.provisioner.provision_for_bench(ctx);

        let measurement = match run_measured(instance.engine(), &self.generator, workload, iterations) {
            Ok(m) => m,
            Err(e) => ctx.fatal(&format!("{} aborted: {}", workload.name(), e)),
        };
        instance.teardown();

        debug!(
            bench = %ctx.name(),
            workload = %workload.name(),
            iterations,
            ns_per_op = measurement.ns_per_op(),
            "sample complete"
        );
        measurement
    }

    /// Elapsed time of one sample, for `Bencher::iter_custom`
    pub fn sample<W: Workload>(&self, ctx: &BenchContext, workload: &W, iterations: u64) -> Duration {
        self.measure(ctx, workload, iterations).elapsed
    }

    /// Measure one sample of the concurrent case; any failure aborts it.
    pub fn measure_parallel(
        &self,
        ctx: &BenchContext,
        case: &ConcurrentPutGet,
        iterations: u64,
    ) -> Measurement {
        let instance = self.provisioner.provision_for_bench(ctx);

        let measurement =
            match case.run(instance.engine(), &self.generator, self.workers, iterations) {
                Ok(m) => m,
                Err(e) => ctx.fatal(&format!("{} aborted: {}", case.name(), e)),
            };
        instance.teardown();

        debug!(
            bench = %ctx.name(),
            workers = self.workers,
            iterations,
            ops_per_sec = measurement.ops_per_sec(),
            "parallel sample complete"
        );
        measurement
    }

    /// Elapsed time of one concurrent sample, for `Bencher::iter_custom`
    pub fn sample_parallel(&self, ctx: &BenchContext, case: &ConcurrentPutGet, iterations: u64) -> Duration {
        self.measure_parallel(ctx, case, iterations).elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvprobe_core::{EngineConfig, MemoryEngine, MemoryOpener};
    use kvprobe_workload::{OperationMix, UnavailableEntropy};
    use std::collections::HashSet;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn engine(dir: &TempDir) -> MemoryEngine {
        MemoryEngine::open(&EngineConfig::new(dir.path().join("db"))).unwrap()
    }

    fn driver(dir: &TempDir) -> Driver<MemoryOpener> {
        Driver::from_config(
            MemoryOpener,
            HarnessConfig::default().with_temp_root(dir.path()).with_workers(4),
        )
    }

    #[test]
    fn test_measurement_rates() {
        let m = Measurement {
            iterations: 1000,
            elapsed: Duration::from_millis(1),
            bytes: 0,
        };
        assert_eq!(m.ns_per_op(), 1000.0);
        assert_eq!(m.ops_per_sec(), 1_000_000.0);

        let empty = Measurement {
            iterations: 0,
            elapsed: Duration::ZERO,
            bytes: 0,
        };
        assert_eq!(empty.ns_per_op(), 0.0);
        assert_eq!(empty.ops_per_sec(), 0.0);
    }

    #[test]
    fn test_units_split_covers_total() {
        for (workers, total) in [(1, 10), (3, 10), (4, 3), (8, 0)] {
            let sum: u64 = (0..workers).map(|w| units_for(w, workers, total)).sum();
            assert_eq!(sum, total);
        }
        assert_eq!(units_for(0, 3, 10), 4);
        assert_eq!(units_for(2, 3, 10), 3);
    }

    #[test]
    fn test_unit_keys_unique_across_workers() {
        let keys: HashSet<String> = (0..4)
            .flat_map(|w| (0..100).map(move |i| unit_key(w, i)))
            .collect();
        assert_eq!(keys.len(), 400);
    }

    #[test]
    fn test_single_ops_run() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let gen = Generator::secure();

        for op in [Operation::Put, Operation::Get, Operation::Exists, Operation::Delete] {
            let m = run_measured(&engine, &gen, &SingleOp::new(op, 32), 50).unwrap();
            assert_eq!(m.iterations, 50);
        }
    }

    #[test]
    fn test_delete_workload_empties_what_it_populated() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        run_measured(&engine, &Generator::secure(), &SingleOp::new(Operation::Delete, 8), 20).unwrap();
        assert!(engine.is_empty().unwrap());
    }

    #[test]
    fn test_batch_writes_whole_batch() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let m = run_measured(&engine, &Generator::secure(), &Batch::new(100, 16), 3).unwrap();
        assert_eq!(engine.len().unwrap(), 100);
        assert_eq!(m.bytes, 3 * 100 * 16);
    }

    #[test]
    fn test_random_get_rejects_empty_population() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let result = run_measured(&engine, &Generator::secure(), &RandomGet::new(0, 8), 1);
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_mixed_inserts_new_keys() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let plan = WorkloadPlan::new("mixed", 16, 32, 10).with_mix(OperationMix::Mixed);
        run_measured(&engine, &Generator::secure(), &Mixed::new(plan), 40).unwrap();

        // 10 populated keys plus one insert every fourth iteration
        assert_eq!(engine.len().unwrap(), 20);
        assert!(engine.exists(insert_key(3).as_bytes()).unwrap());
        assert!(!engine.exists(insert_key(4).as_bytes()).unwrap());
    }

    #[test]
    fn test_mixed_overwrites_alternate_values() {
        let plan = WorkloadPlan::new("mixed", 16, 32, 1).with_mix(OperationMix::Mixed);
        let fallback = Generator::new(Arc::new(UnavailableEntropy));

        let written_after = |iterations: u64| {
            let dir = TempDir::new().unwrap();
            let engine = engine(&dir);
            run_measured(&engine, &fallback, &Mixed::new(plan), iterations).unwrap();
            engine.get(b"mixed-000000").unwrap()
        };

        // Iteration 1 overwrites on the first cycle, iteration 5 on the second
        assert_ne!(written_after(2), written_after(6));
        assert_eq!(written_after(2), written_after(10));
    }

    #[test]
    fn test_put_only_keys_distinct_without_entropy() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let fallback = Generator::new(Arc::new(UnavailableEntropy));
        let plan = WorkloadPlan::new("small", 16, 100, 1000);

        run_measured(&engine, &fallback, &PutOnly::new(plan), 1000).unwrap();
        assert_eq!(engine.len().unwrap(), 1000);
    }

    #[test]
    fn test_put_only_bytes() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let plan = WorkloadPlan::new("tiny", 8, 24, 5);
        let m = run_measured(&engine, &Generator::secure(), &PutOnly::new(plan), 12).unwrap();
        assert_eq!(m.bytes, 12 * 32);
    }

    #[test]
    fn test_concurrent_case_writes_every_unit() {
        let dir = TempDir::new().unwrap();
        let engine = engine(&dir);
        let m = ConcurrentPutGet::new(16)
            .run(&engine, &Generator::secure(), 4, 401)
            .unwrap();
        assert_eq!(m.iterations, 401);
        assert_eq!(engine.len().unwrap(), 401);
    }

    #[test]
    fn test_driver_cleans_up_each_sample() {
        let dir = TempDir::new().unwrap();
        let driver = driver(&dir);
        let ctx = BenchContext::new("cleanup");

        driver.sample(&ctx, &SingleOp::new(Operation::Put, 16), 10);
        driver.sample_parallel(&ctx, &ConcurrentPutGet::new(16), 10);

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
        assert_eq!(ctx.failure_count(), 0);
    }

    #[test]
    #[should_panic(expected = "aborted")]
    fn test_driver_invalid_workload_is_fatal() {
        let dir = TempDir::new().unwrap();
        let driver = driver(&dir);
        let ctx = BenchContext::new("fatal");
        driver.measure(&ctx, &RandomGet::new(0, 8), 1);
    }
}
