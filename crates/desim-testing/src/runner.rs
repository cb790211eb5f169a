//! Batch run harness with parallel execution
//!
//! `Simulator` is built on `Rc`/`RefCell` and is not `Send`; `BatchRunner`
//! works around that the way a caller must in single-threaded-engine code:
//! each run constructs, drives, and tears down its own simulator entirely
//! within one rayon worker thread, and only the `Send` report value it
//! returns ever crosses a thread boundary.

use rayon::prelude::*;
use std::time::Instant;

/// Outcome of one run.
#[derive(Debug, Clone)]
pub struct RunResult<R> {
    pub label: String,
    pub seed: u64,
    pub report: R,
    pub duration_ms: u64,
}

/// Runs many labeled, seeded simulations in parallel, each through the same
/// `run_fn`.
pub struct BatchRunner<F> {
    runs: Vec<(String, u64)>,
    parallelism: Option<usize>,
    run_fn: F,
}

impl<F, R> BatchRunner<F>
where
    F: Fn(u64) -> R + Sync,
    R: Send,
{
    /// `runs` pairs a label with the seed its `run_fn` invocation receives.
    pub fn new(runs: Vec<(String, u64)>, run_fn: F) -> Self {
        Self {
            runs,
            parallelism: None,
            run_fn,
        }
    }

    /// Cap the rayon global thread pool at `n` threads. Best-effort: if the
    /// pool was already built elsewhere in the process, this is a no-op.
    pub fn parallelism(mut self, n: usize) -> Self {
        self.parallelism = Some(n);
        self
    }

    /// Run every labeled seed once.
    pub fn run(&self) -> Vec<RunResult<R>> {
        if let Some(n) = self.parallelism {
            rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build_global()
                .ok();
        }

        self.runs
            .par_iter()
            .map(|(label, seed)| self.run_one(label, *seed))
            .collect()
    }

    /// Run every labeled run once per seed in `seeds`, producing
    /// `runs.len() * seeds.len()` results labeled `"{label}_seed={seed}"`.
    pub fn run_with_replications(&self, seeds: &[u64]) -> Vec<RunResult<R>> {
        let mut all_runs = Vec::with_capacity(self.runs.len() * seeds.len());
        for (label, _) in &self.runs {
            for &seed in seeds {
                all_runs.push((format!("{}_seed={}", label, seed), seed));
            }
        }

        all_runs
            .par_iter()
            .map(|(label, seed)| self.run_one(label, *seed))
            .collect()
    }

    fn run_one(&self, label: &str, seed: u64) -> RunResult<R> {
        let start = Instant::now();
        let report = (self.run_fn)(seed);
        let duration_ms = start.elapsed().as_millis() as u64;
        RunResult {
            label: label.to_string(),
            seed,
            report,
            duration_ms,
        }
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}
