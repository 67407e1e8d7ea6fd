// imports
use crate::errors::{CoocError, Result};
use crate::corpus::TokenCorpus;
use crate::table::CooccurrenceTable;
use crate::types::{CountReport, Entry, TokenId};

use std::ops::Range;
use log::{debug, info, warn};
use rayon::{prelude::*, ThreadPoolBuilder};


/// Counts distance weighted co-occurrences inside fixed windows.
///
/// Only target positions whose whole window fits inside their document are
/// counted, and only targets with an id inside `targets`. Each context at
/// distance `d` adds `1/d` to the `(target, context)` weight.
#[derive(Debug, Clone)]
pub struct WindowCounter {
    window: usize,
    targets: Range<TokenId>,
}

impl WindowCounter {

    pub fn new(window: usize, target_lower: TokenId, target_upper: TokenId) -> Result<Self> {

        if target_lower > target_upper {
            return Err(CoocError::InvalidRange { lower: target_lower, upper: target_upper });
        }
        Ok(Self { window, targets: target_lower..target_upper })
    }

    /// Counter over every possible target id
    pub fn full_range(window: usize) -> Self {
        Self { window, targets: 0..TokenId::MAX }
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn targets(&self) -> &Range<TokenId> {
        &self.targets
    }

    /// Feed every eligible window of `corpus` into `table`.
    ///
    /// Increments that do not fit are dropped and tallied in the returned
    /// report; the pass always runs to the end of the corpus.
    pub fn count(&self, corpus: &TokenCorpus, table: &mut CooccurrenceTable) -> Result<CountReport> {

        let w = self.window;
        let mut report = CountReport::default();

        for (doc_start, doc) in corpus.documents() {

            // a document needs 2w + 1 tokens for a single complete window
            if doc.len() <= 2 * w {
                continue;
            }

            for t in w..doc.len() - w {

                let target = doc[t];
                if !self.targets.contains(&target) {
                    continue;
                }

                for c in t - w..=t + w {

                    if c == t { continue }

                    let context = doc[c];
                    let distance = t.abs_diff(c) as f64;
                    match table.increment(target, context, 1.0 / distance) {
                        Ok(_) => report.applied += 1,
                        Err(CoocError::Full { capacity }) => {
                            if report.overflowed == 0 {
                                warn!("table of capacity {} is full at position {}, dropping increments", capacity, doc_start + t);
                            }
                            report.overflowed += 1;
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        debug!("counted targets {:?}: {} increments applied, {} dropped, {} distinct pairs",
            self.targets, report.applied, report.overflowed, table.len());
        Ok(report)
    }
}

/// Count `corpus` into `table` with the given window and half-open target id range
pub fn count(corpus: &TokenCorpus,
    table: &mut CooccurrenceTable,
    window: usize,
    target_lower: TokenId,
    target_upper: TokenId) -> Result<CountReport> {

    WindowCounter::new(window, target_lower, target_upper)?.count(corpus, table)
}


/// Split `targets` into consecutive disjoint ranges of at most `shard_size` ids
pub fn shard_ranges(targets: Range<TokenId>, shard_size: usize) -> Result<Vec<Range<TokenId>>> {

    if shard_size == 0 {
        return Err(CoocError::invalid_config("shard_size must be positive"));
    }
    if targets.start > targets.end {
        return Err(CoocError::InvalidRange { lower: targets.start, upper: targets.end });
    }

    let ranges = (targets.start..targets.end)
    .step_by(shard_size)
    .map(|i| i..i.saturating_add(shard_size).min(targets.end))
    .collect();
    Ok(ranges)
}


/// Settings for a sharded counting run
#[derive(Debug, Clone)]
pub struct ShardPlan {
    pub window: usize,
    pub targets: Range<TokenId>,
    pub shard_size: usize,
    /// initial table capacity of every shard
    pub capacity: usize,
    /// how many times an overflowing shard is re-run with doubled capacity
    pub max_retries: usize,
    pub num_threads: usize,
}

/// Counts of one shard of target ids
#[derive(Debug, Clone)]
pub struct ShardResult {
    pub index: usize,
    pub range: Range<TokenId>,
    /// capacity of the table the entries come from
    pub capacity: usize,
    pub report: CountReport,
    pub entries: Vec<Entry>,
}

impl ShardResult {
    pub fn is_complete(&self) -> bool {
        !self.report.has_overflow()
    }
}

// counts one shard, re-running it into a table twice as large while increments were dropped.
fn run_shard(corpus: &TokenCorpus, plan: &ShardPlan, index: usize, range: Range<TokenId>) -> Result<ShardResult> {

    let counter = WindowCounter::new(plan.window, range.start, range.end)?;
    let mut capacity = plan.capacity;
    let mut attempt = 0;

    loop {

        let mut table = CooccurrenceTable::new(capacity)?;
        let report = counter.count(corpus, &mut table)?;

        if !report.has_overflow() || attempt >= plan.max_retries {
            if report.has_overflow() {
                warn!("shard {} ({:?}) still dropped {} increments at capacity {}", index, range, report.overflowed, capacity);
            }
            debug!("shard {} ({:?}) found {} pairs, load factor {:.3}", index, range, table.len(), table.load_factor());
            return Ok(ShardResult { index, range, capacity, report, entries: table.into_entries() })
        }

        attempt += 1;
        let grown = capacity.saturating_mul(2);
        info!("shard {} overflowed by {} increments, retrying with capacity {}", index, report.overflowed, grown);
        capacity = grown;
    }
}

/// Count every shard of `plan.targets` into its own table, shards running in parallel
pub fn count_shards(corpus: &TokenCorpus, plan: &ShardPlan) -> Result<Vec<ShardResult>> {

    if plan.num_threads == 0 {
        return Err(CoocError::invalid_config("num_threads must be positive"));
    }

    let slices = shard_ranges(plan.targets.clone(), plan.shard_size)?;
    info!("counting {} shards of up to {} target ids on {} threads", slices.len(), plan.shard_size, plan.num_threads);

    let pool = ThreadPoolBuilder::new().num_threads(plan.num_threads).build()?;
    pool.install(|| {
        slices
        .into_par_iter()
        .enumerate()
        .map(|(i, slice)| run_shard(corpus, plan, i, slice))
        .collect::<Result<Vec<ShardResult>>>()
    })
}
