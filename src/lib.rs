//! Sparse weighted co-occurrence counting for word-embedding pipelines.
//!
//! A [`WindowCounter`] walks a [`TokenCorpus`] document by document and adds
//! `1/distance` for every context around an eligible target into a fixed
//! capacity [`CooccurrenceTable`]. Target id ranges split the work into
//! shards that can be counted independently.

pub mod config;
pub mod cooccurrence;
pub mod corpus;
pub mod errors;
pub mod files_handling;
pub mod pipeline;
pub mod table;
pub mod types;

pub use config::{Config, OutputFormat};
pub use cooccurrence::{count, count_shards, shard_ranges, ShardPlan, ShardResult, WindowCounter};
pub use corpus::{LoadOptions, TokenCorpus, Vocabulary};
pub use errors::{CoocError, Result};
pub use pipeline::Pipeline;
pub use table::{CooccurrenceTable, Probe, Slot};
pub use types::{CountReport, Entry, TokenId};
