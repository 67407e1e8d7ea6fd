// imports
use crate::config::{Config, OutputFormat};
use crate::cooccurrence::{count_shards, ShardPlan, ShardResult};
use crate::corpus::{self, LoadOptions};
use crate::errors::Result;
use crate::files_handling::{entries_to_ndarray, save_output, serialize_entries};
use crate::types::Entry;

use std::time::Instant;
use log::{info, warn};

pub struct Pipeline {}

impl Pipeline {

    // runs the main procedure of 3 steps -
    // -> loading the corpus and building the vocabulary
    // -> sharded cooccurrences counting
    // -> saving counts and vocabulary
    pub fn run(params: &Config) -> Result<Vec<ShardResult>> {

        info!("{}", params);
        let timer = Instant::now();

        let options = LoadOptions {
            vocab_size: params.vocab_size,
            use_os: params.use_os,
            use_shuffle: params.shuffle_vocab,
        };
        let (vocab, corpus) = corpus::load(&params.corpus_file, &options)?;
        info!("finished vocab creation, took {} seconds ...", timer.elapsed().as_secs());

        let timer = Instant::now();
        let plan = ShardPlan {
            window: params.window_size,
            targets: params.target_range(vocab.len())?,
            shard_size: params.shard_size,
            capacity: params.table_capacity,
            max_retries: params.max_retries,
            num_threads: params.num_threads,
        };
        let shards = count_shards(&corpus, &plan)?;

        let incomplete = shards.iter().filter(|s| !s.is_complete()).count();
        if incomplete > 0 {
            warn!("{} of {} shards dropped increments, raise table_capacity or max_retries", incomplete, shards.len());
        }
        info!("finished counting, took {} seconds ...", timer.elapsed().as_secs());

        Pipeline::save(params, &shards)?;
        save_output(&params.output_dir, "words", &vocab)?;
        info!("saved counts and vocab to {}", params.output_dir);

        Ok(shards)
    }

    fn save(params: &Config, shards: &[ShardResult]) -> Result<()> {

        match params.output_format {
            OutputFormat::Csv => {
                let entries: Vec<Entry> = shards.iter().flat_map(|s| s.entries.iter().copied()).collect();
                save_output(&params.output_dir, "cooc", entries.as_slice())
            }
            OutputFormat::Bincode => {
                let parts = shards
                .iter()
                .map(|s| serialize_entries(&s.entries))
                .collect::<Result<Vec<Vec<u8>>>>()?;
                save_output(&params.output_dir, "cooc", parts.as_slice())
            }
            OutputFormat::Npy => {
                for shard in shards {
                    let arr = entries_to_ndarray(&shard.entries);
                    save_output(&params.output_dir, &format!("cooc{}", shard.index), &arr)?;
                }
                Ok(())
            }
        }
    }
}
