// imports
use crate::errors::{CoocError, Result};
use crate::types::TokenId;

use std::fmt::Display;
use std::fs::File;
use std::io::BufReader;
use serde::Deserialize;


#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// one `cooc.csv` holding every shard
    Csv,
    /// one gzip compressed bincode part per shard
    Bincode,
    /// one `N x 3` npy matrix per shard
    Npy,
}

fn default_window_size() -> usize { 10 }
fn default_vocab_size() -> usize { 400000 }
fn default_shard_size() -> usize { 30000 }
fn default_table_capacity() -> usize { 1_000_000 }
fn default_num_threads() -> usize { 4 }
fn default_max_retries() -> usize { 2 }
fn default_output_format() -> OutputFormat { OutputFormat::Csv }
fn default_true() -> bool { true }

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub corpus_file: String,
    pub output_dir: String,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_vocab_size")]
    pub vocab_size: usize,
    #[serde(default = "default_shard_size")]
    pub shard_size: usize,
    /// initial table capacity of each shard
    #[serde(default = "default_table_capacity")]
    pub table_capacity: usize,
    #[serde(default)]
    pub target_lower: Option<TokenId>,
    #[serde(default)]
    pub target_upper: Option<TokenId>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_output_format")]
    pub output_format: OutputFormat,
    #[serde(default = "default_true")]
    pub shuffle_vocab: bool,
    #[serde(default)]
    pub use_os: bool,
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "using hyper-params:
        corpus_file: {}
        output_dir: {}
        window_size: {}
        vocab_size: {}
        shard_size: {}
        table_capacity: {}
        target_lower: {:?}
        target_upper: {:?}
        num_threads: {}
        max_retries: {}
        output_format: {:?}
        shuffle_vocab: {}
        use_os: {}",
        self.corpus_file, self.output_dir, self.window_size, self.vocab_size, self.shard_size,
        self.table_capacity, self.target_lower, self.target_upper, self.num_threads,
        self.max_retries, self.output_format, self.shuffle_vocab, self.use_os)
    }
}

impl Config {

    /// Build from command line arguments, expecting a single path to a json file
    pub fn new(args: &[String]) -> Result<Config> {

        if args.len() != 2 {
            return Err(CoocError::invalid_config("input should be a path to json file only"));
        }
        Config::from_file(&args[1])
    }

    pub fn from_file(path: &str) -> Result<Config> {
        let f = BufReader::new(File::open(path)?);
        let config: Config = serde_json::from_reader(f)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Config> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {

        if self.table_capacity == 0 {
            return Err(CoocError::InvalidCapacity);
        }
        if self.shard_size == 0 {
            return Err(CoocError::invalid_config("shard_size must be positive"));
        }
        if self.num_threads == 0 {
            return Err(CoocError::invalid_config("num_threads must be positive"));
        }
        if self.vocab_size == 0 {
            return Err(CoocError::invalid_config("vocab_size must be positive"));
        }
        if let (Some(lower), Some(upper)) = (self.target_lower, self.target_upper) {
            if lower > upper {
                return Err(CoocError::InvalidRange { lower, upper });
            }
        }
        Ok(())
    }

    /// Half-open target id range, missing bounds default to the whole vocabulary
    pub fn target_range(&self, vocab_len: usize) -> Result<std::ops::Range<TokenId>> {

        let lower = self.target_lower.unwrap_or(0);
        let upper = self.target_upper.unwrap_or(vocab_len);
        if lower > upper {
            return Err(CoocError::InvalidRange { lower, upper });
        }
        Ok(lower..upper)
    }
}
