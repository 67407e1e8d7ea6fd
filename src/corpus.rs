// imports
use crate::errors::{CoocError, Result};
use crate::types::TokenId;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use log::info;
use rand::seq::SliceRandom;
use rand::thread_rng;


/// Token ids of every document flattened into one sequence, plus the length
/// of each document. The lengths always sum to the number of tokens.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TokenCorpus {
    tokens: Vec<TokenId>,
    lengths: Vec<usize>,
}

impl TokenCorpus {

    pub fn new(tokens: Vec<TokenId>, lengths: Vec<usize>) -> Result<Self> {

        let total: usize = lengths.iter().sum();
        if total != tokens.len() {
            return Err(CoocError::malformed_corpus(format!(
                "document lengths sum to {}, but there are {} tokens", total, tokens.len()
            )));
        }

        Ok(Self { tokens, lengths })
    }

    pub fn from_documents<D: AsRef<[TokenId]>>(documents: &[D]) -> Self {

        let lengths = documents.iter().map(|d| d.as_ref().len()).collect();
        let tokens = documents.iter().flat_map(|d| d.as_ref().iter().copied()).collect();
        Self { tokens, lengths }
    }

    pub fn tokens(&self) -> &[TokenId] {
        &self.tokens
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn num_documents(&self) -> usize {
        self.lengths.len()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Each document as its absolute start offset and its tokens
    pub fn documents(&self) -> impl Iterator<Item = (usize, &[TokenId])> + '_ {
        self.lengths.iter().scan(0usize, move |offset, &len| {
            let start = *offset;
            *offset += len;
            Some((start, &self.tokens[start..start + len]))
        })
    }

    /// Largest token id plus one, zero for an empty corpus
    pub fn id_bound(&self) -> TokenId {
        self.tokens.iter().max().map_or(0, |m| m + 1)
    }
}


/// Token to id mapping built from the most frequent tokens of a text corpus
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    t2i: HashMap<String, TokenId>,
}

impl Vocabulary {

    pub fn from_map(t2i: HashMap<String, TokenId>) -> Self {
        Self { t2i }
    }

    pub fn len(&self) -> usize {
        self.t2i.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t2i.is_empty()
    }

    pub fn get(&self, token: &str) -> Option<TokenId> {
        self.t2i.get(token).copied()
    }

    pub fn t2i(&self) -> &HashMap<String, TokenId> {
        &self.t2i
    }

    // keeps the `vocab_size` most common tokens of `token2count`. Ties are broken by the token text so
    // that the vocabulary does not depend on hash map order. Shuffling spreads frequent tokens over
    // the id space, so that shards of consecutive ids carry a similar load.
    fn build(token2count: &HashMap<String, usize>, vocab_size: usize, use_shuffle: bool) -> Self {

        let mut tup = token2count
        .iter()
        .map(|(k, v)| (k.as_str(), *v))
        .collect::<Vec<(&str, usize)>>();
        tup.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        tup.truncate(vocab_size);

        if use_shuffle {
            tup.shuffle(&mut thread_rng());
        }

        let t2i = tup
        .into_iter()
        .enumerate()
        .map(|(i, (tok, _))| (tok.to_owned(), i))
        .collect::<HashMap<String, TokenId>>();

        info!("using {} most common tokens out of {}", t2i.len(), token2count.len());
        Self { t2i }
    }
}


/// Options for turning raw text into a [`TokenCorpus`]
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    pub vocab_size: usize,
    /// wrap every document with SOS and EOS tokens
    pub use_os: bool,
    pub use_shuffle: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { vocab_size: 400000, use_os: false, use_shuffle: true }
    }
}

// line is a string of text, it is trimmed and lower cased, then split on whitespace.
fn tokenize(line: &str, use_os: bool) -> Vec<String> {

    let line = line.trim().to_lowercase();
    let mut tokens: Vec<String> = Vec::new();
    if use_os {
        tokens.push("SOS".to_string());
    }
    tokens.extend(line.split_whitespace().map(|x| x.to_string()));
    if use_os {
        tokens.push("EOS".to_string());
    }
    tokens
}

/// Build a vocabulary and corpus from lines of text, one document per
/// non-empty line. Tokens outside the vocabulary are removed from their
/// document.
pub fn from_lines<I, S>(lines: I, options: &LoadOptions) -> (Vocabulary, TokenCorpus)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{

    let mut token2count: HashMap<String, usize> = HashMap::new();
    let mut sequences: Vec<Vec<String>> = Vec::new();

    for line in lines {
        let line = line.as_ref();
        if line.trim().is_empty() {
            continue;
        }
        let sequence = tokenize(line, options.use_os);
        for tok in &sequence {
            *token2count.entry(tok.to_owned()).or_insert(0) += 1;
        }
        sequences.push(sequence);
    }

    let vocab = Vocabulary::build(&token2count, options.vocab_size, options.use_shuffle);

    let documents = sequences
    .iter()
    .map(|sequence| sequence.iter().filter_map(|tok| vocab.get(tok)).collect::<Vec<TokenId>>())
    .collect::<Vec<Vec<TokenId>>>();

    let corpus = TokenCorpus::from_documents(&documents);
    (vocab, corpus)
}

/// Read a corpus file, see [`from_lines`]
pub fn load(file_path: &str, options: &LoadOptions) -> Result<(Vocabulary, TokenCorpus)> {

    let f = File::open(file_path)?;
    let lines = BufReader::new(f).lines().collect::<std::io::Result<Vec<String>>>()?;
    let (vocab, corpus) = from_lines(lines, options);
    info!("loaded {} documents, {} tokens in vocabulary", corpus.num_documents(), corpus.len());
    Ok((vocab, corpus))
}


#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn lengths_must_sum_to_token_count() {
        assert!(TokenCorpus::new(vec![1, 2, 3], vec![2, 1]).is_ok());
        let err = TokenCorpus::new(vec![1, 2, 3], vec![2, 2]).unwrap_err();
        assert!(matches!(err, CoocError::MalformedCorpus { .. }));
    }

    #[test]
    fn documents_are_split_by_lengths() {
        let corpus = TokenCorpus::from_documents(&[vec![0, 1, 2], vec![], vec![0, 0]]);
        assert_eq!(corpus.len(), 5);
        assert_eq!(corpus.num_documents(), 3);
        assert_eq!(corpus.id_bound(), 3);

        let docs: Vec<(usize, Vec<TokenId>)> = corpus.documents().map(|(s, d)| (s, d.to_vec())).collect();
        assert_eq!(docs, vec![(0, vec![0, 1, 2]), (3, vec![]), (3, vec![0, 0])]);
    }

    #[test]
    fn vocabulary_keeps_most_common_tokens() {

        let lines = ["a b a c", "", "  A d a b  "];
        let options = LoadOptions { vocab_size: 2, use_os: false, use_shuffle: false };
        let (vocab, corpus) = from_lines(lines, &options);

        // counts: a=4, b=2, c=1, d=1
        assert_eq!(vocab.len(), 2);
        assert_eq!(vocab.get("a"), Some(0));
        assert_eq!(vocab.get("b"), Some(1));
        assert_eq!(vocab.get("c"), None);

        // empty line skipped, out of vocabulary tokens removed
        assert_eq!(corpus.lengths(), &[3, 3]);
        assert_eq!(corpus.tokens(), &[0, 1, 0, 0, 0, 1]);
    }

    #[test]
    fn os_tokens_wrap_documents() {
        let options = LoadOptions { vocab_size: 10, use_os: true, use_shuffle: false };
        let (vocab, corpus) = from_lines(["x y"], &options);
        assert_eq!(corpus.lengths(), &[4]);
        assert!(vocab.get("SOS").is_some());
        assert!(vocab.get("EOS").is_some());
        assert_eq!(corpus.tokens()[0], vocab.get("SOS").unwrap());
        assert_eq!(corpus.tokens()[3], vocab.get("EOS").unwrap());
    }

    #[test]
    fn shuffled_vocabulary_is_a_permutation() {
        let options = LoadOptions { vocab_size: 100, use_os: false, use_shuffle: true };
        let (vocab, _) = from_lines(["one two three four five"], &options);
        let mut ids: Vec<TokenId> = vocab.t2i().values().copied().collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
