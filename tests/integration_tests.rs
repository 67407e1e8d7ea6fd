//! End to end scenarios for counting and the file based pipeline

use cooc_counter::*;
use std::collections::HashMap;
use std::fs;

const A: TokenId = 0;
const B: TokenId = 1;
const C: TokenId = 2;

fn entries_of(documents: &[Vec<TokenId>], window: usize, capacity: usize) -> (Vec<Entry>, CountReport) {
    let corpus = TokenCorpus::from_documents(documents);
    let mut table = CooccurrenceTable::new(capacity).unwrap();
    let report = count(&corpus, &mut table, window, 0, TokenId::MAX).unwrap();
    (table.iter().collect(), report)
}

fn sorted(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by_key(|e| (e.target, e.context));
    entries
}

#[test]
fn test_single_document_window_one() {
    let (entries, _) = entries_of(&[vec![A, B, C]], 1, 8);
    assert_eq!(
        sorted(entries),
        vec![
            Entry { target: B, context: A, weight: 1.0 },
            Entry { target: B, context: C, weight: 1.0 },
        ]
    );
}

#[test]
fn test_window_zero_yields_nothing() {
    let (entries, report) = entries_of(&[vec![A, B, C]], 0, 8);
    assert!(entries.is_empty());
    assert_eq!(report.applied, 0);
}

#[test]
fn test_short_second_document_is_ignored() {
    let (two_docs, _) = entries_of(&[vec![A, B, C], vec![A, A]], 1, 8);
    let (one_doc, _) = entries_of(&[vec![A, B, C]], 1, 8);
    assert_eq!(sorted(two_docs), sorted(one_doc));
}

#[test]
fn test_capacity_one_keeps_first_key() {
    let mut table = CooccurrenceTable::new(1).unwrap();
    assert!(table.increment(A, B, 0.5).is_ok());
    assert!(matches!(table.increment(B, C, 1.0), Err(CoocError::Full { capacity: 1 })));

    let entries: Vec<Entry> = table.iter().collect();
    assert_eq!(entries, vec![Entry { target: A, context: B, weight: 0.5 }]);
}

#[test]
fn test_malformed_corpus_is_rejected_before_counting() {
    assert!(matches!(
        TokenCorpus::new(vec![A, B, C], vec![1, 1]),
        Err(CoocError::MalformedCorpus { .. })
    ));
    assert!(matches!(WindowCounter::new(2, 9, 3), Err(CoocError::InvalidRange { .. })));
}

fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("cooc_counter_it_{}_{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_config(dir: &std::path::Path, extra: &str) -> Config {
    let corpus_file = dir.join("corpus.txt");
    fs::write(&corpus_file, "the cat sat on the mat\n\nthe dog sat on the log\na b\n").unwrap();
    let json = format!(
        r#"{{"corpus_file": "{}", "output_dir": "{}", "window_size": 2, "shard_size": 3,
            "table_capacity": 4, "num_threads": 2, "max_retries": 6, "shuffle_vocab": false{}}}"#,
        corpus_file.display(),
        dir.join("out").display(),
        extra
    );
    Config::from_json(&json).unwrap()
}

#[test]
fn test_pipeline_writes_csv_and_vocab() {
    let dir = scratch_dir("csv");
    let config = write_config(&dir, "");
    let shards = Pipeline::run(&config).unwrap();

    // vocabulary: the, on, sat, a, b, cat, dog, log, mat -> 9 ids, shards of 3
    assert_eq!(shards.len(), 3);
    assert!(shards.iter().all(|s| s.is_complete()));

    let text = fs::read_to_string(dir.join("out").join("cooc.csv")).unwrap();
    let total: usize = shards.iter().map(|s| s.entries.len()).sum();
    assert_eq!(text.lines().count(), total + 1);
    assert_eq!(text.lines().next(), Some("Token,Context,Cooc"));

    let vocab: Vocabulary = files_handling::read_input(&dir.join("out").join("words").display().to_string()).unwrap();
    assert_eq!(vocab.len(), 9);
    assert_eq!(vocab.get("the"), Some(0));

    // "sat" is the middle of both six token lines; its window is the, cat|dog, on, the
    let sat = vocab.get("sat").unwrap();
    let the = vocab.get("the").unwrap();
    let on = vocab.get("on").unwrap();
    let weights: HashMap<(TokenId, TokenId), f64> = shards
        .iter()
        .flat_map(|s| s.entries.iter().map(|e| ((e.target, e.context), e.weight)))
        .collect();
    assert_eq!(weights.get(&(sat, the)), Some(&(2.0 * 0.5 + 2.0 * 0.5)));
    assert_eq!(weights.get(&(sat, on)), Some(&2.0));

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_pipeline_writes_bincode_parts() {
    let dir = scratch_dir("bin");
    let config = write_config(&dir, r#", "output_format": "bincode""#);
    let shards = Pipeline::run(&config).unwrap();

    let parts: Vec<Vec<u8>> = files_handling::read_input(&dir.join("out").join("cooc").display().to_string()).unwrap();
    assert_eq!(parts.len(), shards.len());
    for (part, shard) in parts.iter().zip(&shards) {
        assert_eq!(files_handling::deserialize_entries(part).unwrap(), shard.entries);
    }

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_pipeline_writes_npy_parts() {
    let dir = scratch_dir("npy");
    let config = write_config(&dir, r#", "output_format": "npy", "target_lower": 0, "target_upper": 2"#);
    let shards = Pipeline::run(&config).unwrap();

    assert_eq!(shards.len(), 1);
    assert!(dir.join("out").join("cooc0.npy").exists());
    assert!(shards[0].entries.iter().all(|e| e.target < 2));

    fs::remove_dir_all(&dir).unwrap();
}
