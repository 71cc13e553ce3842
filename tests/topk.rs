use suggest_store::config::EngineConfig;
use suggest_store::engine::Engine;
use suggest_store::phrase::SnapshotRecord;

fn rec(phrase: &str, count: u64) -> SnapshotRecord {
    SnapshotRecord { phrase: phrase.to_string(), count, last_updated_ms: 0, category: None }
}

fn single_shard_engine() -> Engine {
    let mut config = EngineConfig::default();
    config.shard_count = 1;
    Engine::new(config).unwrap()
}

#[test]
fn s1_simple_top_k_end_to_end() {
    let engine = single_shard_engine();
    engine
        .rebuild(&[
            rec("apple", 100),
            rec("application", 80),
            rec("apply", 60),
            rec("apricot", 40),
            rec("banana", 50),
        ])
        .unwrap();

    let ap = engine.suggest("ap", None, None, 0, None).unwrap();
    let phrases: Vec<_> = ap.iter().map(|s| s.phrase.clone()).collect();
    assert_eq!(phrases, vec!["apple", "application", "apply", "apricot"]);

    let b = engine.suggest("b", None, None, 0, None).unwrap();
    assert_eq!(b.len(), 1);
    assert_eq!(b[0].phrase, "banana");

    let z = engine.suggest("z", None, None, 0, None).unwrap();
    assert!(z.is_empty());
}

#[test]
fn prefix_case_is_normalized() {
    let engine = single_shard_engine();
    engine.rebuild(&[rec("apple", 10)]).unwrap();

    let lower = engine.suggest("ap", None, None, 0, None).unwrap();
    let mixed = engine.suggest("Ap", None, None, 100, None).unwrap();
    assert_eq!(
        lower.iter().map(|s| &s.phrase).collect::<Vec<_>>(),
        mixed.iter().map(|s| &s.phrase).collect::<Vec<_>>()
    );
}

#[test]
fn prefix_longer_than_any_phrase_is_empty() {
    let engine = single_shard_engine();
    engine.rebuild(&[rec("cat", 5)]).unwrap();
    assert!(engine.suggest("caterpillar", None, None, 0, None).unwrap().is_empty());
}
