use suggest_store::config::EngineConfig;
use suggest_store::engine::Engine;
use suggest_store::phrase::SnapshotRecord;

fn rec(phrase: &str, count: u64) -> SnapshotRecord {
    SnapshotRecord { phrase: phrase.to_string(), count, last_updated_ms: 0, category: None }
}

#[test]
fn law8_tie_break_by_popularity_then_phrase_end_to_end() {
    let mut config = EngineConfig::default();
    config.shard_count = 1;
    let engine = Engine::new(config).unwrap();
    engine.rebuild(&[rec("zeta", 10), rec("alpha", 10), rec("mid", 10)]).unwrap();

    let results = engine.suggest("", None, None, 0, None).unwrap();
    let phrases: Vec<_> = results.iter().map(|s| s.phrase.clone()).collect();
    assert_eq!(phrases, vec!["alpha", "mid", "zeta"]);
}

#[test]
fn respects_result_limit_from_config_and_override() {
    let mut config = EngineConfig::default();
    config.shard_count = 1;
    config.top_k_per_node = 20;
    config.result_limit = 5;
    let engine = Engine::new(config).unwrap();

    let snapshot: Vec<_> = (0..20).map(|i| rec(&format!("p{i:02}", ), i)).collect();
    engine.rebuild(&snapshot).unwrap();

    let default_limit = engine.suggest("p", None, None, 0, None).unwrap();
    assert_eq!(default_limit.len(), 5);

    let overridden = engine.suggest("p", None, Some(3), 100, None).unwrap();
    assert_eq!(overridden.len(), 3);
}

#[test]
fn deadline_of_zero_still_returns_a_usable_answer() {
    let mut config = EngineConfig::default();
    config.shard_count = 1;
    let engine = Engine::new(config).unwrap();
    engine.rebuild(&[rec("apple", 100), rec("apply", 50)]).unwrap();

    let results = engine.suggest("ap", None, None, 0, Some(0)).unwrap();
    assert!(!results.is_empty());
    assert_eq!(results[0].phrase, "apple");
}
