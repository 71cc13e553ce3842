use std::sync::Arc;
use std::thread;

use suggest_store::config::EngineConfig;
use suggest_store::engine::Engine;
use suggest_store::phrase::SnapshotRecord;

fn rec(phrase: &str, count: u64) -> SnapshotRecord {
    SnapshotRecord { phrase: phrase.to_string(), count, last_updated_ms: 0, category: None }
}

#[test]
fn concurrent_submit_and_suggest_do_not_panic_or_deadlock() {
    let mut config = EngineConfig::default();
    config.shard_count = 4;
    let engine = Arc::new(Engine::new(config).unwrap());
    engine.rebuild(&[rec("apple", 100), rec("banana", 50), rec("cherry", 30)]).unwrap();

    let writers: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            thread::spawn(move || {
                for j in 0..200 {
                    let phrase = match (i + j) % 3 {
                        0 => "apple",
                        1 => "banana",
                        _ => "cherry",
                    };
                    let _ = engine.submit_event(phrase, j as i64, None);
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let _ = engine.suggest("a", None, None, 0, None);
                    let _ = engine.suggest("b", None, None, 0, None);
                }
            })
        })
        .collect();

    for w in writers {
        w.join().unwrap();
    }
    for r in readers {
        r.join().unwrap();
    }

    engine.flush_pipeline(1_000);
    engine.clear_cache();
    let results = engine.suggest("a", None, None, 1_000, None).unwrap();
    assert!(results.iter().any(|s| s.phrase == "apple"));
}

#[test]
fn per_user_personalization_is_isolated_across_users() {
    let mut config = EngineConfig::default();
    config.shard_count = 1;
    let engine = Engine::new(config).unwrap();
    engine.rebuild(&[rec("apple", 10), rec("apricot", 10)]).unwrap();

    engine.submit_event("apricot", 0, Some("alice")).unwrap();
    engine.flush_pipeline(0);

    let alice = engine.suggest("ap", Some("alice"), None, 0, None).unwrap();
    let bob = engine.suggest("ap", Some("bob"), None, 100, None).unwrap();
    assert_eq!(alice[0].phrase, "apricot");
    assert_eq!(bob[0].phrase, alice[1].phrase);
}
