use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use suggest_store::config::EngineConfig;
use suggest_store::engine::Engine;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

fn random_phrase(rng: &mut StdRng) -> String {
    let len = rng.random_range(2..12);
    (0..len).map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char).collect()
}

/// Feeds a batch of randomly generated phrases through ingest, flush
/// and suggest without panicking, and checks that the single
/// heaviest-submitted phrase for each starting letter actually surfaces
/// in that letter's suggestions — a cheap proxy for §8's ordering
/// guarantees under higher volume than the hand-picked scenario
/// fixtures exercise.
#[test]
fn random_event_stream_surfaces_the_heaviest_phrase_per_letter() {
    let mut config = EngineConfig::default();
    config.shard_count = 8;
    let engine = Engine::new(config).unwrap();
    engine.rebuild(&[]).unwrap();

    let mut rng = StdRng::seed_from_u64(42);
    let phrases: Vec<String> = (0..30).map(|_| random_phrase(&mut rng)).collect();

    let mut counts: std::collections::HashMap<String, u64> = std::collections::HashMap::new();
    for _ in 0..2000 {
        let phrase = &phrases[rng.random_range(0..phrases.len())];
        if engine.submit_event(phrase, 0, None).is_ok() {
            *counts.entry(phrase.clone()).or_insert(0) += 1;
        }
    }
    engine.flush_pipeline(0);

    let mut heaviest_per_letter: std::collections::HashMap<char, (String, u64)> =
        std::collections::HashMap::new();
    for (phrase, count) in &counts {
        let letter = phrase.chars().next().unwrap();
        let entry = heaviest_per_letter.entry(letter).or_insert_with(|| (phrase.clone(), 0));
        if *count > entry.1 {
            *entry = (phrase.clone(), *count);
        }
    }

    for (letter, (phrase, _count)) in heaviest_per_letter {
        let results = engine.suggest(&letter.to_string(), None, None, 0, None).unwrap();
        assert!(
            results.iter().any(|s| s.phrase == phrase),
            "expected heaviest phrase {phrase:?} for letter {letter:?} to surface"
        );
    }
}
