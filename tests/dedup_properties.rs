//! Property-based tests for the dedup consumer
//!
//! **Property 4: one line per key** - for any message sequence, exactly one
//! line is written per distinct key and the final count of each key equals
//! the number of messages that carried it.

use crossbeam_channel::bounded;
use proptest::prelude::*;
use std::collections::HashMap;
use std::thread;
use vcf_intersect::pipeline::{Deduplicator, ResultMessage};
use vcf_intersect::VariantKey;

fn arb_key() -> impl Strategy<Value = (String, u64, String, String)> {
    (
        prop_oneof![Just("1".to_string()), Just("chr2".to_string()), Just("X".to_string())],
        1u64..50,
        prop_oneof![Just("A".to_string()), Just("C".to_string())],
        prop_oneof![Just("G".to_string()), Just("T".to_string()), Just("GT".to_string())],
    )
}

fn to_message(index: usize, (chrom, pos, r, a): &(String, u64, String, String)) -> ResultMessage {
    let pos = pos.to_string();
    ResultMessage {
        key: VariantKey::new(chrom, &pos, r, a),
        line: format!("{}\t{}\t{}\t{}\t{}\tmsg{}\n", chrom, pos, r, a, "PASS", index).into_bytes(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_one_line_per_key(keys in prop::collection::vec(arb_key(), 0..200)) {
        let messages: Vec<ResultMessage> =
            keys.iter().enumerate().map(|(i, k)| to_message(i, k)).collect();

        let mut expected: HashMap<VariantKey, usize> = HashMap::new();
        for m in &messages {
            *expected.entry(m.key.clone()).or_default() += 1;
        }

        let mut out = Vec::new();
        let mut dedup = Deduplicator::new(&mut out);
        for m in messages.iter().cloned() {
            dedup.accept(m).unwrap();
        }
        let seen = dedup.finish().unwrap();

        let text = String::from_utf8(out).unwrap();
        prop_assert_eq!(text.lines().count(), expected.len());
        prop_assert_eq!(seen.len(), expected.len());
        prop_assert_eq!(seen.total(), messages.len());
        for (key, count) in &expected {
            prop_assert_eq!(seen.count(key), *count);
        }

        // The written line for each key is its first message
        for m in &messages {
            let first = messages.iter().find(|o| o.key == m.key).unwrap();
            let line = String::from_utf8(first.line.clone()).unwrap();
            prop_assert!(text.contains(&line));
        }
    }

    #[test]
    fn prop_counts_independent_of_producer_interleaving(
        keys in prop::collection::vec(arb_key(), 1..100),
        producers in 1usize..6,
    ) {
        let messages: Vec<ResultMessage> =
            keys.iter().enumerate().map(|(i, k)| to_message(i, k)).collect();

        let (tx, rx) = bounded(4);
        let handles: Vec<_> = (0..producers)
            .map(|p| {
                let tx = tx.clone();
                let share: Vec<ResultMessage> = messages
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| i % producers == p)
                    .map(|(_, m)| m.clone())
                    .collect();
                thread::spawn(move || {
                    for m in share {
                        tx.send(m).unwrap();
                    }
                })
            })
            .collect();
        drop(tx);

        let mut out = Vec::new();
        let seen = Deduplicator::new(&mut out).drain(rx).unwrap();
        for h in handles {
            h.join().unwrap();
        }

        let mut expected: HashMap<VariantKey, usize> = HashMap::new();
        for m in &messages {
            *expected.entry(m.key.clone()).or_default() += 1;
        }
        prop_assert_eq!(seen.len(), expected.len());
        for (key, count) in &expected {
            prop_assert_eq!(seen.count(key), *count);
        }
        prop_assert_eq!(String::from_utf8(out).unwrap().lines().count(), expected.len());
    }
}
