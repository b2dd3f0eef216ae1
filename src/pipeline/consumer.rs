//! Dedup consumer
//!
//! The single reader of the results queue. It owns the seen set outright,
//! so no locking is involved: workers only ever hand it messages.

use crate::formats::VariantKey;
use crossbeam_channel::Receiver;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::io::{self, Write};

/// A matching record published by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultMessage {
    pub key: VariantKey,
    /// Original record bytes, terminator included
    pub line: Vec<u8>,
}

/// Occurrence count per variant key
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeenSet {
    counts: HashMap<VariantKey, usize>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one occurrence of `key`; true when it had not been seen before
    pub fn record(&mut self, key: VariantKey) -> bool {
        match self.counts.entry(key) {
            Entry::Occupied(mut seen) => {
                *seen.get_mut() += 1;
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(1);
                true
            }
        }
    }

    /// Occurrences of `key` so far (0 if never seen)
    pub fn count(&self, key: &VariantKey) -> usize {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&VariantKey, usize)> {
        self.counts.iter().map(|(k, &v)| (k, v))
    }

    /// Counts ordered by key, for stable reporting
    pub fn sorted(&self) -> Vec<(&VariantKey, usize)> {
        let mut counts: Vec<_> = self.iter().collect();
        counts.sort_unstable_by(|a, b| a.0.cmp(b.0));
        counts
    }
}

/// First-seen-wins line emitter
///
/// When the same key arrives from several files, whichever message reaches
/// the queue first is written; arrival order across workers is not
/// deterministic, and no tie-break is imposed.
pub struct Deduplicator<W: Write> {
    out: W,
    seen: SeenSet,
}

impl<W: Write> Deduplicator<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            seen: SeenSet::new(),
        }
    }

    /// Handle one message; returns true if its line was written
    pub fn accept(&mut self, message: ResultMessage) -> io::Result<bool> {
        let ResultMessage { key, line } = message;
        if self.seen.record(key) {
            self.out.write_all(&line)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Drain the queue until every sender is gone, then flush
    pub fn drain(mut self, results: Receiver<ResultMessage>) -> io::Result<SeenSet> {
        for message in results {
            self.accept(message)?;
        }
        self.finish()
    }

    /// Flush output and hand back the seen set
    pub fn finish(mut self) -> io::Result<SeenSet> {
        self.out.flush()?;
        Ok(self.seen)
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }
}
