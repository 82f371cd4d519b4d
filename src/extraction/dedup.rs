use std::collections::HashSet;

use crate::domain::model::{ExtractionOutcome, ExtractionStats, ShopRecord};
use crate::extraction::policy::AcceptanceGate;

/// Remembers the (name, city) keys already emitted during one extraction run.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(name: &str, city: &str) -> String {
        format!("{}|{}", name.to_lowercase(), city.to_lowercase())
    }

    /// `true` the first time a key is offered, `false` afterwards.
    pub fn admit(&mut self, shop: &ShopRecord) -> bool {
        self.seen.insert(Self::key(&shop.name, &shop.city))
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Final stage of both extractors: acceptance gate, optional de-duplication,
/// and the emitted sequence in input order.
#[derive(Debug)]
pub struct RecordSink {
    gate: AcceptanceGate,
    dedup: Option<Deduplicator>,
    outcome: ExtractionOutcome,
}

impl RecordSink {
    pub fn new(gate: AcceptanceGate, deduplicate: bool) -> Self {
        Self {
            gate,
            dedup: deduplicate.then(Deduplicator::new),
            outcome: ExtractionOutcome::default(),
        }
    }

    pub fn offer(&mut self, shop: ShopRecord) {
        if !self.gate.accepts(&shop) {
            tracing::debug!(name = %shop.name, city = %shop.city, "shop rejected by acceptance gate");
            self.outcome.stats.rejected_by_gate += 1;
            return;
        }
        if let Some(dedup) = self.dedup.as_mut() {
            if !dedup.admit(&shop) {
                tracing::debug!(name = %shop.name, city = %shop.city, "duplicate shop skipped");
                self.outcome.stats.duplicates += 1;
                return;
            }
        }
        self.outcome.stats.emitted += 1;
        self.outcome.shops.push(shop);
    }

    pub fn stats(&self) -> &ExtractionStats {
        &self.outcome.stats
    }

    pub fn finish(self) -> ExtractionOutcome {
        self.outcome
    }
}
