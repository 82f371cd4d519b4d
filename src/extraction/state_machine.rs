//! Line-stream extraction for PDF-flattened shop lists.
//!
//! The machine is an explicit [`ExtractionState`] plus an [`ExtractionContext`]
//! threaded through [`transition`], one classified line at a time.

use crate::domain::model::{ExtractionOutcome, ShopRecord};
use crate::extraction::assembler::RecordAssembler;
use crate::extraction::classifier::{ClassifiedLine, LineClassifier, LineKind};
use crate::extraction::dedup::RecordSink;
use crate::extraction::policy::TokenModePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionState {
    LookingForCityHeader,
    ExpectingShopName,
    CollectingAddress,
    CollectingContactInfo,
}

#[derive(Debug, Clone)]
pub struct ExtractionContext {
    pub current_city: Option<String>,
    pub current_shop: Option<ShopRecord>,
    pub fragments: RecordAssembler,
}

impl ExtractionContext {
    pub fn new(max_address_fragments: usize) -> Self {
        Self {
            current_city: None,
            current_shop: None,
            fragments: RecordAssembler::new(max_address_fragments),
        }
    }

    /// Closes the shop under construction. Pending fragments become its address.
    /// Yields the shop only if it has both a name and a city.
    pub fn flush(&mut self) -> Option<ShopRecord> {
        let pending_address = self.fragments.finish();
        let mut shop = self.current_shop.take()?;
        if pending_address.is_some() {
            shop.address = pending_address;
        }
        shop.is_identified().then_some(shop)
    }
}

pub fn transition(
    state: ExtractionState,
    ctx: &mut ExtractionContext,
    line: &ClassifiedLine,
) -> (ExtractionState, Option<ShopRecord>) {
    use ExtractionState::*;

    match line.kind {
        LineKind::Blank | LineKind::Skipped => (state, None),

        LineKind::Terminator => {
            if ctx.current_shop.is_none() || ctx.fragments.is_empty() {
                return (state, None);
            }
            let address = ctx.fragments.finish();
            if let Some(shop) = ctx.current_shop.as_mut() {
                shop.address = address;
            }
            (CollectingContactInfo, None)
        }

        LineKind::Phone => {
            if let Some(shop) = ctx.current_shop.as_mut() {
                shop.set_phone_once(&line.text);
            }
            (state, None)
        }
        LineKind::Email => {
            if let Some(shop) = ctx.current_shop.as_mut() {
                shop.set_email_once(&line.text);
            }
            (state, None)
        }
        LineKind::Website => {
            if let Some(shop) = ctx.current_shop.as_mut() {
                shop.set_website_once(&line.text);
            }
            (state, None)
        }

        LineKind::CityHeader | LineKind::Text => match state {
            LookingForCityHeader | CollectingContactInfo => {
                if line.kind != LineKind::CityHeader {
                    // descriptive text after the contact block
                    return (state, None);
                }
                let emitted = ctx.flush();
                ctx.current_city = Some(line.text.clone());
                (ExpectingShopName, emitted)
            }
            ExpectingShopName => {
                let city = ctx.current_city.clone().unwrap_or_default();
                ctx.fragments.clear();
                ctx.current_shop = Some(ShopRecord::new(line.text.clone(), city));
                (CollectingAddress, None)
            }
            CollectingAddress => {
                ctx.fragments.push(&line.text);
                (CollectingAddress, None)
            }
        },
    }
}

/// PDF token-mode extractor: classify, fold through [`transition`], flush,
/// then gate and optionally de-duplicate.
#[derive(Debug, Clone)]
pub struct TokenStreamExtractor {
    classifier: LineClassifier,
    policy: TokenModePolicy,
}

impl TokenStreamExtractor {
    pub fn new(classifier: LineClassifier, policy: TokenModePolicy) -> Self {
        Self { classifier, policy }
    }

    pub fn extract(&self, text: &str) -> ExtractionOutcome {
        let lines = self.classifier.classify_lines(text);
        let mut ctx = ExtractionContext::new(self.policy.max_address_fragments);
        let mut state = ExtractionState::LookingForCityHeader;
        let mut sink = RecordSink::new(self.policy.gate, self.policy.deduplicate);

        for line in &lines {
            let (next, emitted) = transition(state, &mut ctx, line);
            if next != state {
                tracing::trace!(from = ?state, to = ?next, line = %line.text, "state change");
            }
            state = next;
            if let Some(shop) = emitted {
                sink.offer(shop);
            }
        }

        if let Some(shop) = ctx.flush() {
            sink.offer(shop);
        }

        let outcome = sink.finish();
        tracing::debug!(
            lines = lines.len(),
            emitted = outcome.stats.emitted,
            rejected = outcome.stats.rejected_by_gate,
            "token stream extraction finished"
        );
        outcome
    }
}
