//! Block-mode extraction for the HTML shop list.
//!
//! Each city section holds verse blocks; every bold name inside a block marks
//! a shop whose details follow on the next few lines.

use crate::domain::model::{ExtractionOutcome, ShopRecord};
use crate::extraction::assembler::RecordAssembler;
use crate::extraction::classifier::{LineClassifier, LineKind};
use crate::extraction::dedup::RecordSink;
use crate::extraction::policy::BlockModePolicy;

/// Text of one preformatted block and the shop names highlighted in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseBlock {
    pub text: String,
    pub names: Vec<String>,
}

/// Everything between one city heading and the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlSection {
    pub city: String,
    pub blocks: Vec<VerseBlock>,
}

/// Fills in a shop from the lines that follow its name inside `text`.
///
/// At most `lookahead` non-blank lines after the name are considered. Email and
/// phone lines fill their field once; the first other line is the address, and a
/// second unclassified line ends the scan.
pub fn parse_shop_from_block(
    classifier: &LineClassifier,
    text: &str,
    name: &str,
    city: &str,
    lookahead: usize,
) -> ShopRecord {
    let mut shop = ShopRecord::new(name, city);
    let mut address = RecordAssembler::new(1);
    let mut found = false;
    let mut considered = 0;

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.contains(name) {
            found = true;
            continue;
        }
        if !found {
            continue;
        }

        considered += 1;
        if considered > lookahead {
            break;
        }

        match classifier.classify(line).kind {
            LineKind::Email => shop.set_email_once(line),
            LineKind::Phone => shop.set_phone_once(line),
            _ if address.is_empty() => {
                address.push(line);
            }
            _ => break,
        }
    }

    shop.address = address.finish();
    shop
}

#[derive(Debug, Clone)]
pub struct HtmlBlockExtractor {
    classifier: LineClassifier,
    policy: BlockModePolicy,
}

impl HtmlBlockExtractor {
    pub fn new(classifier: LineClassifier, policy: BlockModePolicy) -> Self {
        Self { classifier, policy }
    }

    pub fn extract(&self, sections: &[HtmlSection]) -> ExtractionOutcome {
        let mut sink = RecordSink::new(self.policy.gate, self.policy.deduplicate);

        for section in sections {
            for block in &section.blocks {
                for name in &block.names {
                    let name = name.trim();
                    if name.is_empty() || self.policy.skips_name(name) {
                        continue;
                    }

                    let shop = parse_shop_from_block(
                        &self.classifier,
                        &block.text,
                        name,
                        &section.city,
                        self.policy.lookahead_lines,
                    );
                    sink.offer(shop);
                }
            }
        }

        let outcome = sink.finish();
        tracing::debug!(
            sections = sections.len(),
            emitted = outcome.stats.emitted,
            duplicates = outcome.stats.duplicates,
            rejected = outcome.stats.rejected_by_gate,
            "html block extraction finished"
        );
        outcome
    }
}
