//! Free-text to shop-record extraction.
//!
//! [`classifier`] tags single lines, [`state_machine`] folds PDF-flattened text
//! into records, [`html_block`] handles the HTML list's verse blocks, and
//! [`dedup`] filters the emitted sequence.

pub mod assembler;
pub mod classifier;
pub mod dedup;
pub mod html_block;
pub mod policy;
pub mod state_machine;

pub use assembler::RecordAssembler;
pub use classifier::{CityHeaderStrategy, ClassifiedLine, LineClassifier, LineKind};
pub use dedup::{Deduplicator, RecordSink};
pub use html_block::{HtmlBlockExtractor, HtmlSection, VerseBlock};
pub use policy::{AcceptanceGate, BlockModePolicy, TokenModePolicy};
pub use state_machine::{ExtractionContext, ExtractionState, TokenStreamExtractor};
