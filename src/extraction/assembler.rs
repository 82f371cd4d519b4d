/// Collects the address lines of the shop under construction.
///
/// Lines past the cap are dropped as they arrive; the joined result is never
/// truncated.
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    cap: usize,
    fragments: Vec<String>,
}

impl RecordAssembler {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            fragments: Vec::with_capacity(cap),
        }
    }

    /// Returns `false` when the fragment was discarded because the cap is reached.
    pub fn push(&mut self, fragment: &str) -> bool {
        if self.fragments.len() >= self.cap {
            tracing::trace!(fragment, cap = self.cap, "address fragment over cap, dropped");
            return false;
        }
        self.fragments.push(fragment.to_string());
        true
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn clear(&mut self) {
        self.fragments.clear();
    }

    /// Joins the buffered fragments with `", "` and empties the buffer.
    pub fn finish(&mut self) -> Option<String> {
        if self.fragments.is_empty() {
            return None;
        }
        let joined = join_address(&self.fragments);
        self.fragments.clear();
        (!joined.is_empty()).then_some(joined)
    }
}

pub fn join_address<S: AsRef<str>>(fragments: &[S]) -> String {
    let joined = fragments
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    joined.trim_end().trim_end_matches(',').trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_fragments_in_order() {
        let mut assembler = RecordAssembler::new(4);
        assembler.push("Valley View Mall");
        assembler.push("4802 Valley View Blvd");

        assert_eq!(
            assembler.finish().as_deref(),
            Some("Valley View Mall, 4802 Valley View Blvd")
        );
        assert!(assembler.is_empty());
    }

    #[test]
    fn test_strips_trailing_comma() {
        let mut assembler = RecordAssembler::new(4);
        assembler.push("Suite 5");
        assembler.push("123 Main St,");

        assert_eq!(assembler.finish().as_deref(), Some("Suite 5, 123 Main St"));
    }

    #[test]
    fn test_cap_discards_extra_fragments() {
        let mut assembler = RecordAssembler::new(2);
        assert!(assembler.push("one"));
        assert!(assembler.push("two"));
        assert!(!assembler.push("three"));

        assert_eq!(assembler.len(), 2);
        assert_eq!(assembler.finish().as_deref(), Some("one, two"));
    }

    #[test]
    fn test_empty_buffer_finishes_to_none() {
        let mut assembler = RecordAssembler::new(4);
        assert_eq!(assembler.finish(), None);

        assembler.push(",");
        assert_eq!(assembler.finish(), None);
    }
}
