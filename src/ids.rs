//! Identifier generation for mappings and legacy function nodes.
//!
//! Every component that mints ids takes an `IdGenerator` so id assignment stays
//! deterministic under test. `SequentialIds` is the default.

/// A source of fresh, unique identifiers.
pub trait IdGenerator {
    /// Returns a new identifier. The prefix names the kind of thing being identified
    /// (e.g. `"mapping"`), and implementations may fold it into the id.
    fn next_id(&mut self, prefix: &str) -> String;
}

/// A monotonic counter producing ids of the form `prefix-N`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting at `start` instead of zero, e.g. to continue after imported ids.
    pub fn starting_at(start: u64) -> Self {
        Self { next: start }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, prefix: &str) -> String {
        let id = self.next;
        self.next += 1;
        format!("{}-{}", prefix, id)
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_id(&mut self, prefix: &str) -> String {
        (**self).next_id(prefix)
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self, prefix: &str) -> String {
        (**self).next_id(prefix)
    }
}
