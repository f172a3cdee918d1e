//! Fresh identifiers for store keys and synthesized vertices.
//!
//! Everything that mints an id mid-migration takes an `&mut dyn IdAllocator`
//! so tests can pin the sequence and compare runs exactly.

use uuid::Uuid;

pub trait IdAllocator {
    fn fresh(&mut self) -> String;
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidAllocator;

impl IdAllocator for UuidAllocator {
    fn fresh(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// `<prefix>-1`, `<prefix>-2`, ...
#[derive(Debug, Clone)]
pub struct SequentialAllocator {
    prefix: String,
    next: u64,
}

impl SequentialAllocator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for SequentialAllocator {
    fn default() -> Self {
        Self::new("gen")
    }
}

impl IdAllocator for SequentialAllocator {
    fn fresh(&mut self) -> String {
        let id = format!("{}-{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_are_stable() {
        let mut ids = SequentialAllocator::new("k");
        assert_eq!(ids.fresh(), "k-1");
        assert_eq!(ids.fresh(), "k-2");
        assert_eq!(ids.issued(), 2);
    }

    #[test]
    fn uuid_ids_differ() {
        let mut ids = UuidAllocator;
        assert_ne!(ids.fresh(), ids.fresh());
    }
}
