use crate::identifiers::GemId;

/// Hands out gem ids in increasing order. A cloned generator continues from the
/// same point as the original, so ids are unique within one board but a
/// simulated copy may reuse ids that the live board issues later.
#[derive(Debug, Clone)]
pub struct GemIdGenerator {
    next: u64,
}

impl GemIdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> GemId {
        let id = GemId::new(self.next);
        self.next += 1;
        id
    }

    pub fn issued(&self) -> u64 {
        self.next - 1
    }
}

impl Default for GemIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let mut generator = GemIdGenerator::new();
        let first = generator.next_id();
        let second = generator.next_id();

        assert!(second > first);
        assert_eq!(generator.issued(), 2);
    }

    #[test]
    fn test_cloned_generator_continues_from_same_point() {
        let mut generator = GemIdGenerator::new();
        generator.next_id();
        let mut copy = generator.clone();

        assert_eq!(generator.next_id(), copy.next_id());
    }
}
