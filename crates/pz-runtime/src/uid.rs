/// Issues node-state uids for one session. Seeded from `PuzzleState::next_state_uid`
/// and threaded explicitly so independent sessions never share a counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UidGenerator {
    next: u64,
}

impl UidGenerator {
    pub fn new(seed: u64) -> Self {
        Self { next: seed }
    }

    pub fn next_uid(&mut self) -> u64 {
        let uid = self.next;
        self.next += 1;
        uid
    }

    pub fn peek(&self) -> u64 {
        self.next
    }
}

#[cfg(test)]
mod uid_tests {
    use super::*;

    #[test]
    fn next_uid_returns_seed_then_increments() {
        let mut uids = UidGenerator::new(7);
        assert_eq!(uids.next_uid(), 7);
        assert_eq!(uids.next_uid(), 8);
        assert_eq!(uids.peek(), 9);
    }
}
