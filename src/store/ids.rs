//! Id generation for locally created users.

use super::UserId;

/// Source of candidate ids for new users.
///
/// The store re-draws while a candidate is already taken, so implementations
/// only need to avoid repeating themselves. A generator that keeps returning
/// taken ids is given a bounded number of draws, after which the store uses
/// one past the largest id it holds.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> UserId;
}

/// Monotonic counter.
#[derive(Clone, Debug)]
pub struct SequentialIds {
    next: UserId,
}

impl SequentialIds {
    pub fn starting_at(first: UserId) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> UserId {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

impl<F> IdGenerator for F
where
    F: FnMut() -> UserId + Send,
{
    fn next_id(&mut self) -> UserId {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up_from_start() {
        let mut ids = SequentialIds::starting_at(100);
        assert_eq!(ids.next_id(), 100);
        assert_eq!(ids.next_id(), 101);
        assert_eq!(ids.next_id(), 102);
    }

    #[test]
    fn closures_are_generators() {
        let mut n = 0;
        let mut ids = move || {
            n += 10;
            n
        };
        assert_eq!(IdGenerator::next_id(&mut ids), 10);
        assert_eq!(IdGenerator::next_id(&mut ids), 20);
    }
}
