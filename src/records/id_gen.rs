//! Record identifier generation

use rand::rngs::ThreadRng;
use rand::Rng;

/// Symbols a generated id is drawn from.
pub const ID_ALPHABET: &[u8; 62] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of ids produced by [`RandomIdGenerator::new`].
pub const DEFAULT_ID_LENGTH: usize = 30;

/// Produces identifiers for new records.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Draws every character independently and uniformly from [`ID_ALPHABET`].
///
/// Uniqueness is probabilistic only; nothing checks a fresh id against the
/// ids already stored.
#[derive(Debug, Clone)]
pub struct RandomIdGenerator<R = ThreadRng> {
    rng: R,
    length: usize,
}

impl RandomIdGenerator<ThreadRng> {
    pub fn new() -> Self {
        Self::with_rng(rand::thread_rng())
    }
}

impl Default for RandomIdGenerator<ThreadRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomIdGenerator<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            rng,
            length: DEFAULT_ID_LENGTH,
        }
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }
}

impl<R: Rng> IdGenerator for RandomIdGenerator<R> {
    fn next_id(&mut self) -> String {
        (0..self.length)
            .map(|_| char::from(ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_default_ids_are_30_alphanumeric_chars() {
        let mut ids = RandomIdGenerator::new();
        for _ in 0..100 {
            let id = ids.next_id();
            assert_eq!(id.len(), DEFAULT_ID_LENGTH);
            assert!(id.bytes().all(|b| b.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn test_seeded_generator_is_deterministic() {
        let mut a = RandomIdGenerator::with_rng(StdRng::seed_from_u64(7));
        let mut b = RandomIdGenerator::with_rng(StdRng::seed_from_u64(7));
        assert_eq!(a.next_id(), b.next_id());
        assert_eq!(a.next_id(), b.next_id());
    }

    #[test]
    fn test_custom_length() {
        let mut ids = RandomIdGenerator::with_rng(StdRng::seed_from_u64(1)).with_length(8);
        assert_eq!(ids.next_id().len(), 8);
    }

    #[test]
    fn test_every_symbol_is_reachable() {
        let mut ids = RandomIdGenerator::with_rng(StdRng::seed_from_u64(42));
        let seen: HashSet<u8> = (0..200).flat_map(|_| ids.next_id().into_bytes()).collect();
        assert_eq!(seen.len(), ID_ALPHABET.len());
    }
}
