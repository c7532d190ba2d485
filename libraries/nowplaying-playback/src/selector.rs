//! Track selection policy
//!
//! Pure index arithmetic for moving through a playlist, sequentially or
//! shuffled. Randomness is injected so callers can seed it.

use rand::Rng;

/// Index of the track after `current`
///
/// - `total <= 1`: `current` (a lone track is its own successor)
/// - sequential: `(current + 1) % total`
/// - shuffling: uniform over `[0, total)`, never `current`
pub fn next_index<R: Rng + ?Sized>(current: usize, total: usize, shuffling: bool, rng: &mut R) -> usize {
    debug_assert!(total > 0, "next_index called on an empty playlist");

    if total <= 1 {
        return current;
    }

    if !shuffling {
        return (current + 1) % total;
    }

    loop {
        let candidate = rng.gen_range(0..total);
        if candidate != current {
            return candidate;
        }
    }
}

/// Index of the track before `current`
///
/// Always sequential, wrapping from the first track to the last. Shuffle
/// does not apply.
pub fn previous_index(current: usize, total: usize) -> usize {
    debug_assert!(total > 0, "previous_index called on an empty playlist");

    if total <= 1 {
        return current;
    }

    (current % total + total - 1) % total
}
