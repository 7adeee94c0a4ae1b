//! Human-readable payment references.
//!
//! A member types the reference into the Multicaixa Express app to tag
//! their bank transfer; an admin later matches it against the statement.
//! The timestamp component keeps references roughly sortable by issue
//! time, the random tail makes same-millisecond collisions unlikely.
//! References are a bookkeeping handle, not a security token: the store's
//! (user, subject) unique index is what prevents double enrollment.

use chrono::Utc;
use rand::Rng;

pub const REFERENCE_PREFIX: &str = "JU10";

const RANDOM_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a fresh reference: `JU10-<base36 millis>-<6 random base36>`,
/// upper-cased. Pure and total apart from reading the clock and RNG.
pub fn generate_reference() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();
    let tail: String = (0..RANDOM_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    format!("{}-{}-{}", REFERENCE_PREFIX, to_base36(millis), tail).to_uppercase()
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).expect("base36 digits are ascii")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_base36_upper(s: &str) -> bool {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
    }

    #[test]
    fn reference_matches_expected_shape() {
        let reference = generate_reference();
        let parts: Vec<&str> = reference.split('-').collect();
        assert_eq!(parts.len(), 3, "reference was {}", reference);
        assert_eq!(parts[0], REFERENCE_PREFIX);
        assert!(is_base36_upper(parts[1]));
        assert_eq!(parts[2].len(), RANDOM_LEN);
        assert!(is_base36_upper(parts[2]));
    }

    #[test]
    fn ten_thousand_references_are_distinct() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            assert!(seen.insert(generate_reference()));
        }
    }

    #[test]
    fn base36_encodes_zero_and_round_numbers() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
