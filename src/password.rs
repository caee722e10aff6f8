//! Random password generation for registrations that omit one.

use rand::seq::SliceRandom;
use rand::Rng;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIAL: &[u8] = b"!@#$%^&*()-_=+[]{};:,.<>?";

fn pick(rng: &mut impl Rng, set: &[u8]) -> char {
    set[rng.gen_range(0..set.len())] as char
}

/// Generate a password of `length` (min 4) with at least one character from
/// each class.
pub fn generate_strong(length: usize) -> String {
    let length = length.max(4);
    let mut rng = rand::thread_rng();
    let all: Vec<u8> = [LOWER, UPPER, DIGITS, SPECIAL].concat();
    let mut chars = vec![
        pick(&mut rng, LOWER),
        pick(&mut rng, UPPER),
        pick(&mut rng, DIGITS),
        pick(&mut rng, SPECIAL),
    ];
    while chars.len() < length {
        chars.push(pick(&mut rng, &all));
    }
    chars.shuffle(&mut rng);
    chars.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_requested_length() {
        assert_eq!(generate_strong(12).len(), 12);
        assert_eq!(generate_strong(20).len(), 20);
    }

    #[test]
    fn short_requests_are_raised_to_minimum() {
        assert_eq!(generate_strong(1).len(), 4);
    }

    #[test]
    fn contains_all_character_classes() {
        let pwd = generate_strong(12);
        assert!(pwd.bytes().any(|b| LOWER.contains(&b)));
        assert!(pwd.bytes().any(|b| UPPER.contains(&b)));
        assert!(pwd.bytes().any(|b| DIGITS.contains(&b)));
        assert!(pwd.bytes().any(|b| SPECIAL.contains(&b)));
    }
}
