//! Classic Ciphers
//!
//! Caesar, Affine and Vigenère over the 26-letter Latin alphabet.
//! Case is preserved and anything outside the alphabet is copied through.

use crate::alphabet::{self, ALPHABET_LEN};
use crate::modular::{gcd, mod_inverse, modulo};
use crate::{Error, Result};
use tracing::{debug, trace};

/// Key used when a Vigenère key has no Latin letters left after cleaning.
pub const DEFAULT_VIGENERE_KEY: &str = "acar";

pub struct Cipher;

impl Cipher {
    // ═══════════════════════════════════════════════════════════
    // CAESAR CIPHER
    // ═══════════════════════════════════════════════════════════

    pub fn caesar_encrypt(input: &str, shift: i32) -> String {
        shift_letters(input, i64::from(shift))
    }

    pub fn caesar_decrypt(input: &str, shift: i32) -> String {
        shift_letters(input, -i64::from(shift))
    }

    /// Brute force all 26 Caesar shifts
    pub fn caesar_bruteforce(input: &str) -> Vec<(i32, String)> {
        (0..26).map(|shift| {
            (shift, Self::caesar_decrypt(input, shift))
        }).collect()
    }

    // ═══════════════════════════════════════════════════════════
    // AFFINE CIPHER
    // ═══════════════════════════════════════════════════════════

    pub fn affine_encrypt(input: &str, a: i32, b: i32) -> Result<String> {
        let (a, b) = (i64::from(a), i64::from(b));
        check_multiplier(a)?;

        Ok(map_letters(input, |x| modulo(a * x + b, ALPHABET_LEN)))
    }

    pub fn affine_decrypt(input: &str, a: i32, b: i32) -> Result<String> {
        let (a, b) = (i64::from(a), i64::from(b));
        check_multiplier(a)?;
        let a_inv = mod_inverse(a, ALPHABET_LEN)
            .ok_or(Error::NotCoprime { a, m: ALPHABET_LEN })?;

        Ok(map_letters(input, |y| modulo(a_inv * (y - b), ALPHABET_LEN)))
    }

    // ═══════════════════════════════════════════════════════════
    // VIGENÈRE CIPHER
    // ═══════════════════════════════════════════════════════════

    /// Reduce a raw key to lowercase Latin letters.
    ///
    /// Falls back to `fallback`, then to [`DEFAULT_VIGENERE_KEY`], so the
    /// result is never empty.
    pub fn vigenere_key(key: &str, fallback: &str) -> String {
        [key, fallback, DEFAULT_VIGENERE_KEY]
            .iter()
            .map(|candidate| {
                candidate
                    .chars()
                    .map(|c| c.to_ascii_lowercase())
                    .filter(char::is_ascii_lowercase)
                    .collect::<String>()
            })
            .find(|processed| !processed.is_empty())
            .unwrap_or_else(|| DEFAULT_VIGENERE_KEY.to_string())
    }

    pub fn vigenere_encrypt(input: &str, key: &str) -> String {
        vigenere(input, key, 1)
    }

    pub fn vigenere_decrypt(input: &str, key: &str) -> String {
        vigenere(input, key, -1)
    }
}

fn check_multiplier(a: i64) -> Result<()> {
    if gcd(a, ALPHABET_LEN) != 1 {
        debug!(a, m = ALPHABET_LEN, "rejecting affine multiplier");
        return Err(Error::NotCoprime { a, m: ALPHABET_LEN });
    }
    Ok(())
}

/// Replace every Latin letter by `f(index)`, keeping its case.
fn map_letters(input: &str, f: impl Fn(i64) -> i64) -> String {
    input.chars().map(|c| match alphabet::latin_index(c) {
        Some((index, upper)) => alphabet::latin_letter(f(index), upper),
        None => c,
    }).collect()
}

fn shift_letters(input: &str, shift: i64) -> String {
    map_letters(input, |x| modulo(x + shift, ALPHABET_LEN))
}

/// `direction` is `1` to encrypt, `-1` to decrypt.
fn vigenere(input: &str, key: &str, direction: i64) -> String {
    let key = Cipher::vigenere_key(key, DEFAULT_VIGENERE_KEY);
    let shifts: Vec<i64> = key
        .chars()
        .filter_map(alphabet::latin_index)
        .map(|(k, _)| k)
        .collect();
    trace!(key = %key, direction, "vigenere");

    let mut key_idx = 0;
    input.chars().map(|c| match alphabet::latin_index(c) {
        Some((index, upper)) => {
            let shift = shifts[key_idx % shifts.len()];
            let shifted = modulo(index + direction * shift, ALPHABET_LEN);
            key_idx += 1;
            alphabet::latin_letter(shifted, upper)
        }
        None => c,
    }).collect()
}
