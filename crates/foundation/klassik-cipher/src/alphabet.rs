//! Alphabets
//!
//! The ciphers substitute over the 26-letter Latin alphabet. The analysis
//! routines clean text against a wider set that also keeps the Azerbaijani
//! letters. The two sets are never mixed.

/// Latin alphabet, lowercase.
pub const LATIN_LOWER: &str = "abcdefghijklmnopqrstuvwxyz";

/// Latin alphabet, uppercase.
pub const LATIN_UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Length `m` of the cipher alphabet.
pub const ALPHABET_LEN: i64 = 26;

/// Azerbaijani capitals that are not in the Latin alphabet.
pub const AZERBAIJANI_EXTRA: [char; 7] = ['Ç', 'Ə', 'Ğ', 'İ', 'Ö', 'Ş', 'Ü'];

/// The 32-letter Azerbaijani alphabet in dictionary order.
pub const AZERBAIJANI: [char; 32] = [
    'A', 'B', 'C', 'Ç', 'D', 'E', 'Ə', 'F', 'G', 'Ğ', 'H', 'X', 'I', 'İ', 'J', 'K',
    'Q', 'L', 'M', 'N', 'O', 'Ö', 'P', 'R', 'S', 'Ş', 'T', 'U', 'Ü', 'V', 'Y', 'Z',
];

/// Every symbol kept by [`clean_extended`], in Azerbaijani order with the
/// Latin-only `W` slotted after `V`.
pub const EXTENDED: [char; 33] = [
    'A', 'B', 'C', 'Ç', 'D', 'E', 'Ə', 'F', 'G', 'Ğ', 'H', 'X', 'I', 'İ', 'J', 'K',
    'Q', 'L', 'M', 'N', 'O', 'Ö', 'P', 'R', 'S', 'Ş', 'T', 'U', 'Ü', 'V', 'W', 'Y',
    'Z',
];

/// Position of a Latin letter and whether it was uppercase.
pub fn latin_index(c: char) -> Option<(i64, bool)> {
    if c.is_ascii_lowercase() {
        Some((i64::from(c as u8 - b'a'), false))
    } else if c.is_ascii_uppercase() {
        Some((i64::from(c as u8 - b'A'), true))
    } else {
        None
    }
}

/// Latin letter at `index`, which must already be reduced into `0..26`.
pub fn latin_letter(index: i64, upper: bool) -> char {
    let base = if upper { b'A' } else { b'a' };
    (base + index as u8) as char
}

/// Is `c` an (uppercase) member of the extended analysis alphabet?
pub fn is_extended(c: char) -> bool {
    c.is_ascii_uppercase() || AZERBAIJANI_EXTRA.contains(&c)
}

/// Uppercase `text` and keep only extended-alphabet letters.
pub fn clean_extended(text: &str) -> Vec<char> {
    text.chars()
        .flat_map(char::to_uppercase)
        .filter(|&c| is_extended(c))
        .collect()
}
