//! Playfair Cipher
//!
//! Digraph substitution on a 6x6 square sized for the Azerbaijani alphabet.
//! There is no `J` in the working alphabet: it is written as `İ` in both key
//! and text.

use crate::alphabet;
use serde::Serialize;
use tracing::trace;

pub const SQUARE_SIZE: usize = 6;

/// Letter inserted between doubled letters and after a lone final letter.
pub const FILLER: char = 'X';

/// Order used to fill the square after the key letters. Every letter that
/// survives cleaning is here, so any cleaned letter can be located. Digits
/// past the 36th cell are copied through unchanged.
const FILL_SEQUENCE: &str = "ABCDEFGHIKLMNOPQRSTUVWXYZÇƏĞİÖŞÜ0123456789";

/// Key cleaning: uppercase, keep extended-alphabet letters, map `J` to `İ`.
pub fn clean_key(key: &str) -> Vec<char> {
    alphabet::clean_extended(key)
        .into_iter()
        .map(without_j)
        .collect()
}

/// Text cleaning. Digits are kept as well, since they fill the tail of the
/// square and show up in ciphertext.
pub fn clean_text(text: &str) -> Vec<char> {
    text.chars()
        .flat_map(char::to_uppercase)
        .filter(|&c| alphabet::is_extended(c) || c.is_ascii_digit())
        .map(without_j)
        .collect()
}

fn without_j(c: char) -> char {
    if c == 'J' { 'İ' } else { c }
}

/// Split cleaned text into pairs. A doubled letter gets a filler and only
/// the first of the two is consumed; a lone final letter is paired with the
/// filler.
pub fn digraphs(text: &str) -> Vec<(char, char)> {
    let letters = clean_text(text);
    let mut pairs = Vec::with_capacity(letters.len() / 2 + 1);

    let mut i = 0;
    while i < letters.len() {
        match letters.get(i + 1) {
            None => {
                pairs.push((letters[i], FILLER));
                i += 1;
            }
            Some(&next) if next == letters[i] => {
                pairs.push((letters[i], FILLER));
                i += 1;
            }
            Some(&next) => {
                pairs.push((letters[i], next));
                i += 2;
            }
        }
    }
    pairs
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayfairSquare {
    cells: [[char; SQUARE_SIZE]; SQUARE_SIZE],
}

impl PlayfairSquare {
    /// Key letters first (deduplicated), then the fill sequence, row-major.
    pub fn new(key: &str) -> Self {
        let mut placed: Vec<char> = Vec::with_capacity(SQUARE_SIZE * SQUARE_SIZE);
        for c in clean_key(key).into_iter().chain(FILL_SEQUENCE.chars()) {
            if placed.len() == SQUARE_SIZE * SQUARE_SIZE {
                break;
            }
            if !placed.contains(&c) {
                placed.push(c);
            }
        }

        let mut cells = [[' '; SQUARE_SIZE]; SQUARE_SIZE];
        for (i, c) in placed.into_iter().enumerate() {
            cells[i / SQUARE_SIZE][i % SQUARE_SIZE] = c;
        }
        Self { cells }
    }

    pub fn rows(&self) -> &[[char; SQUARE_SIZE]; SQUARE_SIZE] {
        &self.cells
    }

    pub fn position(&self, c: char) -> Option<(usize, usize)> {
        self.cells.iter().enumerate().find_map(|(row, cells)| {
            cells.iter().position(|&cell| cell == c).map(|col| (row, col))
        })
    }

    pub fn encrypt(&self, text: &str) -> String {
        trace!("playfair encrypt");
        self.apply(text, 1)
    }

    pub fn decrypt(&self, text: &str) -> String {
        trace!("playfair decrypt");
        self.apply(text, SQUARE_SIZE - 1)
    }

    /// `step` is 1 to move right/down, `SQUARE_SIZE - 1` to move left/up.
    fn apply(&self, text: &str, step: usize) -> String {
        let mut result = String::new();
        for (a, b) in digraphs(text) {
            match (self.position(a), self.position(b)) {
                (Some(pa), Some(pb)) => {
                    let (x, y) = self.substitute(pa, pb, step);
                    result.push(x);
                    result.push(y);
                }
                _ => {
                    result.push(a);
                    result.push(b);
                }
            }
        }
        result
    }

    fn substitute(
        &self,
        (ra, ca): (usize, usize),
        (rb, cb): (usize, usize),
        step: usize,
    ) -> (char, char) {
        let n = SQUARE_SIZE;
        if ra == rb {
            (self.cells[ra][(ca + step) % n], self.cells[rb][(cb + step) % n])
        } else if ca == cb {
            (self.cells[(ra + step) % n][ca], self.cells[(rb + step) % n][cb])
        } else {
            (self.cells[ra][cb], self.cells[rb][ca])
        }
    }

    /// Grid as text, one row per line.
    pub fn render(&self) -> String {
        self.cells
            .iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect::<Vec<_>>().join(" "))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for PlayfairSquare {
    fn default() -> Self {
        Self::new("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_fill() {
        let square = PlayfairSquare::new("Playfair Example");
        assert_eq!(square.rows()[0], ['P', 'L', 'A', 'Y', 'F', 'I']);
        assert_eq!(square.rows()[1], ['R', 'E', 'X', 'M', 'B', 'C']);

        let mut all: Vec<char> = square.rows().iter().flatten().copied().collect();
        assert_eq!(all.len(), 36);
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 36);
        assert!(square.position('J').is_none());
        assert!(square.position('İ').is_some());
    }

    #[test]
    fn test_key_j_becomes_dotted_i() {
        let square = PlayfairSquare::new("jam");
        assert_eq!(&square.rows()[0][..3], &['İ', 'A', 'M']);
    }

    #[test]
    fn test_default_square_ends_with_digits() {
        let square = PlayfairSquare::default();
        assert_eq!(square.rows()[0], ['A', 'B', 'C', 'D', 'E', 'F']);
        assert_eq!(square.rows()[4], ['Z', 'Ç', 'Ə', 'Ğ', 'İ', 'Ö']);
        assert_eq!(square.rows()[5], ['Ş', 'Ü', '0', '1', '2', '3']);
    }

    #[test]
    fn test_digraphs() {
        assert_eq!(digraphs("hello"), vec![('H', 'E'), ('L', 'X'), ('L', 'O')]);
        assert_eq!(digraphs("ab c"), vec![('A', 'B'), ('C', 'X')]);
        assert_eq!(digraphs("Jam"), vec![('İ', 'A'), ('M', 'X')]);
        assert_eq!(digraphs("1 2 3"), vec![('1', '2'), ('3', 'X')]);
        assert!(digraphs("!?").is_empty());
    }

    #[test]
    fn test_pair_rules() {
        let square = PlayfairSquare::default();
        // Row 0: A B C D E F
        assert_eq!(square.encrypt("AB"), "BC");
        assert_eq!(square.encrypt("EF"), "FA");
        // Column 0: A G N T Z Ş
        assert_eq!(square.encrypt("AG"), "GN");
        assert_eq!(square.encrypt("ZA"), "ŞG");
        // Rectangle
        assert_eq!(square.encrypt("AH"), "BG");

        assert_eq!(square.decrypt("BC"), "AB");
        assert_eq!(square.decrypt("FA"), "EF");
        assert_eq!(square.decrypt("GN"), "AG");
        assert_eq!(square.decrypt("ŞG"), "ZA");
        assert_eq!(square.decrypt("BG"), "AH");
    }

    #[test]
    fn test_round_trip() {
        let square = PlayfairSquare::new("monarchy");
        let encrypted = square.encrypt("instruments");
        assert_eq!(encrypted.chars().count() % 2, 0);
        assert_eq!(square.decrypt(&encrypted), "INSTRUMENTSX");
    }

    #[test]
    fn test_digits_in_ciphertext_survive_decryption() {
        let square = PlayfairSquare::default();
        assert_eq!(square.encrypt("şü"), "Ü0");
        assert_eq!(square.decrypt("Ü0"), "ŞÜ");
        // 7 is not in the square and travels through with its partner
        assert_eq!(square.encrypt("7A"), "7A");
    }

    #[test]
    fn test_round_trip_with_filler() {
        let square = PlayfairSquare::new("Azərbaycan");
        let encrypted = square.encrypt("balloon şəhər");
        assert_eq!(square.decrypt(&encrypted), "BALXLOONŞƏHƏRX");
    }
}
