//! Hill Cipher
//!
//! Block substitution with an n×n key matrix, n from 2 to 4. Letters are
//! taken in blocks of n, treated as a column vector and multiplied by the key
//! modulo 26. Decryption multiplies by the key's inverse modulo 26, which
//! exists only when the determinant is coprime with 26.

use crate::alphabet::{self, ALPHABET_LEN};
use crate::modular::{gcd, mod_inverse, modulo};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

pub const MIN_SIZE: usize = 2;
pub const MAX_SIZE: usize = 4;

/// Largest absolute value accepted in a key cell. Keeps a 4x4 cofactor
/// expansion inside `i64`.
pub const MAX_ENTRY: i64 = 10_000;

/// Square key matrix for the Hill cipher. Serialized as its bare rows;
/// deserialization goes through [`HillKey::new`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<i64>>", into = "Vec<Vec<i64>>")]
pub struct HillKey {
    rows: Vec<Vec<i64>>,
}

impl TryFrom<Vec<Vec<i64>>> for HillKey {
    type Error = Error;

    fn try_from(rows: Vec<Vec<i64>>) -> Result<Self> {
        Self::new(rows)
    }
}

impl From<HillKey> for Vec<Vec<i64>> {
    fn from(key: HillKey) -> Self {
        key.rows
    }
}

impl Default for HillKey {
    fn default() -> Self {
        Self { rows: vec![vec![2, 3], vec![1, 4]] }
    }
}

impl HillKey {
    /// Build a key, checking shape and cell range. Invertibility is checked
    /// when the key is used, so a key can be edited into a valid state.
    pub fn new(rows: Vec<Vec<i64>>) -> Result<Self> {
        let n = rows.len();
        if !(MIN_SIZE..=MAX_SIZE).contains(&n) {
            return Err(Error::InvalidMatrix(format!(
                "size {} is outside {}..={}", n, MIN_SIZE, MAX_SIZE
            )));
        }
        if let Some(row) = rows.iter().find(|row| row.len() != n) {
            return Err(Error::InvalidMatrix(format!(
                "row of length {} in a {}x{} matrix", row.len(), n, n
            )));
        }
        if let Some(&value) = rows.iter().flatten().find(|v| v.abs() > MAX_ENTRY) {
            return Err(Error::InvalidMatrix(format!(
                "entry {} is outside ±{}", value, MAX_ENTRY
            )));
        }
        Ok(Self { rows })
    }

    /// Zero matrix of the given size (clamped into 2..=4).
    pub fn zeroed(size: usize) -> Self {
        let size = size.clamp(MIN_SIZE, MAX_SIZE);
        Self { rows: vec![vec![0; size]; size] }
    }

    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<i64>] {
        &self.rows
    }

    /// Edit a single cell.
    pub fn set(&mut self, row: usize, col: usize, value: i64) -> Result<()> {
        let n = self.size();
        if row >= n || col >= n {
            return Err(Error::InvalidMatrix(format!(
                "cell ({}, {}) is outside a {}x{} matrix", row, col, n, n
            )));
        }
        if value.abs() > MAX_ENTRY {
            return Err(Error::InvalidMatrix(format!(
                "entry {} is outside ±{}", value, MAX_ENTRY
            )));
        }
        self.rows[row][col] = value;
        Ok(())
    }

    /// Change the size (clamped into 2..=4). The overlapping top-left block
    /// keeps its values, new cells are zero.
    pub fn resize(&mut self, size: usize) {
        let mut resized = Self::zeroed(size);
        let keep = self.size().min(resized.size());
        for i in 0..keep {
            resized.rows[i][..keep].copy_from_slice(&self.rows[i][..keep]);
        }
        *self = resized;
    }

    pub fn determinant(&self) -> i64 {
        determinant(&self.rows)
    }

    /// Determinant reduced into `[0, 26)`.
    pub fn determinant_mod(&self) -> i64 {
        modulo(self.determinant(), ALPHABET_LEN)
    }

    pub fn is_invertible(&self) -> bool {
        gcd(self.determinant_mod(), ALPHABET_LEN) == 1
    }

    /// Inverse matrix modulo `m`: adjugate times the inverse determinant.
    pub fn inverse_mod(&self, m: i64) -> Result<HillKey> {
        if m < 2 {
            return Err(Error::InvalidMatrix(format!("modulus {} must be at least 2", m)));
        }
        let n = self.size();
        let det = modulo(self.determinant(), m);

        let det_inv = match mod_inverse(det, m) {
            Some(inv) => inv,
            None => {
                debug!(det, m, "hill key is not invertible");
                return Err(Error::MatrixNotInvertible { det, m });
            }
        };

        let mut inverse = vec![vec![0; n]; n];
        for i in 0..n {
            for j in 0..n {
                let sign = if (i + j) % 2 == 0 { 1 } else { -1 };
                let cofactor = sign * determinant(&minor(&self.rows, i, j));
                // Adjugate is the transposed cofactor matrix
                inverse[j][i] = modulo(modulo(cofactor, m) * det_inv, m);
            }
        }

        Ok(Self { rows: inverse })
    }

    pub fn encrypt(&self, input: &str) -> Result<String> {
        if !self.is_invertible() {
            let det = self.determinant_mod();
            debug!(det, "refusing to encrypt with a non-invertible hill key");
            return Err(Error::MatrixNotInvertible { det, m: ALPHABET_LEN });
        }
        trace!(size = self.size(), "hill encrypt");
        Ok(apply(input, &self.rows))
    }

    pub fn decrypt(&self, input: &str) -> Result<String> {
        let inverse = self.inverse_mod(ALPHABET_LEN)?;
        trace!(size = self.size(), "hill decrypt");
        Ok(apply(input, &inverse.rows))
    }
}

/// Determinant by cofactor expansion along the first row.
pub fn determinant(matrix: &[Vec<i64>]) -> i64 {
    match matrix.len() {
        0 => 1,
        1 => matrix[0][0],
        2 => matrix[0][0] * matrix[1][1] - matrix[0][1] * matrix[1][0],
        n => (0..n)
            .map(|col| {
                let sign = if col % 2 == 0 { 1 } else { -1 };
                sign * matrix[0][col] * determinant(&minor(matrix, 0, col))
            })
            .sum(),
    }
}

/// `matrix` without row `row` and column `col`.
fn minor(matrix: &[Vec<i64>], row: usize, col: usize) -> Vec<Vec<i64>> {
    matrix
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != row)
        .map(|(_, r)| {
            r.iter()
                .enumerate()
                .filter(|&(j, _)| j != col)
                .map(|(_, &v)| v)
                .collect()
        })
        .collect()
}

/// Multiply each block of letters by `matrix`. Non-letters are dropped, the
/// last block is padded with `a`, and output case follows the input letter
/// at the same block position (lowercase over padding).
fn apply(input: &str, matrix: &[Vec<i64>]) -> String {
    let n = matrix.len();
    let letters: Vec<(i64, bool)> = input.chars().filter_map(alphabet::latin_index).collect();

    let mut result = String::with_capacity(letters.len() + n);
    for block in letters.chunks(n) {
        let vector: Vec<i64> = (0..n)
            .map(|k| block.get(k).map_or(0, |&(index, _)| index))
            .collect();

        for (j, row) in matrix.iter().enumerate() {
            let sum: i64 = row.iter().zip(&vector).map(|(k, v)| k * v).sum();
            let upper = block.get(j).is_some_and(|&(_, upper)| upper);
            result.push(alphabet::latin_letter(modulo(sum, ALPHABET_LEN), upper));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(rows: &[&[i64]]) -> HillKey {
        HillKey::new(rows.iter().map(|r| r.to_vec()).collect()).unwrap()
    }

    #[test]
    fn test_determinant() {
        assert_eq!(key(&[&[2, 3], &[1, 4]]).determinant(), 5);
        assert_eq!(key(&[&[2, 4], &[1, 2]]).determinant(), 0);
        assert_eq!(key(&[&[6, 24, 1], &[13, 16, 10], &[20, 17, 15]]).determinant(), 441);
        let identity4 = key(&[&[1, 0, 0, 0], &[0, 1, 0, 0], &[0, 0, 1, 0], &[0, 0, 0, 1]]);
        assert_eq!(identity4.determinant(), 1);
        assert_eq!(determinant(&[vec![7]]), 7);
    }

    #[test]
    fn test_inverse_mod() {
        let inverse = key(&[&[2, 3], &[1, 4]]).inverse_mod(26).unwrap();
        assert_eq!(inverse.rows(), &[vec![6, 15], vec![5, 16]]);
    }

    #[test]
    fn test_inverse_mod_rejects_small_modulus() {
        let k = HillKey::default();
        assert!(matches!(k.inverse_mod(0), Err(Error::InvalidMatrix(_))));
        assert!(matches!(k.inverse_mod(1), Err(Error::InvalidMatrix(_))));
        assert!(matches!(k.inverse_mod(-26), Err(Error::InvalidMatrix(_))));
        assert!(k.inverse_mod(29).is_ok());
    }

    #[test]
    fn test_json_goes_through_validation() {
        let k: HillKey = serde_json::from_str("[[2,3],[1,4]]").unwrap();
        assert_eq!(k, HillKey::default());
        assert_eq!(serde_json::to_string(&k).unwrap(), "[[2,3],[1,4]]");

        assert!(serde_json::from_str::<HillKey>("[[1],[2]]").is_err());
        assert!(serde_json::from_str::<HillKey>("[[1,2],[3]]").is_err());
        assert!(serde_json::from_str::<HillKey>("[[1,0],[0,20000]]").is_err());
        assert!(serde_json::from_str::<HillKey>(r#"{"rows":[[1],[2]]}"#).is_err());
    }

    #[test]
    fn test_not_invertible() {
        let singular = key(&[&[2, 4], &[1, 2]]);
        assert!(!singular.is_invertible());
        assert!(matches!(
            singular.decrypt("abcd"),
            Err(Error::MatrixNotInvertible { det: 0, m: 26 })
        ));
        assert!(matches!(singular.encrypt("abcd"), Err(Error::MatrixNotInvertible { .. })));

        // det = 2, shares a factor with 26
        let even = key(&[&[2, 0], &[0, 1]]);
        assert!(!even.is_invertible());
        assert!(even.inverse_mod(26).is_err());
    }

    #[test]
    fn test_encrypt_2x2() {
        let k = HillKey::default();
        assert_eq!(k.encrypt("help").unwrap(), "axpt");
        assert_eq!(k.decrypt("axpt").unwrap(), "help");
    }

    #[test]
    fn test_encrypt_3x3_known_vector() {
        let k = key(&[&[6, 24, 1], &[13, 16, 10], &[20, 17, 15]]);
        assert_eq!(k.encrypt("ACT").unwrap(), "POH");
        assert_eq!(k.decrypt("POH").unwrap(), "ACT");
    }

    #[test]
    fn test_padding_and_case() {
        let k = HillKey::default();
        // "Hel" pads to "Hela"; the padded position comes out lowercase
        let encrypted = k.encrypt("H-e l").unwrap();
        assert_eq!(encrypted.len(), 4);
        assert!(encrypted.chars().next().unwrap().is_ascii_uppercase());
        assert!(encrypted.chars().nth(3).unwrap().is_ascii_lowercase());
        assert_eq!(k.decrypt(&encrypted).unwrap(), "Hela");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(HillKey::default().encrypt("123 !").unwrap(), "");
        assert_eq!(HillKey::default().decrypt("").unwrap(), "");
    }

    #[test]
    fn test_new_rejects_bad_shapes() {
        assert!(HillKey::new(vec![vec![1]]).is_err());
        assert!(HillKey::new(vec![vec![1, 2], vec![3]]).is_err());
        assert!(HillKey::new(vec![vec![0; 5]; 5]).is_err());
        assert!(HillKey::new(vec![vec![1, MAX_ENTRY + 1], vec![0, 1]]).is_err());
    }

    #[test]
    fn test_resize_keeps_overlap() {
        let mut k = HillKey::default();
        k.resize(3);
        assert_eq!(k.rows(), &[vec![2, 3, 0], vec![1, 4, 0], vec![0, 0, 0]]);

        k.set(2, 2, 1).unwrap();
        assert_eq!(k.determinant(), 5);

        k.resize(9);
        assert_eq!(k.size(), 4);
        k.resize(2);
        assert_eq!(k.rows(), &[vec![2, 3], vec![1, 4]]);

        k.resize(0);
        assert_eq!(k.size(), 2);
    }

    #[test]
    fn test_set_out_of_range() {
        let mut k = HillKey::default();
        assert!(k.set(2, 0, 1).is_err());
        assert!(k.set(0, 0, MAX_ENTRY * 2).is_err());
    }

    #[test]
    fn test_round_trip_4x4() {
        // Upper unitriangular, so det = 1
        let k = key(&[&[1, 2, 3, 4], &[0, 1, 5, 6], &[0, 0, 1, 7], &[0, 0, 0, 1]]);
        assert!(k.is_invertible());
        let encrypted = k.encrypt("Attack At Dawn").unwrap();
        assert_eq!(k.decrypt(&encrypted).unwrap(), "AttackAtDawn");
    }
}
