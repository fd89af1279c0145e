//! Klassik: Classical Cryptography Toolkit
//!
//! Substitution and polyalphabetic ciphers plus the statistics used to
//! attack them. Everything here is a pure function of its inputs.
//!
//! # Modules
//! - `alphabet` - Latin cipher alphabet, extended Azerbaijani analysis alphabet
//! - `modular` - gcd, modular inverse, normalized remainder
//! - `ciphers` - Caesar, Affine, Vigenère
//! - `hill` - Hill cipher over 2x2 to 4x4 key matrices
//! - `playfair` - 6x6 Playfair square
//! - `analysis` - Index of Coincidence, key-length estimation, frequency analysis
//! - `kasiski` - Kasiski examination
//! - `hashes` - Toy hashes, CRC-32, MD5, SHA-256
//! - `config` - Analysis defaults and their JSON storage
//!
//! None of this is secure. It exists to be read and taken apart.

pub mod alphabet;
pub mod modular;
pub mod ciphers;
pub mod hill;
pub mod playfair;
pub mod analysis;
pub mod kasiski;
pub mod hashes;
pub mod config;

pub use analysis::{FrequencyAnalysis, FrequencyRow, IcInterpretation, KeyLengthCandidate};
pub use ciphers::Cipher;
pub use config::{AnalysisConfig, ConfigStore, LabConfig};
pub use hashes::{DigestReport, Hashes, SimulatedDigests};
pub use hill::HillKey;
pub use kasiski::{KasiskiReport, RepeatedGram};
pub use playfair::PlayfairSquare;

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid key: 'a' ({a}) and alphabet length ({m}) are not coprime")]
    NotCoprime { a: i64, m: i64 },

    #[error("Invalid key: matrix is not invertible mod {m} (determinant {det})")]
    MatrixNotInvertible { det: i64, m: i64 },

    #[error("Invalid matrix: {0}")]
    InvalidMatrix(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Result of a statistical analysis.
///
/// Too little text is not an error, just nothing to report yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Outcome<T> {
    Ready(T),
    InsufficientInput { required: usize, found: usize },
}

impl<T> Outcome<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Outcome::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::InsufficientInput { .. } => None,
        }
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Outcome::Ready(value) => Some(value),
            Outcome::InsufficientInput { .. } => None,
        }
    }
}
