//! Hash Functions
//!
//! Real MD5 and SHA-256 digests next to a handful of toy hashes that only
//! show how a hash mixes its input. The toy hashes work over UTF-16 code
//! units and are not collision resistant.

use md5::Md5;
use serde::Serialize;
use sha2::{Digest, Sha256};

const CRC32_POLY: u32 = 0xEDB8_8320;
const CRC32_TABLE: [u32; 256] = crc32_table();

const fn crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ CRC32_POLY } else { crc >> 1 };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// MD5 initialization constant A, reused as the seed of the simulation
const MD5_SEED: u32 = 0x6745_2301;

/// Code units folded into each 8-digit word of the SHA-256 simulation
const SHA_BLOCK: usize = 64;

/// Hex characters in a SHA-256 digest
const SHA_HEX_LEN: usize = 64;

pub struct Hashes;

impl Hashes {
    // ═══════════════════════════════════════════════════════════
    // TOY HASHES
    // ═══════════════════════════════════════════════════════════

    /// 31-multiplier rolling hash, absolute value in hex
    pub fn simple_hash(input: &str) -> String {
        let h = input
            .encode_utf16()
            .fold(0i32, |h, c| h.wrapping_mul(31).wrapping_add(i32::from(c)));
        format!("{:x}", i64::from(h).abs())
    }

    /// CRC-32 (IEEE), one byte per UTF-16 code unit
    pub fn crc32(input: &str) -> String {
        let crc = input.encode_utf16().fold(0xFFFF_FFFFu32, |crc, unit| {
            let index = ((crc ^ u32::from(unit)) & 0xFF) as usize;
            (crc >> 8) ^ CRC32_TABLE[index]
        });
        format!("{:08x}", crc ^ 0xFFFF_FFFF)
    }

    /// MD5-shaped output from a single 32-bit accumulator
    pub fn simulate_md5(input: &str) -> String {
        let h = input.encode_utf16().fold(MD5_SEED, |h, c| {
            (h << 5).wrapping_add(h) ^ u32::from(c)
        });
        format!("{:032x}", h)
    }

    /// SHA-256-shaped output, one 32-bit word per 64-unit block
    pub fn simulate_sha256(input: &str) -> String {
        let units: Vec<u16> = input.encode_utf16().collect();
        let mut out: String = units
            .chunks(SHA_BLOCK)
            .map(|block| {
                let h = block.iter().fold(0u32, |h, &c| {
                    (h << 5).wrapping_sub(h).wrapping_add(u32::from(c))
                });
                format!("{:08x}", h)
            })
            .collect();

        if out.len() < SHA_HEX_LEN {
            out.push_str(&"0".repeat(SHA_HEX_LEN - out.len()));
        }
        out.truncate(SHA_HEX_LEN);
        out
    }

    pub fn simulated(input: &str) -> SimulatedDigests {
        SimulatedDigests {
            md5: Self::simulate_md5(input),
            sha256: Self::simulate_sha256(input),
        }
    }

    // ═══════════════════════════════════════════════════════════
    // DIGESTS
    // ═══════════════════════════════════════════════════════════

    /// MD5 hash
    pub fn md5(input: &str) -> String {
        let mut hasher = Md5::new();
        hasher.update(input.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// SHA-256 hash
    pub fn sha256(input: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(input.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Hash with all algorithms
    pub fn digests(input: &str) -> DigestReport {
        DigestReport {
            simple_hash: Self::simple_hash(input),
            crc32: Self::crc32(input),
            md5: Self::md5(input),
            sha256: Self::sha256(input),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestReport {
    pub simple_hash: String,
    pub crc32: String,
    pub md5: String,
    pub sha256: String,
}

impl DigestReport {
    pub fn render(&self) -> String {
        format!(
            "Simple: {}\nCRC-32: {}\nMD5:    {}\nSHA-256: {}",
            self.simple_hash, self.crc32, self.md5, self.sha256
        )
    }
}

/// Toy stand-ins shaped like the real digests
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulatedDigests {
    pub md5: String,
    pub sha256: String,
}

impl SimulatedDigests {
    pub fn render(&self) -> String {
        format!(
            "MD5 (simulated):     {}\nSHA-256 (simulated): {}",
            self.md5, self.sha256
        )
    }
}
