//! Kasiski Examination
//!
//! Repeated n-grams in Vigenère ciphertext tend to sit a multiple of the
//! key length apart. Factoring the most common distances between repeats
//! gives a ranked list of likely key lengths.

use crate::alphabet;
use crate::analysis::KeyLengthCandidate;
use crate::config::AnalysisConfig;
use crate::Outcome;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub const MIN_GRAM: usize = 2;
pub const MAX_GRAM: usize = 5;

/// An n-gram seen at least twice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatedGram {
    pub gram: String,
    /// Offsets into the cleaned text, ascending
    pub positions: Vec<usize>,
    /// Gaps between consecutive offsets
    pub distances: Vec<usize>,
    pub count: usize,
}

/// How often a distance occurs across all repeated grams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DistanceTally {
    pub distance: usize,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KasiskiReport {
    pub gram_length: usize,
    pub letters: usize,
    /// Most frequent first, ties in order of first occurrence
    pub repeated: Vec<RepeatedGram>,
    /// Every distance, most frequent first
    pub distances: Vec<DistanceTally>,
    /// Factors of the top distances, scored by accumulated count
    pub candidates: Vec<KeyLengthCandidate>,
}

impl KasiskiReport {
    /// No repeats means nothing to factor.
    pub fn has_repeats(&self) -> bool {
        !self.repeated.is_empty()
    }

    /// Render as a text report
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!(
            "KASISKI EXAMINATION (n = {}, {} letters)",
            self.gram_length, self.letters
        ));
        lines.push("═".repeat(40));

        if !self.has_repeats() {
            lines.push("No repeated sequences found.".to_string());
            return lines.join("\n");
        }

        for gram in &self.repeated {
            lines.push(format!(
                "{:<6} x{}  positions {:?}  distances {:?}",
                gram.gram, gram.count, gram.positions, gram.distances
            ));
        }

        lines.push(String::new());
        lines.push("Likely key lengths:".to_string());
        for candidate in &self.candidates {
            lines.push(format!("  {:>3}  (score {})", candidate.length, candidate.score));
        }
        lines.join("\n")
    }
}

/// Run the examination with default thresholds
pub fn kasiski_examination(text: &str, gram_len: usize) -> Outcome<KasiskiReport> {
    kasiski_examination_with(text, gram_len, &AnalysisConfig::default())
}

pub fn kasiski_examination_with(
    text: &str,
    gram_len: usize,
    config: &AnalysisConfig,
) -> Outcome<KasiskiReport> {
    let n = gram_len.clamp(MIN_GRAM, MAX_GRAM);
    let letters = alphabet::clean_extended(text);
    if letters.len() < n * 2 {
        debug!(found = letters.len(), gram_length = n, "text too short for kasiski");
        return Outcome::InsufficientInput {
            required: n * 2,
            found: letters.len(),
        };
    }

    let repeated = repeated_grams(&letters, n);
    let distances = tally_distances(&repeated);
    let candidates = factor_candidates(&distances, config);

    debug!(
        repeats = repeated.len(),
        distances = distances.len(),
        "kasiski examination complete"
    );

    Outcome::Ready(KasiskiReport {
        gram_length: n,
        letters: letters.len(),
        repeated,
        distances,
        candidates,
    })
}

fn repeated_grams(letters: &[char], n: usize) -> Vec<RepeatedGram> {
    let mut order: Vec<String> = Vec::new();
    let mut positions: HashMap<String, Vec<usize>> = HashMap::new();

    for (offset, window) in letters.windows(n).enumerate() {
        let gram: String = window.iter().collect();
        positions
            .entry(gram.clone())
            .or_insert_with(|| {
                order.push(gram);
                Vec::new()
            })
            .push(offset);
    }

    let mut repeated: Vec<RepeatedGram> = order
        .into_iter()
        .filter_map(|gram| {
            let positions = positions.remove(&gram)?;
            if positions.len() < 2 {
                return None;
            }
            let distances = positions.windows(2).map(|w| w[1] - w[0]).collect();
            Some(RepeatedGram {
                count: positions.len(),
                gram,
                positions,
                distances,
            })
        })
        .collect();

    repeated.sort_by(|a, b| b.count.cmp(&a.count));
    repeated
}

fn tally_distances(repeated: &[RepeatedGram]) -> Vec<DistanceTally> {
    let mut tally: BTreeMap<usize, usize> = BTreeMap::new();
    for distance in repeated.iter().flat_map(|gram| gram.distances.iter()) {
        *tally.entry(*distance).or_insert(0) += 1;
    }

    // BTreeMap iterates in ascending distance, the stable sort keeps that for ties
    let mut distances: Vec<DistanceTally> = tally
        .into_iter()
        .map(|(distance, count)| DistanceTally { distance, count })
        .collect();
    distances.sort_by(|a, b| b.count.cmp(&a.count));
    distances
}

fn factor_candidates(
    distances: &[DistanceTally],
    config: &AnalysisConfig,
) -> Vec<KeyLengthCandidate> {
    let mut scores: BTreeMap<usize, usize> = BTreeMap::new();
    for tally in distances.iter().take(config.kasiski_top_distances) {
        for factor in factors(tally.distance) {
            *scores.entry(factor).or_insert(0) += tally.count;
        }
    }

    let mut ranked: Vec<(usize, usize)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(config.top_candidates)
        .map(|(length, score)| KeyLengthCandidate { length, score: score as f64 })
        .collect()
}

/// Divisors of `d` that are at least 2, including `d` itself.
pub fn factors(d: usize) -> Vec<usize> {
    let mut found = Vec::new();
    if d < 2 {
        return found;
    }

    let mut i = 2;
    while i * i <= d {
        if d % i == 0 {
            found.push(i);
            if i != d / i {
                found.push(d / i);
            }
        }
        i += 1;
    }
    if !found.contains(&d) {
        found.push(d);
    }
    found.sort_unstable();
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factors() {
        assert_eq!(factors(0), Vec::<usize>::new());
        assert_eq!(factors(1), Vec::<usize>::new());
        assert_eq!(factors(2), vec![2]);
        assert_eq!(factors(6), vec![2, 3, 6]);
        assert_eq!(factors(9), vec![3, 9]);
        assert_eq!(factors(12), vec![2, 3, 4, 6, 12]);
        assert_eq!(factors(13), vec![13]);
    }

    #[test]
    fn test_known_repeat() {
        let report = kasiski_examination("ABCXYZABCDEF ABC", 3).ready().unwrap();
        assert_eq!(report.letters, 15);
        assert_eq!(report.repeated.len(), 1);

        let abc = &report.repeated[0];
        assert_eq!(abc.gram, "ABC");
        assert_eq!(abc.positions, vec![0, 6, 12]);
        assert_eq!(abc.distances, vec![6, 6]);
        assert_eq!(abc.count, 3);

        assert_eq!(report.distances, vec![DistanceTally { distance: 6, count: 2 }]);

        let lengths: Vec<usize> = report.candidates.iter().map(|c| c.length).collect();
        assert_eq!(lengths, vec![2, 3, 6]);
        assert!(report.candidates.iter().all(|c| c.score == 2.0));
    }

    #[test]
    fn test_too_short() {
        assert_eq!(
            kasiski_examination("abcde", 3),
            Outcome::InsufficientInput { required: 6, found: 5 }
        );
    }

    #[test]
    fn test_gram_length_clamped() {
        let short = kasiski_examination("ababab", 1).ready().unwrap();
        assert_eq!(short.gram_length, MIN_GRAM);

        let long = kasiski_examination(&"abcdefg".repeat(3), 40).ready().unwrap();
        assert_eq!(long.gram_length, MAX_GRAM);
    }

    #[test]
    fn test_no_repeats() {
        let report = kasiski_examination("abcdefghij", 3).ready().unwrap();
        assert!(!report.has_repeats());
        assert!(report.distances.is_empty());
        assert!(report.candidates.is_empty());
        assert!(report.render().contains("No repeated"));
    }

    #[test]
    fn test_repeat_ordering() {
        // AB: 0, 2, 4 / BA: 1, 3, 5
        let report = kasiski_examination("abababa", 2).ready().unwrap();
        let grams: Vec<&str> = report.repeated.iter().map(|g| g.gram.as_str()).collect();
        assert_eq!(grams, vec!["AB", "BA"]);
        assert_eq!(report.repeated[0].count, 3);
        assert_eq!(report.distances, vec![DistanceTally { distance: 2, count: 4 }]);
        assert_eq!(report.candidates.len(), 1);
        assert_eq!(report.candidates[0].length, 2);
        assert_eq!(report.candidates[0].score, 4.0);
    }

    #[test]
    fn test_ties_by_first_occurrence() {
        // Three grams repeat twice each
        let report = kasiski_examination("xyqrmxyqr", 2).ready().unwrap();
        let grams: Vec<&str> = report.repeated.iter().map(|g| g.gram.as_str()).collect();
        assert_eq!(grams, vec!["XY", "YQ", "QR"]);
    }

    #[test]
    fn test_extended_letters_count() {
        let report = kasiski_examination("şəhərşəhər", 3).ready().unwrap();
        assert_eq!(report.letters, 10);
        assert_eq!(report.repeated[0].gram, "ŞƏH");
        assert_eq!(report.repeated[0].distances, vec![5]);
    }

    #[test]
    fn test_top_distances_limit() {
        let config = AnalysisConfig { kasiski_top_distances: 0, ..AnalysisConfig::default() };
        let report = kasiski_examination_with("ABCXYZABCDEF ABC", 3, &config).ready().unwrap();
        assert!(report.has_repeats());
        assert!(report.candidates.is_empty());
    }
}
