//! Cryptanalysis Tools
//!
//! Index of Coincidence, IC-based key-length estimation and letter
//! frequency analysis. Text is cleaned against the extended alphabet, so
//! Azerbaijani letters count as letters here.

use crate::alphabet::{self, AZERBAIJANI, EXTENDED};
use crate::config::AnalysisConfig;
use crate::Outcome;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

/// Approximate letter frequencies of Azerbaijani text, in percent.
pub const REFERENCE_FREQUENCIES: [(char, f64); 32] = [
    ('A', 9.17), ('B', 1.65), ('C', 0.31), ('Ç', 1.46), ('D', 3.24), ('E', 2.61),
    ('Ə', 8.41), ('F', 0.09), ('G', 1.29), ('Ğ', 0.87), ('H', 1.28), ('X', 0.65),
    ('I', 2.14), ('İ', 7.43), ('J', 0.04), ('K', 4.61), ('Q', 0.57), ('L', 3.21),
    ('M', 3.31), ('N', 5.42), ('O', 1.98), ('Ö', 0.76), ('P', 0.41), ('R', 3.91),
    ('S', 3.65), ('Ş', 1.87), ('T', 3.01), ('U', 1.31), ('Ü', 1.97), ('V', 0.98),
    ('Y', 2.57), ('Z', 0.62),
];

/// Shown instead of a table when there is nothing to count.
pub const NO_TEXT_MESSAGE: &str = "No letters to analyze. Enter some text first.";

/// Expected percentage for `letter`, 0 for letters outside the table.
pub fn expected_frequency(letter: char) -> f64 {
    REFERENCE_FREQUENCIES
        .iter()
        .find(|(c, _)| *c == letter)
        .map_or(0.0, |&(_, pct)| pct)
}

// ═══════════════════════════════════════════════════════════
// INDEX OF COINCIDENCE
// ═══════════════════════════════════════════════════════════

/// Index of Coincidence of `text`.
/// Plain Azerbaijani/English text ≈ 0.06-0.07, random ≈ 0.038
pub fn index_of_coincidence(text: &str) -> f64 {
    ic_of_letters(&alphabet::clean_extended(text))
}

fn ic_of_letters(letters: &[char]) -> f64 {
    let n = letters.len();
    if n < 2 {
        return 0.0;
    }

    let mut counts: HashMap<char, usize> = HashMap::new();
    for &c in letters {
        *counts.entry(c).or_insert(0) += 1;
    }

    let sum: usize = counts.values().map(|&f| f * (f - 1)).sum();
    sum as f64 / (n * (n - 1)) as f64
}

/// Ranked key-length guess
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyLengthCandidate {
    pub length: usize,
    pub score: f64,
}

/// What an IC value suggests about the text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IcInterpretation {
    /// Plain language or a monoalphabetic cipher such as Caesar
    Monoalphabetic,
    /// A polyalphabetic cipher such as Vigenère
    Polyalphabetic,
    /// Close to uniformly random letters
    Random,
}

impl IcInterpretation {
    pub fn describe(&self) -> &'static str {
        match self {
            IcInterpretation::Monoalphabetic => {
                "IC ≈ 0.06-0.07: plain text or a monoalphabetic cipher (e.g. Caesar)"
            }
            IcInterpretation::Polyalphabetic => {
                "IC ≈ 0.04-0.05: polyalphabetic cipher (e.g. Vigenère)"
            }
            IcInterpretation::Random => "IC ≈ 0.038: random text",
        }
    }
}

/// Place an IC value in the closest band.
pub fn interpret_ic(ic: f64) -> IcInterpretation {
    if ic >= 0.055 {
        IcInterpretation::Monoalphabetic
    } else if ic >= 0.041 {
        IcInterpretation::Polyalphabetic
    } else {
        IcInterpretation::Random
    }
}

/// Estimate Vigenère key length from the average IC of interleaved columns
pub fn suggest_key_lengths(text: &str) -> Outcome<Vec<KeyLengthCandidate>> {
    suggest_key_lengths_with(text, &AnalysisConfig::default())
}

pub fn suggest_key_lengths_with(
    text: &str,
    config: &AnalysisConfig,
) -> Outcome<Vec<KeyLengthCandidate>> {
    let letters = alphabet::clean_extended(text);
    if letters.len() < config.ic_min_letters {
        debug!(
            found = letters.len(),
            required = config.ic_min_letters,
            "text too short for key length estimate"
        );
        return Outcome::InsufficientInput {
            required: config.ic_min_letters,
            found: letters.len(),
        };
    }

    let max_len = config.max_key_length.min(letters.len() / 2);
    let mut candidates: Vec<KeyLengthCandidate> = (2..=max_len)
        .map(|length| {
            let total: f64 = (0..length)
                .map(|offset| {
                    let column: Vec<char> =
                        letters.iter().skip(offset).step_by(length).copied().collect();
                    ic_of_letters(&column)
                })
                .sum();
            KeyLengthCandidate { length, score: total / length as f64 }
        })
        .collect();

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates.truncate(config.top_candidates);
    Outcome::Ready(candidates)
}

// ═══════════════════════════════════════════════════════════
// FREQUENCY ANALYSIS
// ═══════════════════════════════════════════════════════════

/// One letter of a frequency table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyRow {
    pub letter: char,
    pub count: usize,
    /// Observed share of all letters, in percent
    pub percent: f64,
    /// Reference share, in percent
    pub expected: f64,
    /// `percent - expected`
    pub difference: f64,
    /// Bar length relative to the most frequent letter, 0.0 to 1.0
    pub bar: f64,
}

/// Frequency analysis for cryptanalysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyAnalysis {
    pub total_letters: usize,
    /// Sorted by observed percentage, most frequent first
    pub rows: Vec<FrequencyRow>,
}

impl FrequencyAnalysis {
    /// Analyze text for frequency patterns
    pub fn analyze(text: &str) -> Self {
        let letters = alphabet::clean_extended(text);
        let total_letters = letters.len();
        if total_letters == 0 {
            return Self { total_letters, rows: Vec::new() };
        }

        let mut counts: HashMap<char, usize> = HashMap::new();
        for &c in &letters {
            *counts.entry(c).or_insert(0) += 1;
        }

        let mut rows: Vec<FrequencyRow> = EXTENDED
            .iter()
            .map(|&letter| {
                let count = counts.get(&letter).copied().unwrap_or(0);
                let percent = count as f64 / total_letters as f64 * 100.0;
                let expected = expected_frequency(letter);
                FrequencyRow {
                    letter,
                    count,
                    percent,
                    expected,
                    difference: percent - expected,
                    bar: 0.0,
                }
            })
            .collect();

        // Stable sort: ties stay in alphabet order
        rows.sort_by(|a, b| b.percent.total_cmp(&a.percent));

        let max = rows.first().map_or(0.0, |row| row.percent);
        if max > 0.0 {
            for row in &mut rows {
                row.bar = row.percent / max;
            }
        }

        Self { total_letters, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.total_letters == 0
    }

    /// Informational text when nothing was counted
    pub fn message(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_TEXT_MESSAGE)
    }

    pub fn row(&self, letter: char) -> Option<&FrequencyRow> {
        let letter = letter.to_uppercase().next().unwrap_or(letter);
        self.rows.iter().find(|row| row.letter == letter)
    }

    /// Get frequency as percentage
    pub fn frequency_percent(&self, c: char) -> f64 {
        self.row(c).map_or(0.0, |row| row.percent)
    }

    /// Get top N most frequent letters
    pub fn top_letters(&self, n: usize) -> Vec<(char, usize)> {
        self.rows
            .iter()
            .filter(|row| row.count > 0)
            .take(n)
            .map(|row| (row.letter, row.count))
            .collect()
    }

    /// Observed vs expected for every reference letter, in alphabet order
    pub fn comparison(&self) -> Vec<FrequencyRow> {
        AZERBAIJANI
            .iter()
            .filter_map(|&letter| self.row(letter).cloned())
            .collect()
    }

    /// Chi-squared distance from the reference frequencies
    pub fn chi_squared(&self) -> f64 {
        self.comparison()
            .iter()
            .filter(|row| row.expected > 0.0)
            .map(|row| (row.percent - row.expected).powi(2) / row.expected)
            .sum()
    }

    /// Render as ASCII frequency chart
    pub fn render_ascii(&self) -> String {
        if let Some(message) = self.message() {
            return message.to_string();
        }

        let mut lines = Vec::new();
        lines.push("FREQUENCY ANALYSIS".to_string());
        lines.push("═".repeat(40));

        for row in self.rows.iter().filter(|row| row.count > 0) {
            let bar = "█".repeat((row.bar * 30.0).round() as usize);
            lines.push(format!(
                "{}: {:5.2}% ({:+.2}) |{}",
                row.letter, row.percent, row.difference, bar
            ));
        }

        lines.push(String::new());
        lines.push(format!("Letters analyzed: {}", self.total_letters));
        lines.push(format!("Index of Coincidence: {:.4}", self.index_of_coincidence()));
        lines.push(format!("Chi-squared (reference): {:.4}", self.chi_squared()));

        lines.join("\n")
    }

    /// Calculate Index of Coincidence from the counted letters
    pub fn index_of_coincidence(&self) -> f64 {
        let n = self.total_letters;
        if n < 2 {
            return 0.0;
        }
        let sum: usize = self.rows.iter().map(|row| row.count * row.count.saturating_sub(1)).sum();
        sum as f64 / (n * (n - 1)) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ic_boundaries() {
        assert_eq!(index_of_coincidence(""), 0.0);
        assert_eq!(index_of_coincidence("a"), 0.0);
        assert_eq!(index_of_coincidence("a, 1 2 3!"), 0.0);
        assert_eq!(index_of_coincidence("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"), 1.0);
    }

    #[test]
    fn test_ic_known_value() {
        // AABB: (2*1 + 2*1) / (4*3)
        let ic = index_of_coincidence("aa bb");
        assert!((ic - 4.0 / 12.0).abs() < 1e-12);
        // Azerbaijani letters count as their own symbols
        let ic = index_of_coincidence("əə");
        assert_eq!(ic, 1.0);
    }

    #[test]
    fn test_ioc_english() {
        let english = "TO BE OR NOT TO BE THAT IS THE QUESTION WHETHER TIS NOBLER";
        let ioc = index_of_coincidence(english);
        assert!(ioc > 0.05 && ioc < 0.10, "IoC was {}", ioc);
    }

    #[test]
    fn test_interpret_ic() {
        assert_eq!(interpret_ic(0.067), IcInterpretation::Monoalphabetic);
        assert_eq!(interpret_ic(0.045), IcInterpretation::Polyalphabetic);
        assert_eq!(interpret_ic(0.038), IcInterpretation::Random);
    }

    #[test]
    fn test_key_lengths_need_enough_text() {
        assert_eq!(
            suggest_key_lengths("too short"),
            Outcome::InsufficientInput { required: 20, found: 8 }
        );
    }

    #[test]
    fn test_key_lengths_find_period() {
        // Period 4: every column is a single repeated letter
        let text = "ABCD".repeat(10);
        let candidates = suggest_key_lengths(&text).ready().unwrap();
        assert_eq!(candidates.len(), 5);
        assert_eq!(candidates[0].length, 4);
        assert_eq!(candidates[0].score, 1.0);
        // 8 is also a multiple of the period
        assert_eq!(candidates[1].length, 8);
        assert_eq!(candidates[1].score, 1.0);
    }

    #[test]
    fn test_key_lengths_limited_by_text() {
        let config = AnalysisConfig { ic_min_letters: 4, ..AnalysisConfig::default() };
        let candidates = suggest_key_lengths_with("abcdefgh", &config).ready().unwrap();
        // min(10, 8 / 2) = 4 -> lengths 2, 3, 4
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|c| (2..=4).contains(&c.length)));
    }

    #[test]
    fn test_frequency_analysis() {
        let analysis = FrequencyAnalysis::analyze("HELLO WORLD");
        assert_eq!(analysis.total_letters, 10);
        assert_eq!(analysis.row('l').unwrap().count, 3);
        assert_eq!(analysis.rows[0].letter, 'L');
        assert_eq!(analysis.rows[0].bar, 1.0);
        assert!((analysis.frequency_percent('O') - 20.0).abs() < 1e-9);
        assert_eq!(analysis.rows.len(), EXTENDED.len());
    }

    #[test]
    fn test_frequency_difference() {
        let analysis = FrequencyAnalysis::analyze("aaaa");
        let a = analysis.row('A').unwrap();
        assert_eq!(a.percent, 100.0);
        assert!((a.difference - (100.0 - 9.17)).abs() < 1e-9);

        let w = analysis.row('W').unwrap();
        assert_eq!(w.expected, 0.0);
        let z = analysis.row('Z').unwrap();
        assert!((z.difference + 0.62).abs() < 1e-9);
    }

    #[test]
    fn test_top_letters() {
        let analysis = FrequencyAnalysis::analyze("AAABBC");
        let top = analysis.top_letters(5);
        assert_eq!(top, vec![('A', 3), ('B', 2), ('C', 1)]);
    }

    #[test]
    fn test_ties_keep_alphabet_order() {
        let analysis = FrequencyAnalysis::analyze("zəa");
        let order: Vec<char> = analysis.rows.iter().take(3).map(|r| r.letter).collect();
        assert_eq!(order, vec!['A', 'Ə', 'Z']);
    }

    #[test]
    fn test_empty_text() {
        let analysis = FrequencyAnalysis::analyze("123 !?");
        assert!(analysis.is_empty());
        assert!(analysis.rows.is_empty());
        assert_eq!(analysis.message(), Some(NO_TEXT_MESSAGE));
        assert_eq!(analysis.render_ascii(), NO_TEXT_MESSAGE);
    }

    #[test]
    fn test_comparison_in_reference_order() {
        let analysis = FrequencyAnalysis::analyze("salam");
        let comparison = analysis.comparison();
        assert_eq!(comparison.len(), 32);
        assert_eq!(comparison[0].letter, 'A');
        assert_eq!(comparison[3].letter, 'Ç');
        assert!(analysis.chi_squared() > 0.0);
    }

    #[test]
    fn test_counted_ic_matches_text_ic() {
        let text = "Kriptoqrafiya şifrələrin elmidir";
        let analysis = FrequencyAnalysis::analyze(text);
        assert!((analysis.index_of_coincidence() - index_of_coincidence(text)).abs() < 1e-12);
    }
}
