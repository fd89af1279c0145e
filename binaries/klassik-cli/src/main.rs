//! Klassik CLI
//!
//! Command-line front end for the classical cipher toolkit.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use klassik_cipher::analysis::{self, FrequencyAnalysis};
use klassik_cipher::kasiski;
use klassik_cipher::{Cipher, ConfigStore, Hashes, HillKey, LabConfig, Outcome, PlayfairSquare};

#[derive(Parser)]
#[command(name = "klassik")]
#[command(about = "Klassik - classical ciphers and the statistics that break them")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/klassik/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Caesar shift cipher
    Caesar {
        /// Text (read from stdin when omitted)
        text: Option<String>,

        #[arg(short, long, default_value_t = 3, allow_negative_numbers = true)]
        shift: i32,

        #[arg(short, long)]
        decrypt: bool,
    },

    /// Try all 26 Caesar shifts
    Bruteforce {
        text: Option<String>,
    },

    /// Affine cipher E(x) = (a*x + b) mod 26
    Affine {
        text: Option<String>,

        /// Multiplier, must be coprime with 26
        #[arg(short, default_value_t = 5, allow_negative_numbers = true)]
        a: i32,

        /// Offset
        #[arg(short, default_value_t = 8, allow_negative_numbers = true)]
        b: i32,

        #[arg(short, long)]
        decrypt: bool,
    },

    /// Vigenère cipher
    Vigenere {
        text: Option<String>,

        /// Keyword (falls back to the configured default)
        #[arg(short, long)]
        key: Option<String>,

        #[arg(short, long)]
        decrypt: bool,
    },

    /// Hill cipher
    Hill {
        text: Option<String>,

        /// Key matrix, rows separated by ';' (e.g. "2,3;1,4")
        #[arg(short, long, allow_hyphen_values = true)]
        matrix: Option<String>,

        #[arg(short, long)]
        decrypt: bool,
    },

    /// Playfair cipher on a 6x6 square
    Playfair {
        text: Option<String>,

        #[arg(short, long, default_value = "")]
        key: String,

        #[arg(short, long)]
        decrypt: bool,

        /// Print the key square
        #[arg(long)]
        show_square: bool,
    },

    /// Index of Coincidence and key length estimate
    Ic {
        text: Option<String>,
    },

    /// Letter frequencies against the Azerbaijani reference
    Freq {
        text: Option<String>,

        /// Bar chart instead of a table
        #[arg(long)]
        chart: bool,
    },

    /// Kasiski examination
    Kasiski {
        text: Option<String>,

        /// N-gram length (2-5)
        #[arg(short = 'n', long)]
        gram: Option<usize>,
    },

    /// Toy hashes, CRC-32, MD5 and SHA-256
    Hash {
        text: Option<String>,

        /// Also print the simulated MD5/SHA-256
        #[arg(long)]
        simulated: bool,
    },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the active configuration
    Show,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the config file location
    Path,
}

/// Input/output pair of a cipher run
#[derive(Serialize)]
struct CipherRun<'a> {
    cipher: &'a str,
    mode: &'a str,
    key: String,
    input: &'a str,
    output: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = match &cli.config {
        Some(path) => ConfigStore::at_path(path),
        None => ConfigStore::default_location(),
    };

    run(cli.command, &store, cli.json)
}

/// RUST_LOG wins over --verbose when set
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "klassik=debug,klassik_cipher=debug"
    } else {
        "klassik=warn,klassik_cipher=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(store: &ConfigStore) -> Result<LabConfig> {
    store
        .load()
        .with_context(|| format!("loading {}", store.path().display()))
}

fn run(command: Commands, store: &ConfigStore, json: bool) -> Result<()> {
    match command {
        Commands::Caesar { text, shift, decrypt } => {
            let input = read_input(text)?;
            let output = if decrypt {
                Cipher::caesar_decrypt(&input, shift)
            } else {
                Cipher::caesar_encrypt(&input, shift)
            };
            print_run(json, CipherRun {
                cipher: "CAESAR",
                mode: mode(decrypt),
                key: shift.to_string(),
                input: &input,
                output,
            })
        }

        Commands::Bruteforce { text } => {
            let input = read_input(text)?;
            let results = Cipher::caesar_bruteforce(&input);
            if json {
                return print_json(&results);
            }

            println!("\n  CAESAR BRUTEFORCE");
            println!("  =================\n");
            for (shift, plain) in results {
                println!("  {:>2}: {}", shift, plain);
            }
            Ok(())
        }

        Commands::Affine { text, a, b, decrypt } => {
            let input = read_input(text)?;
            let output = if decrypt {
                Cipher::affine_decrypt(&input, a, b)?
            } else {
                Cipher::affine_encrypt(&input, a, b)?
            };
            print_run(json, CipherRun {
                cipher: "AFFINE",
                mode: mode(decrypt),
                key: format!("a={}, b={}", a, b),
                input: &input,
                output,
            })
        }

        Commands::Vigenere { text, key, decrypt } => {
            let input = read_input(text)?;
            let config = load_config(store)?;
            let key = Cipher::vigenere_key(
                key.as_deref().unwrap_or(""),
                &config.vigenere_default_key,
            );
            let output = if decrypt {
                Cipher::vigenere_decrypt(&input, &key)
            } else {
                Cipher::vigenere_encrypt(&input, &key)
            };
            print_run(json, CipherRun {
                cipher: "VIGENERE",
                mode: mode(decrypt),
                key,
                input: &input,
                output,
            })
        }

        Commands::Hill { text, matrix, decrypt } => {
            let input = read_input(text)?;
            let key = match matrix {
                Some(matrix) => HillKey::new(parse_matrix(&matrix)?)?,
                None => load_config(store)?.hill_key()?,
            };
            debug!(det = key.determinant(), "hill key");

            let output = if decrypt { key.decrypt(&input)? } else { key.encrypt(&input)? };
            print_run(json, CipherRun {
                cipher: "HILL",
                mode: mode(decrypt),
                key: format_matrix(key.rows()),
                input: &input,
                output,
            })
        }

        Commands::Playfair { text, key, decrypt, show_square } => {
            let input = read_input(text)?;
            let square = PlayfairSquare::new(&key);
            let output = if decrypt { square.decrypt(&input) } else { square.encrypt(&input) };

            if show_square && !json {
                println!("\n  KEY SQUARE");
                for line in square.render().lines() {
                    println!("  {}", line);
                }
            }
            print_run(json, CipherRun {
                cipher: "PLAYFAIR",
                mode: mode(decrypt),
                key,
                input: &input,
                output,
            })
        }

        Commands::Ic { text } => {
            let input = read_input(text)?;
            let ic = analysis::index_of_coincidence(&input);
            let interpretation = analysis::interpret_ic(ic);
            let config = load_config(store)?;
            let lengths = analysis::suggest_key_lengths_with(&input, &config.analysis);

            if json {
                return print_json(&serde_json::json!({
                    "index_of_coincidence": ic,
                    "interpretation": interpretation,
                    "key_lengths": lengths,
                }));
            }

            println!("\n  INDEX OF COINCIDENCE");
            println!("  ====================\n");
            println!("  IC: {:.4}", ic);
            println!("  {}", interpretation.describe());
            println!("\n  LIKELY KEY LENGTHS:");
            match lengths {
                Outcome::Ready(candidates) => {
                    for c in candidates {
                        println!("  {:>3}  avg IC {:.4}", c.length, c.score);
                    }
                }
                Outcome::InsufficientInput { required, found } => {
                    println!("  Need at least {} letters (found {})", required, found);
                }
            }
            Ok(())
        }

        Commands::Freq { text, chart } => {
            let input = read_input(text)?;
            let report = FrequencyAnalysis::analyze(&input);
            if json {
                return print_json(&report);
            }

            if chart {
                println!("{}", report.render_ascii());
                return Ok(());
            }
            if let Some(message) = report.message() {
                println!("  {}", message);
                return Ok(());
            }

            println!("\n  FREQUENCY ANALYSIS ({} letters)", report.total_letters);
            println!("  ==================\n");
            println!("  LETTER  COUNT  OBSERVED  EXPECTED      DIFF");
            for row in report.rows.iter().filter(|row| row.count > 0) {
                println!(
                    "  {:>6}  {:>5}  {:>7.2}%  {:>7.2}%  {:>+8.2}",
                    row.letter, row.count, row.percent, row.expected, row.difference
                );
            }
            Ok(())
        }

        Commands::Kasiski { text, gram } => {
            let input = read_input(text)?;
            let config = load_config(store)?;
            let gram = gram.unwrap_or(config.analysis.kasiski_gram_length);
            let outcome = kasiski::kasiski_examination_with(&input, gram, &config.analysis);
            if json {
                return print_json(&outcome);
            }

            match outcome {
                Outcome::Ready(report) => println!("{}", report.render()),
                Outcome::InsufficientInput { required, found } => {
                    println!("  Need at least {} letters (found {})", required, found);
                }
            }
            Ok(())
        }

        Commands::Hash { text, simulated } => {
            let input = read_input(text)?;
            let report = Hashes::digests(&input);
            let simulation = simulated.then(|| Hashes::simulated(&input));

            if json {
                return print_json(&serde_json::json!({
                    "digests": report,
                    "simulated": simulation,
                }));
            }

            println!("\n  HASHES");
            println!("  ======\n");
            for line in report.render().lines() {
                println!("  {}", line);
            }
            if let Some(simulation) = simulation {
                println!();
                for line in simulation.render().lines() {
                    println!("  {}", line);
                }
            }
            Ok(())
        }

        Commands::Config { command } => cmd_config(store, command),
    }
}

fn cmd_config(store: &ConfigStore, command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            let config = load_config(store)?;
            println!("# {}", store.path().display());
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }

        ConfigCommands::Init { force } => {
            if store.exists() && !force {
                anyhow::bail!(
                    "{} already exists. Use --force to overwrite",
                    store.path().display()
                );
            }
            store.save(&LabConfig::default())?;
            println!("  Wrote default config to {}", store.path().display());
            Ok(())
        }

        ConfigCommands::Path => {
            println!("{}", store.path().display());
            Ok(())
        }
    }
}

/// Positional text, or all of stdin
fn read_input(text: Option<String>) -> Result<String> {
    match text {
        Some(text) => Ok(text),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("reading text from stdin")?;
            Ok(buf.trim_end_matches(['\n', '\r']).to_string())
        }
    }
}

fn mode(decrypt: bool) -> &'static str {
    if decrypt { "decrypt" } else { "encrypt" }
}

fn print_run(json: bool, run: CipherRun) -> Result<()> {
    if json {
        return print_json(&run);
    }

    println!("\n  {} ({})", run.cipher, run.mode.to_uppercase());
    println!("  Key:    {}", run.key);
    println!("  Input:  {}", run.input);
    println!("  Output: {}", run.output);
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse "2,3;1,4" into rows. Whitespace around entries is ignored.
fn parse_matrix(text: &str) -> Result<Vec<Vec<i64>>> {
    text.split(';')
        .filter(|row| !row.trim().is_empty())
        .map(|row| {
            row.split(',')
                .map(|cell| {
                    cell.trim()
                        .parse::<i64>()
                        .with_context(|| format!("invalid matrix entry '{}'", cell.trim()))
                })
                .collect()
        })
        .collect()
}

fn format_matrix(rows: &[Vec<i64>]) -> String {
    rows.iter()
        .map(|row| row.iter().map(i64::to_string).collect::<Vec<_>>().join(","))
        .collect::<Vec<_>>()
        .join(";")
}
