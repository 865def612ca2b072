//! Random password generator
//!
//! A convenience generator for filling in new entries, not a vault-grade
//! secret generator: every character is drawn independently and uniformly
//! from the pool, with no guarantee that each enabled class appears.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{PawsError, Result};

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGITS: &str = "0123456789";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>?";

/// Which character classes to draw from; lowercase is always included
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    pub length: usize,
    pub digits: bool,
    pub upper: bool,
    pub symbols: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            digits: true,
            upper: true,
            symbols: true,
        }
    }
}

impl GeneratorOptions {
    /// Lowercase letters only
    pub fn lowercase(length: usize) -> Self {
        Self {
            length,
            digits: false,
            upper: false,
            symbols: false,
        }
    }

    /// Characters a generated password may contain
    pub fn pool(&self) -> Vec<char> {
        let mut pool: Vec<char> = LOWERCASE.chars().collect();
        if self.digits {
            pool.extend(DIGITS.chars());
        }
        if self.upper {
            pool.extend(UPPERCASE.chars());
        }
        if self.symbols {
            pool.extend(SYMBOLS.chars());
        }
        pool
    }
}

/// Generate a password of `options.length` characters
pub fn generate(options: &GeneratorOptions) -> Result<String> {
    if options.length == 0 {
        return Err(PawsError::InvalidInput(
            "password length must be positive".to_string(),
        ));
    }

    let pool = options.pool();
    let mut rng = rand::thread_rng();

    (0..options.length)
        .map(|_| {
            pool.choose(&mut rng)
                .copied()
                .ok_or_else(|| PawsError::InvalidInput("empty character pool".to_string()))
        })
        .collect()
}
