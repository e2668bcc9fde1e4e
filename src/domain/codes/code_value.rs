//! Discount code value object and random code generation.
//!
//! Codes are 8 characters drawn uniformly from a 33-character alphabet:
//! uppercase letters without `I` and `O`, and the digits `1`-`9`.
//! `0`, `O` and `I` never appear, so codes read back unambiguously over
//! the phone or from a printed receipt.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::ValidationError;

/// Characters a generated code may contain.
pub const CODE_ALPHABET: &[u8; 33] = b"ABCDEFGHJKLMNPQRSTUVWXYZ123456789";

/// Length of every generated code.
pub const CODE_LENGTH: usize = 8;

/// A validated discount code string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodeValue(String);

impl CodeValue {
    /// Parses a code typed or stored elsewhere, normalising to uppercase.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the code is empty, has the wrong length,
    /// or contains a character outside the alphabet.
    pub fn try_new(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(ValidationError::empty_field("code"));
        }
        if normalized.len() != CODE_LENGTH {
            return Err(ValidationError::out_of_range(
                "code_length",
                CODE_LENGTH as i64,
                CODE_LENGTH as i64,
                normalized.chars().count() as i64,
            ));
        }
        if !normalized.bytes().all(|b| CODE_ALPHABET.contains(&b)) {
            return Err(ValidationError::invalid_format(
                "code",
                "contains characters outside the code alphabet",
            ));
        }
        Ok(Self(normalized))
    }

    /// Draws a fresh random code.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let code = (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CodeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for CodeValue {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl TryFrom<String> for CodeValue {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(&value)
    }
}

/// Draws `count` distinct codes. Repeated draws within the run are re-drawn.
pub fn generate_unique<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<CodeValue> {
    let mut seen = HashSet::with_capacity(count);
    let mut codes = Vec::with_capacity(count);
    while codes.len() < count {
        let code = CodeValue::random(rng);
        if seen.insert(code.clone()) {
            codes.push(code);
        }
    }
    codes
}
