//! Deterministic instrument identifiers.
//!
//! A 20-character id composed of a 3-character asset-class code, the
//! instrument's short code padded to 4 characters, and a checksum-validated
//! hash source padded to 13. Encoding is pure: same inputs, same id.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const CODE_WIDTH: usize = 4;
const HASH_WIDTH: usize = 13;
const FILLER: char = 'X';

/// Errors raised while encoding an instrument id. Never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InstrumentIdError {
    #[error("unsupported asset class: '{value}'")]
    UnsupportedAssetClass { value: String },

    #[error("code must be 1-4 alphanumeric characters")]
    InvalidCode,

    #[error("'{value}' is not a valid ISIN format")]
    InvalidFormat { value: String },

    #[error("ISIN '{value}' failed checksum validation")]
    InvalidChecksum { value: String },

    #[error("hash derivation is not implemented for asset class '{asset_class}'")]
    NotImplemented { asset_class: &'static str },
}

/// Closed asset-class enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    Equity,
    Etf,
    Index,
    Crypto,
    Currency,
    Commodity,
}

impl AssetClass {
    pub const ALL: [Self; 6] = [
        Self::Equity,
        Self::Etf,
        Self::Index,
        Self::Crypto,
        Self::Currency,
        Self::Commodity,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equity => "equity",
            Self::Etf => "etf",
            Self::Index => "index",
            Self::Crypto => "crypto",
            Self::Currency => "currency",
            Self::Commodity => "commodity",
        }
    }

    /// Three-letter code embedded in instrument ids.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Equity => "EQU",
            Self::Etf => "ETF",
            Self::Index => "IND",
            Self::Crypto => "CRY",
            Self::Currency => "CUR",
            Self::Commodity => "COM",
        }
    }
}

impl Display for AssetClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = InstrumentIdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "equity" => Ok(Self::Equity),
            "etf" => Ok(Self::Etf),
            "index" => Ok(Self::Index),
            "crypto" => Ok(Self::Crypto),
            "currency" => Ok(Self::Currency),
            "commodity" => Ok(Self::Commodity),
            _ => Err(InstrumentIdError::UnsupportedAssetClass {
                value: value.to_owned(),
            }),
        }
    }
}

/// Fixed 20-character instrument identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstrumentId(String);

impl InstrumentId {
    /// Encode an id from an asset class, a short code, and a hash source.
    ///
    /// The hash source is validated per asset class; today only `equity` has
    /// a defined validation (ISIN format plus checksum). Other classes fail
    /// with [`InstrumentIdError::NotImplemented`] until their hash sources
    /// are specified.
    pub fn encode(
        asset_class: &str,
        code: &str,
        hash_source: &str,
    ) -> Result<Self, InstrumentIdError> {
        let class = AssetClass::from_str(asset_class)?;
        let code = normalize_code(code)?;

        let hash = match class {
            AssetClass::Equity => {
                validate_isin(hash_source)?;
                pad_right(&hash_source.to_ascii_uppercase(), HASH_WIDTH)
            }
            other => {
                return Err(InstrumentIdError::NotImplemented {
                    asset_class: other.as_str(),
                })
            }
        };

        Ok(Self(format!("{}{}{}", class.code(), code, hash)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for InstrumentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize_code(code: &str) -> Result<String, InstrumentIdError> {
    let valid = !code.is_empty()
        && code.chars().count() <= CODE_WIDTH
        && code.chars().all(|ch| ch.is_ascii_alphanumeric());
    if !valid {
        return Err(InstrumentIdError::InvalidCode);
    }
    Ok(pad_right(&code.to_ascii_uppercase(), CODE_WIDTH))
}

fn pad_right(value: &str, width: usize) -> String {
    let mut padded = value.to_owned();
    while padded.chars().count() < width {
        padded.push(FILLER);
    }
    padded
}

/// Validate an ISIN: 2 uppercase letters, 9 uppercase alphanumerics, 1 check
/// digit, then the Luhn-style digit-sum check over the letter-expanded code.
fn validate_isin(isin: &str) -> Result<(), InstrumentIdError> {
    if !isin_format_ok(isin) {
        return Err(InstrumentIdError::InvalidFormat {
            value: isin.to_owned(),
        });
    }
    if !isin_checksum_ok(isin) {
        return Err(InstrumentIdError::InvalidChecksum {
            value: isin.to_owned(),
        });
    }
    Ok(())
}

fn isin_format_ok(isin: &str) -> bool {
    let bytes = isin.as_bytes();
    bytes.len() == 12
        && bytes[..2].iter().all(u8::is_ascii_uppercase)
        && bytes[2..11]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
        && bytes[11].is_ascii_digit()
}

fn isin_checksum_ok(isin: &str) -> bool {
    // Expand letters to their two-digit values (A=10 .. Z=35), keep digits.
    let mut digits = Vec::with_capacity(isin.len() * 2);
    for ch in isin.chars() {
        if let Some(digit) = ch.to_digit(10) {
            digits.push(digit);
        } else {
            let value = ch as u32 - 'A' as u32 + 10;
            digits.push(value / 10);
            digits.push(value % 10);
        }
    }

    // Right to left; the rightmost digit is not doubled, every second one is.
    let mut total = 0;
    let mut double = false;
    for &digit in digits.iter().rev() {
        let mut value = digit;
        if double {
            value *= 2;
            if value > 9 {
                value -= 9;
            }
        }
        total += value;
        double = !double;
    }

    total % 10 == 0
}
