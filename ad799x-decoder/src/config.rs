//! Analyzer configuration types
//!
//! This module defines the per-analyzer settings fed in by the host
//! application at construction time. The analyzer itself is intentionally
//! simple - protocol transport and argument validation live in the
//! application layer.

use crate::types::{AnalyzerError, Result};
use serde::{Deserialize, Serialize};

/// Configuration for one analyzer instance
///
/// Immutable once the analyzer is constructed. The resolution selects the
/// family member: 12 bits for the AD7991, 10 for the AD7995, 8 for the
/// AD7999. Other values are accepted unvalidated; the reconstruction
/// generalizes and out-of-range codes are flagged downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// 7-bit I2C device address to match packets against
    pub device_address: u8,

    /// ADC resolution in bits (12 = AD7991, 10 = AD7995, 8 = AD7999)
    pub bits: u32,

    /// Reference voltage; `None` disables voltage display
    #[serde(default)]
    pub reference_voltage: Option<f64>,
}

impl AnalyzerConfig {
    /// Create a configuration with voltage display disabled
    pub fn new(device_address: u8, bits: u32) -> Self {
        Self {
            device_address,
            bits,
            reference_voltage: None,
        }
    }

    /// Builder method: enable voltage display with the given reference
    pub fn with_reference_voltage(mut self, volts: f64) -> Self {
        self.reference_voltage = Some(volts);
        self
    }

    /// Check invariants the type system cannot express
    pub fn validate(&self) -> Result<()> {
        if let Some(v) = self.reference_voltage {
            if !v.is_finite() || v < 0.0 {
                return Err(AnalyzerError::InvalidReferenceVoltage(v));
            }
        }
        Ok(())
    }
}

/// Parse a 7-bit I2C address given as a base-2 literal
///
/// Hosts configure the address the way datasheets print it, e.g.
/// `0b0101000` or `0101000`. Values wider than 7 bits are rejected.
pub fn parse_binary_address(literal: &str) -> Result<u8> {
    let digits = literal
        .strip_prefix("0b")
        .or_else(|| literal.strip_prefix("0B"))
        .unwrap_or(literal);

    let address = u8::from_str_radix(digits, 2)
        .map_err(|_| AnalyzerError::InvalidAddress(literal.to_string()))?;

    if address > 0x7F {
        return Err(AnalyzerError::InvalidAddress(literal.to_string()));
    }

    Ok(address)
}
