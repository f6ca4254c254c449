//! Core types for the AD799x analyzer library
//!
//! This module defines the fundamental types exchanged with the host capture
//! engine and the transient values the decoder produces. The analyzer is
//! stateful only in the sense that it accumulates frames per packet - every
//! decoded value is recomputed on request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Packet identifier assigned by the host capture engine.
///
/// The host may report frames without a packet id; those frames all
/// aggregate under `None`. Identifier equality is plain integer identity.
pub type PacketId = Option<u64>;

/// Result type for analyzer operations
pub type Result<T> = std::result::Result<T, AnalyzerError>;

/// A single physical frame within an I2C packet
///
/// This represents one decoded electrical unit (one byte plus ack) as
/// reported by the host, before any device-level interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Logical position within the packet (0 = address byte, 1.. = data)
    pub index: u64,
    /// Host-defined frame type tag (carried through, not interpreted)
    pub frame_type: u8,
    /// Host-defined flag bitmask (carried through, not interpreted)
    pub flags: u8,
    /// Frame payload; for I2C this is the SDA byte
    pub value: u64,
}

/// Bus direction tag reported with annotation requests
///
/// The AD799x decode does not branch on direction (the header read/write
/// bit is authoritative), but the tag is part of the host contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Sda,
    Scl,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Sda => write!(f, "SDA"),
            Direction::Scl => write!(f, "SCL"),
        }
    }
}

/// Errors that can occur while configuring or driving the analyzer
///
/// The decoding paths themselves never fail - unknown packets, address
/// mismatches and short packets degrade to empty output. Errors exist only
/// at the configuration and host-protocol boundary.
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    #[error("Invalid I2C address literal: {0}")]
    InvalidAddress(String),

    #[error("Invalid reference voltage: {0} (must be >= 0)")]
    InvalidReferenceVoltage(f64),

    #[error("Malformed host request: {0}")]
    MalformedRequest(String),

    #[error("Unknown request type: {0}")]
    UnknownRequest(String),
}

/// Configuration features of the AD799x family
///
/// Bits 3..0 of the configuration register. External reference is an
/// enable flag; the other three are disable flags on the wire, so the
/// feature reads as enabled when its bit is clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    ExternalReference,
    Filtering,
    BitTrialDelay,
    SampleDelay,
}

impl Feature {
    /// Label used at full display width
    pub fn long_name(&self) -> &'static str {
        match self {
            Feature::ExternalReference => "External Reference",
            Feature::Filtering => "SDA and SCL Filtering",
            Feature::BitTrialDelay => "Bit Trial Delay",
            Feature::SampleDelay => "Sample Delay",
        }
    }

    /// Abbreviated label for narrow display budgets
    pub fn short_name(&self) -> &'static str {
        match self {
            Feature::ExternalReference => "Ext Ref",
            Feature::Filtering => "Filter",
            Feature::BitTrialDelay => "Bit Trial",
            Feature::SampleDelay => "Samp. Del.",
        }
    }
}

/// Decoded state of a configuration-register write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterConfig {
    /// Enabled conversion channels, ascending (subset of 0..=3)
    pub channels: Vec<u8>,
    /// Enabled features, in register declaration order
    pub features: Vec<Feature>,
}

/// A reconstructed ADC reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Channel the conversion was taken on (0..=3)
    pub channel: u8,
    /// Raw ADC code, left-justification already undone
    pub code: u32,
    /// True when the code does not fit the configured resolution,
    /// indicating a resolution/config mismatch. The value is passed
    /// through unclamped.
    pub out_of_range: bool,
}
