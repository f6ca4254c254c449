//! AD799x Transaction Analyzer Library
//!
//! A small, reusable library for decoding captured I2C transactions of the
//! AD7991/AD7995/AD7999 analog-to-digital converter family into
//! human-readable annotations.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Reassembles per-frame notifications into per-packet buffers
//! - Validates the device address and read/write packet shape
//! - Reconstructs configuration writes and left-justified ADC readings
//! - Renders bubble ladders (per frame) and tabular summaries (per packet)
//!
//! The library does NOT:
//! - Decode SDA/SCL electrically (the capture engine owns that)
//! - Render or place annotations (strings are returned to the host)
//! - Persist anything across capture sessions
//!
//! All transport and argument handling is in the application layer
//! (ad799x-cli).
//!
//! # Example Usage
//!
//! ```
//! use ad799x_decoder::{Ad799xAnalyzer, AnalyzerConfig, Direction};
//!
//! // AD7991 (12 bits) at address 0b1001000 with a 3.3 V reference
//! let config = AnalyzerConfig::new(0b1001000, 12).with_reference_voltage(3.3);
//! let mut analyzer = Ad799xAnalyzer::new(config);
//!
//! // The host reports each frame of a read transaction as it arrives
//! analyzer.handle_frame(Some(1), 0, 0, 0, 0b1001_0001, 0);
//! analyzer.handle_frame(Some(1), 1, 0, 0, 0x1A, 0);
//! analyzer.handle_frame(Some(1), 2, 0, 0, 0xBC, 0);
//!
//! // ...and later asks for annotation text
//! let bubbles = analyzer.handle_bubble(Some(1), 2, 0, 100, 0, 0, Direction::Sda, 0xBC);
//! assert!(bubbles[0].starts_with("2.2140 V"));
//! ```

// Public modules
pub mod analyzer;
pub mod config;
pub mod display;
pub mod packet;
pub mod registers;
pub mod types;

// Re-export main types for convenience
pub use analyzer::Ad799xAnalyzer;
pub use config::{parse_binary_address, AnalyzerConfig};
pub use packet::PacketStore;
pub use types::{
    AnalyzerError, Direction, Feature, Frame, Measurement, PacketId, RegisterConfig, Result,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
