//! Main analyzer API
//!
//! This module provides the primary interface for the analyzer library.
//! The `Ad799xAnalyzer` struct is the entry point: the host feeds it one
//! event per decoded electrical frame and later asks it for bubble or
//! tabular annotation text.
//!
//! All calls into one analyzer instance must be serialized by the host;
//! the analyzer holds no locks. A concurrent host can wrap the instance
//! in a `Mutex` or `RwLock`.

use crate::config::AnalyzerConfig;
use crate::display;
use crate::packet::PacketStore;
use crate::registers;
use crate::types::{Direction, Frame, Measurement, PacketId};

/// Interpreted direction of a packet, from the header read/write bit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PacketShape {
    /// Header + configuration byte
    Write,
    /// Header + two conversion-result bytes
    Read,
}

impl PacketShape {
    fn frame_count(self) -> usize {
        match self {
            PacketShape::Write => 2,
            PacketShape::Read => 3,
        }
    }
}

/// Transaction analyzer for the AD7991/AD7995/AD7999 I2C ADC family
///
/// Owns a [`PacketStore`] that accumulates frames for the lifetime of the
/// capture session and an immutable [`AnalyzerConfig`]. Decoding is
/// recomputed per annotation request; nothing is cached.
pub struct Ad799xAnalyzer {
    config: AnalyzerConfig,
    packets: PacketStore,
}

impl Ad799xAnalyzer {
    /// Create an analyzer for the configured device
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            packets: PacketStore::new(),
        }
    }

    /// The configuration this analyzer was built with
    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Record one frame-arrival event
    ///
    /// Conversion data is spread across up to three frames, so frames are
    /// gathered here and interpreted later, once annotation requests come
    /// in. `value2` is protocol-specific (undefined for I2C) and ignored.
    ///
    /// Always returns an empty list - frame arrival never produces
    /// displayable output by itself.
    pub fn handle_frame(
        &mut self,
        packet_id: PacketId,
        frame_index: u64,
        frame_type: u8,
        flags: u8,
        value1: u64,
        _value2: u64,
    ) -> Vec<String> {
        self.packets.record(
            packet_id,
            Frame {
                index: frame_index,
                frame_type,
                flags,
                value: value1,
            },
        );

        Vec::new()
    }

    /// True when the packet's header addresses the configured device
    ///
    /// The upper 7 bits of the header byte are the device address; bit 0
    /// is the read flag. A packet whose header frame has not arrived yet
    /// does not match - a normal condition while the capture streams in.
    pub fn packet_matches(&self, packet_id: PacketId) -> bool {
        let Some(header) = self.packets.nth(packet_id, 0) else {
            log::debug!("No header frame yet for packet {:?}", packet_id);
            return false;
        };

        header.value >> 1 == u64::from(self.config.device_address)
    }

    /// Produce bubble annotation candidates for one frame
    ///
    /// Returns a ladder of strings, most detailed first, for the host to
    /// fit into the pixel width available over the waveform. Empty when
    /// the packet is not ours, not yet complete, or over-long for its
    /// read/write shape.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_bubble(
        &self,
        packet_id: PacketId,
        frame_index: u64,
        _start_sample: u64,
        _end_sample: u64,
        _frame_type: u8,
        _flags: u8,
        _direction: Direction,
        value: u64,
    ) -> Vec<String> {
        if !self.packet_matches(packet_id) {
            return Vec::new();
        }

        let Some(shape) = self.interpreted_shape(packet_id) else {
            return Vec::new();
        };

        let rank = self.packets.rank_of(packet_id, frame_index);

        match (shape, rank) {
            (PacketShape::Write, Some(0)) => vec![
                "Write to ADC Configuration".to_string(),
                "W to ADC".to_string(),
                "W".to_string(),
            ],
            (PacketShape::Write, Some(1)) => {
                let byte = value as u8;
                display::config_write_ladder(byte, &registers::configuration_bits(byte))
            }
            (PacketShape::Read, Some(0)) => vec![
                "Read ADC Value".to_string(),
                "R from ADC".to_string(),
                "R".to_string(),
            ],
            (PacketShape::Read, Some(1)) => {
                display::channel_ladder(registers::active_channel(value))
            }
            (PacketShape::Read, Some(2)) => {
                let Some(frame1) = self.packets.nth(packet_id, 1) else {
                    return vec![display::binary_literal(value)];
                };

                let measurement = self.measure(frame1.value, value);
                display::measurement_ladder(
                    &measurement,
                    self.config.bits,
                    self.config.reference_voltage,
                )
            }
            _ => vec![display::binary_literal(value)],
        }
    }

    /// Produce the tabular annotation for one frame
    ///
    /// The host requires a non-empty response, so packets that are not
    /// ours or not yet summarizable answer with a single space. Only the
    /// rank-1 frame carries the packet summary - the first point at which
    /// the whole transaction is known.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_tabular(
        &self,
        packet_id: PacketId,
        frame_index: u64,
        _start_sample: u64,
        _end_sample: u64,
        _frame_type: u8,
        _flags: u8,
        _direction: Direction,
        _value: u64,
    ) -> Vec<String> {
        let no_result = vec![" ".to_string()];

        if !self.packet_matches(packet_id) {
            return no_result;
        }

        let Some(shape) = self.interpreted_shape(packet_id) else {
            return no_result;
        };

        if self.packets.rank_of(packet_id, frame_index) != Some(1) {
            return no_result;
        }

        match shape {
            PacketShape::Write => {
                let Some(config_frame) = self.packets.nth(packet_id, 1) else {
                    return no_result;
                };

                let byte = config_frame.value as u8;
                vec![display::config_write_summary(&registers::configuration_bits(byte))]
            }
            PacketShape::Read => {
                let (Some(frame1), Some(frame2)) =
                    (self.packets.nth(packet_id, 1), self.packets.nth(packet_id, 2))
                else {
                    return no_result;
                };

                let measurement = self.measure(frame1.value, frame2.value);
                vec![display::read_summary(
                    &measurement,
                    self.config.bits,
                    self.config.reference_voltage,
                )]
            }
        }
    }

    /// Shape of the packet, once exactly the right number of frames exists
    ///
    /// `None` while frames are still missing, and also once a packet has
    /// accumulated more frames than its shape allows - an over-long packet
    /// is malformed for this device and never interpreted partially.
    fn interpreted_shape(&self, packet_id: PacketId) -> Option<PacketShape> {
        let header = self.packets.nth(packet_id, 0)?;

        let shape = if header.value & 1 == 1 {
            PacketShape::Read
        } else {
            PacketShape::Write
        };

        if self.packets.len(packet_id) != shape.frame_count() {
            log::debug!(
                "Packet {:?} has {} frames, need {} for {:?}",
                packet_id,
                self.packets.len(packet_id),
                shape.frame_count(),
                shape
            );
            return None;
        }

        Some(shape)
    }

    /// Reconstruct a measurement from the two data bytes
    fn measure(&self, frame1: u64, frame2: u64) -> Measurement {
        let code = registers::adc_code(frame1, frame2, self.config.bits);
        let out_of_range = !registers::code_in_range(code, self.config.bits);

        if out_of_range {
            log::warn!(
                "ADC code {} exceeds {}-bit range; check the configured resolution",
                code,
                self.config.bits
            );
        }

        Measurement {
            channel: registers::active_channel(frame1),
            code,
            out_of_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: u8 = 0b1001000;

    fn analyzer(bits: u32, vref: Option<f64>) -> Ad799xAnalyzer {
        let mut config = AnalyzerConfig::new(ADDRESS, bits);
        config.reference_voltage = vref;
        Ad799xAnalyzer::new(config)
    }

    fn feed(analyzer: &mut Ad799xAnalyzer, packet_id: PacketId, frames: &[(u64, u64)]) {
        for &(index, value) in frames {
            let out = analyzer.handle_frame(packet_id, index, 0, 0, value, 0);
            assert!(out.is_empty());
        }
    }

    fn bubble(analyzer: &Ad799xAnalyzer, packet_id: PacketId, frame_index: u64, value: u64) -> Vec<String> {
        analyzer.handle_bubble(packet_id, frame_index, 0, 100, 0, 0, Direction::Sda, value)
    }

    fn tabular(analyzer: &Ad799xAnalyzer, packet_id: PacketId, frame_index: u64, value: u64) -> Vec<String> {
        analyzer.handle_tabular(packet_id, frame_index, 0, 100, 0, 0, Direction::Sda, value)
    }

    #[test]
    fn test_unknown_packet_yields_empty_bubble() {
        let analyzer = analyzer(12, None);
        assert!(bubble(&analyzer, Some(1), 0, 0x91).is_empty());
    }

    #[test]
    fn test_address_mismatch_yields_empty_and_placeholder() {
        let mut analyzer = analyzer(12, None);
        // Header addresses 0b1001001, not our device
        feed(&mut analyzer, Some(1), &[(0, 0b1001_0011), (1, 0x1A), (2, 0xBC)]);

        assert!(bubble(&analyzer, Some(1), 0, 0b1001_0011).is_empty());
        assert_eq!(tabular(&analyzer, Some(1), 1, 0x1A), vec![" ".to_string()]);
    }

    #[test]
    fn test_incomplete_write_not_interpreted() {
        let mut analyzer = analyzer(12, None);
        // Write header alone - one frame stored, shape needs two
        feed(&mut analyzer, Some(2), &[(0, 0b1001_0000)]);

        assert!(bubble(&analyzer, Some(2), 0, 0b1001_0000).is_empty());
        assert_eq!(tabular(&analyzer, Some(2), 0, 0b1001_0000), vec![" ".to_string()]);
    }

    #[test]
    fn test_over_long_packet_not_interpreted() {
        let mut analyzer = analyzer(12, None);
        // A write shape with a third frame is malformed for this device
        feed(
            &mut analyzer,
            Some(3),
            &[(0, 0b1001_0000), (1, 0xF0), (2, 0x00)],
        );

        assert!(bubble(&analyzer, Some(3), 1, 0xF0).is_empty());
        assert_eq!(tabular(&analyzer, Some(3), 1, 0xF0), vec![" ".to_string()]);
    }

    #[test]
    fn test_write_packet_bubbles() {
        let mut analyzer = analyzer(12, None);
        let config_byte = 0b1111_0000u64;
        feed(&mut analyzer, Some(4), &[(0, 0b1001_0000), (1, config_byte)]);

        assert_eq!(
            bubble(&analyzer, Some(4), 0, 0b1001_0000),
            vec![
                "Write to ADC Configuration".to_string(),
                "W to ADC".to_string(),
                "W".to_string(),
            ]
        );

        let ladder = bubble(&analyzer, Some(4), 1, config_byte);
        assert_eq!(
            ladder[0],
            "Channels: 0, 1, 2, 3; Features: SDA and SCL Filtering, Bit Trial Delay, Sample Delay"
        );
        assert_eq!(ladder.last().unwrap(), "0b11110000");
    }

    #[test]
    fn test_write_packet_tabular_only_on_rank_1() {
        let mut analyzer = analyzer(12, None);
        feed(&mut analyzer, Some(5), &[(0, 0b1001_0000), (1, 0b0001_1000)]);

        assert_eq!(tabular(&analyzer, Some(5), 0, 0b1001_0000), vec![" ".to_string()]);
        assert_eq!(
            tabular(&analyzer, Some(5), 1, 0b0001_1000),
            vec!["[ADC config] Channels enabled: 0; Features enabled: External Reference".to_string()]
        );
    }

    #[test]
    fn test_read_packet_end_to_end() {
        // AD7991 at 0b1001000, 12 bits, 3.3 V reference
        let mut analyzer = analyzer(12, Some(3.3));
        feed(&mut analyzer, Some(6), &[(0, 0b1001_0001), (1, 0x1A), (2, 0xBC)]);

        assert_eq!(
            bubble(&analyzer, Some(6), 0, 0b1001_0001),
            vec![
                "Read ADC Value".to_string(),
                "R from ADC".to_string(),
                "R".to_string(),
            ]
        );

        // Channel from bits 5:4 of the first data byte: 0x1A -> 1
        assert_eq!(
            bubble(&analyzer, Some(6), 1, 0x1A),
            vec!["Channel: 1".to_string(), "Ch: 1".to_string(), "1".to_string()]
        );

        // 0xABC = 2748; 2748/4096 * 3.3 V
        let ladder = bubble(&analyzer, Some(6), 2, 0xBC);
        assert_eq!(ladder[0], "2.2140 V (2748)");

        assert_eq!(
            tabular(&analyzer, Some(6), 1, 0x1A),
            vec!["[ADC read] channel 1: 2.2140 V (2748)".to_string()]
        );
    }

    #[test]
    fn test_read_packet_without_reference_voltage() {
        let mut analyzer = analyzer(12, None);
        feed(&mut analyzer, Some(7), &[(0, 0b1001_0001), (1, 0x0A), (2, 0xBC)]);

        assert_eq!(bubble(&analyzer, Some(7), 2, 0xBC), vec!["2748".to_string()]);
        assert_eq!(
            tabular(&analyzer, Some(7), 1, 0x0A),
            vec!["[ADC read] channel 0: 2748".to_string()]
        );
    }

    #[test]
    fn test_duplicate_frame_delivery_keeps_first() {
        let mut analyzer = analyzer(12, None);
        feed(&mut analyzer, Some(8), &[(0, 0b1001_0001), (1, 0x0A), (2, 0xBC)]);
        // Redelivery with a different value must not change the decode
        feed(&mut analyzer, Some(8), &[(2, 0xFF)]);

        assert_eq!(bubble(&analyzer, Some(8), 2, 0xBC), vec!["2748".to_string()]);
    }

    #[test]
    fn test_absent_packet_id_aggregates_under_none() {
        let mut analyzer = analyzer(12, None);
        feed(&mut analyzer, None, &[(0, 0b1001_0000), (1, 0b0000_0111)]);

        assert_eq!(
            tabular(&analyzer, None, 1, 0b0000_0111),
            vec!["[ADC config] Channels enabled: ; Features enabled: ".to_string()]
        );
    }

    #[test]
    fn test_unranked_frame_falls_back_to_binary_literal() {
        let mut analyzer = analyzer(12, None);
        feed(&mut analyzer, Some(9), &[(0, 0b1001_0000), (1, 0xF0)]);

        // Frame index 5 was never stored for this packet
        assert_eq!(bubble(&analyzer, Some(9), 5, 0b101), vec!["0b101".to_string()]);
    }
}
