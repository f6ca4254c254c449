//! Rendering decoded values for the host
//!
//! Bubble annotations are returned as a ladder of strings, most detailed
//! first, so the host can pick the longest one that fits the pixel width
//! available over the waveform. Tabular output is a single summary line
//! per packet.

use crate::types::{Measurement, RegisterConfig};

/// Render a raw value as a binary literal, e.g. `0b10010001`
///
/// Fallback bubble content for frames of a matching device that have no
/// specific interpretation.
pub fn binary_literal(value: u64) -> String {
    format!("{:#b}", value)
}

/// Display ladder for a reconstructed measurement, most detailed first
///
/// Without a reference voltage only the raw code is rendered. With one,
/// the code is scaled to a voltage and rendered at three widths. The
/// out-of-range marker appears on the detailed form only.
pub fn measurement_ladder(
    measurement: &Measurement,
    bits: u32,
    reference_voltage: Option<f64>,
) -> Vec<String> {
    let Some(vref) = reference_voltage else {
        let mut raw = measurement.code.to_string();
        if measurement.out_of_range {
            raw.push_str(" [out of range]");
        }
        return vec![raw];
    };

    let voltage = measurement.code as f64 / 2f64.powi(bits as i32) * vref;

    let mut detailed = format!("{:.4} V ({})", voltage, measurement.code);
    if measurement.out_of_range {
        detailed.push_str(" [out of range]");
    }

    vec![
        detailed,
        format!("{:.4} V", voltage),
        format!("{:.2}", voltage),
    ]
}

/// Single most-detailed measurement rendering, used by tabular output
pub fn measurement_summary(
    measurement: &Measurement,
    bits: u32,
    reference_voltage: Option<f64>,
) -> String {
    measurement_ladder(measurement, bits, reference_voltage)
        .into_iter()
        .next()
        .unwrap_or_default()
}

/// Display ladder for the channel byte of a read, most detailed first
pub fn channel_ladder(channel: u8) -> Vec<String> {
    vec![
        format!("Channel: {}", channel),
        format!("Ch: {}", channel),
        channel.to_string(),
    ]
}

/// Display ladder for a configuration-register write, most detailed first
///
/// Six rungs: full labels, short labels, short labels with the feature
/// nibble as a binary literal, channels only, bare channel list, and the
/// whole byte as a binary literal.
pub fn config_write_ladder(byte: u8, config: &RegisterConfig) -> Vec<String> {
    let channels_long = config
        .channels
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let channels_short = config
        .channels
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join("/");

    let features_long = config
        .features
        .iter()
        .map(|f| f.long_name())
        .collect::<Vec<_>>()
        .join(", ");
    let features_short = config
        .features
        .iter()
        .map(|f| f.short_name())
        .collect::<Vec<_>>()
        .join("/");

    vec![
        format!("Channels: {}; Features: {}", channels_long, features_long),
        format!("Ch: {}; Feat: {}", channels_short, features_short),
        format!("Ch: {}; Feat: {}", channels_short, binary_literal(u64::from(byte & 0b1111))),
        format!("Ch: {}", channels_short),
        channels_short,
        binary_literal(u64::from(byte)),
    ]
}

/// Tabular summary line for a configuration write
pub fn config_write_summary(config: &RegisterConfig) -> String {
    let channels = config
        .channels
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    let features = config
        .features
        .iter()
        .map(|f| f.long_name())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "[ADC config] Channels enabled: {}; Features enabled: {}",
        channels, features
    )
}

/// Tabular summary line for a completed read
pub fn read_summary(measurement: &Measurement, bits: u32, reference_voltage: Option<f64>) -> String {
    format!(
        "[ADC read] channel {}: {}",
        measurement.channel,
        measurement_summary(measurement, bits, reference_voltage)
    )
}
