//! AD799x Analyzer CLI Application
//!
//! Command-line host adapter for the ad799x-decoder library. The capture
//! engine launches this binary as a subprocess, passes the device settings
//! on the command line (or via a TOML file) and exchanges tab-separated
//! request/response lines over stdin/stdout until EOF.

use anyhow::{bail, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use ad799x_decoder::{parse_binary_address, Ad799xAnalyzer, AnalyzerConfig};

mod config;
mod protocol;

/// AD799x Analyzer - Decode captured I2C ADC transactions
#[derive(Parser, Debug)]
#[command(name = "ad799x-cli")]
#[command(about = "Decode AD7991/AD7995/AD7999 I2C transactions into annotations", long_about = None)]
#[command(version)]
struct Args {
    /// Device I2C address as a base-2 integer (e.g. 0b1001000)
    address: Option<String>,

    /// ADC resolution in bits: AD7991 = 12, AD7995 = 10, AD7999 = 8
    bits: Option<u32>,

    /// Reference voltage for rendering readings as voltages
    #[arg(long, value_name = "VOLTS")]
    reference_voltage: Option<f64>,

    /// Path to configuration file (config.toml); flags win over file values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Emit responses as JSON arrays instead of tab-separated lines
    #[arg(long)]
    json: bool,

    /// Verbosity level (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("AD799x Analyzer CLI v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using decoder library v{}", ad799x_decoder::VERSION);

    if args.address.is_none() && args.config.is_none() {
        // No arguments - show help
        println!("AD799x Analyzer - No device specified");
        println!("\nQuick Start:");
        println!("  ad799x-cli 0b1001000 12 --reference-voltage 3.3");
        println!("  ad799x-cli --config config.toml");
        println!("\nUse --help for more options");
        return Ok(());
    }

    let analyzer_config = build_analyzer_config(&args)?;
    analyzer_config.validate()?;

    log::info!(
        "Analyzing device 0b{:07b}, {} bits, reference voltage {:?}",
        analyzer_config.device_address,
        analyzer_config.bits,
        analyzer_config.reference_voltage
    );

    let analyzer = Ad799xAnalyzer::new(analyzer_config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(analyzer, stdin.lock(), stdout.lock(), args.json)
}

/// Merge command-line flags over optional file configuration
fn build_analyzer_config(args: &Args) -> Result<AnalyzerConfig> {
    let file = match &args.config {
        Some(path) => Some(config::load_config(path)?),
        None => None,
    };

    let address_literal = args
        .address
        .clone()
        .or_else(|| file.as_ref().map(|f| f.device.address.clone()));
    let Some(address_literal) = address_literal else {
        bail!("No device address given (flag or config file)");
    };

    let bits = args.bits.or_else(|| file.as_ref().map(|f| f.device.bits));
    let Some(bits) = bits else {
        bail!("No ADC resolution given (flag or config file)");
    };

    let reference_voltage = args
        .reference_voltage
        .or_else(|| file.as_ref().and_then(|f| f.device.reference_voltage));

    let mut analyzer_config = AnalyzerConfig::new(parse_binary_address(&address_literal)?, bits);
    analyzer_config.reference_voltage = reference_voltage;
    Ok(analyzer_config)
}

/// Serve request lines until EOF
///
/// Every non-blank input line gets exactly one response line; malformed
/// requests are logged and answered with an empty response so the host
/// never stalls waiting.
fn serve<R: BufRead, W: Write>(
    mut analyzer: Ad799xAnalyzer,
    reader: R,
    mut writer: W,
    json: bool,
) -> Result<()> {
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match protocol::parse_request(&line) {
            Ok(request) => dispatch(&mut analyzer, request),
            Err(e) => {
                log::warn!("Ignoring request: {}", e);
                Vec::new()
            }
        };

        writeln!(writer, "{}", protocol::encode_response(&response, json))?;
        writer.flush()?;
    }

    log::info!("Capture engine closed the stream, exiting");
    Ok(())
}

fn dispatch(analyzer: &mut Ad799xAnalyzer, request: protocol::Request) -> Vec<String> {
    use protocol::Request;

    match request {
        Request::Frame {
            packet_id,
            frame_index,
            frame_type,
            flags,
            value1,
            value2,
        } => analyzer.handle_frame(packet_id, frame_index, frame_type, flags, value1, value2),
        Request::Bubble(r) => analyzer.handle_bubble(
            r.packet_id,
            r.frame_index,
            r.start_sample,
            r.end_sample,
            r.frame_type,
            r.flags,
            r.direction,
            r.value,
        ),
        Request::Tabular(r) => analyzer.handle_tabular(
            r.packet_id,
            r.frame_index,
            r.start_sample,
            r.end_sample,
            r.frame_type,
            r.flags,
            r.direction,
            r.value,
        ),
    }
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn test_analyzer() -> Ad799xAnalyzer {
        Ad799xAnalyzer::new(AnalyzerConfig::new(0b1001000, 12).with_reference_voltage(3.3))
    }

    #[test]
    fn test_serve_read_transaction() {
        let input = "\
frame\t1\t0\t0\t0\t0b10010001\t0
frame\t1\t1\t0\t0\t0x1A\t0
frame\t1\t2\t0\t0\t0xBC\t0
bubble\t1\t2\t100\t200\t0\t0\tsda\t0xBC
tabular\t1\t1\t50\t100\t0\t0\tsda\t0x1A
";
        let mut output = Vec::new();
        serve(test_analyzer(), Cursor::new(input), &mut output, false).unwrap();

        let lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
        assert_eq!(
            lines,
            vec![
                "",
                "",
                "",
                "2.2140 V (2748)\t2.2140 V\t2.21",
                "[ADC read] channel 1: 2.2140 V (2748)",
            ]
        );
    }

    #[test]
    fn test_serve_answers_malformed_lines_with_empty_response() {
        let input = "nonsense\t1\t2\nframe\t1\t0\t0\t0\t0x90\t0\n";
        let mut output = Vec::new();
        serve(test_analyzer(), Cursor::new(input), &mut output, false).unwrap();

        let lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
        assert_eq!(lines, vec!["", ""]);
    }

    #[test]
    fn test_serve_json_mode() {
        let input = "\
frame\t2\t0\t0\t0\t0b10010000\t0
frame\t2\t1\t0\t0\t0b11110000\t0
bubble\t2\t0\t0\t50\t0\t0\tsda\t0b10010000
";
        let mut output = Vec::new();
        serve(test_analyzer(), Cursor::new(input), &mut output, true).unwrap();

        let lines: Vec<&str> = std::str::from_utf8(&output).unwrap().lines().collect();
        assert_eq!(lines[2], r#"["Write to ADC Configuration","W to ADC","W"]"#);
    }

    #[test]
    fn test_build_analyzer_config_requires_address() {
        let args = Args {
            address: None,
            bits: Some(12),
            reference_voltage: None,
            config: None,
            json: false,
            verbose: 0,
            quiet: false,
        };
        assert!(build_analyzer_config(&args).is_err());
    }

    #[test]
    fn test_build_analyzer_config_flags_win_over_file() {
        use std::io::Write as _;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[device]\naddress = \"0b0101000\"\nbits = 10\nreference_voltage = 5.0"
        )
        .unwrap();

        let args = Args {
            address: Some("0b1001000".to_string()),
            bits: None,
            reference_voltage: None,
            config: Some(file.path().to_path_buf()),
            json: false,
            verbose: 0,
            quiet: false,
        };

        let analyzer_config = build_analyzer_config(&args).unwrap();
        assert_eq!(analyzer_config.device_address, 0b1001000);
        assert_eq!(analyzer_config.bits, 10);
        assert_eq!(analyzer_config.reference_voltage, Some(5.0));
    }
}
