//! Line protocol with the capture engine
//!
//! The capture engine runs this analyzer as a subprocess and exchanges
//! tab-separated lines over stdin/stdout. Requests:
//!
//! ```text
//! frame    <packet_id|-> <index> <type> <flags> <value1> <value2>
//! bubble   <packet_id|-> <index> <start> <end> <type> <flags> <dir> <value>
//! tabular  <packet_id|-> <index> <start> <end> <type> <flags> <dir> <value>
//! ```
//!
//! Integer fields accept decimal, `0x` hex or `0b` binary. `-` stands for
//! an absent packet id. Each request is answered with one line: the
//! returned strings joined by tabs, or an empty line for an empty list.

use ad799x_decoder::{AnalyzerError, Direction, PacketId, Result};

/// One annotation request (shared field layout of `bubble` and `tabular`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnnotationRequest {
    pub packet_id: PacketId,
    pub frame_index: u64,
    pub start_sample: u64,
    pub end_sample: u64,
    pub frame_type: u8,
    pub flags: u8,
    pub direction: Direction,
    pub value: u64,
}

/// A parsed host request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Request {
    /// Frame-arrival notification
    Frame {
        packet_id: PacketId,
        frame_index: u64,
        frame_type: u8,
        flags: u8,
        value1: u64,
        value2: u64,
    },
    /// Bubble-text request
    Bubble(AnnotationRequest),
    /// Tabular-text request
    Tabular(AnnotationRequest),
}

/// Parse one request line
pub fn parse_request(line: &str) -> Result<Request> {
    let mut fields = line.trim_end_matches(['\r', '\n']).split('\t');

    let command = fields
        .next()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AnalyzerError::MalformedRequest("empty line".to_string()))?;

    let fields: Vec<&str> = fields.collect();

    match command {
        "frame" => {
            expect_fields(line, &fields, 6)?;
            Ok(Request::Frame {
                packet_id: parse_packet_id(fields[0])?,
                frame_index: parse_int(fields[1])?,
                frame_type: parse_int(fields[2])? as u8,
                flags: parse_int(fields[3])? as u8,
                value1: parse_int(fields[4])?,
                value2: parse_int(fields[5])?,
            })
        }
        "bubble" => Ok(Request::Bubble(parse_annotation(line, &fields)?)),
        "tabular" => Ok(Request::Tabular(parse_annotation(line, &fields)?)),
        other => Err(AnalyzerError::UnknownRequest(other.to_string())),
    }
}

/// Encode a response list as one output line
///
/// Plain mode joins the candidates with tabs; JSON mode emits a JSON
/// array for hosts that prefer structured output.
pub fn encode_response(candidates: &[String], json: bool) -> String {
    if json {
        // Vec<String> cannot fail to serialize
        serde_json::to_string(candidates).unwrap_or_else(|_| "[]".to_string())
    } else {
        candidates.join("\t")
    }
}

fn parse_annotation(line: &str, fields: &[&str]) -> Result<AnnotationRequest> {
    expect_fields(line, fields, 8)?;

    Ok(AnnotationRequest {
        packet_id: parse_packet_id(fields[0])?,
        frame_index: parse_int(fields[1])?,
        start_sample: parse_int(fields[2])?,
        end_sample: parse_int(fields[3])?,
        frame_type: parse_int(fields[4])? as u8,
        flags: parse_int(fields[5])? as u8,
        direction: parse_direction(fields[6])?,
        value: parse_int(fields[7])?,
    })
}

fn expect_fields(line: &str, fields: &[&str], count: usize) -> Result<()> {
    if fields.len() != count {
        return Err(AnalyzerError::MalformedRequest(format!(
            "expected {} fields, got {}: {:?}",
            count,
            fields.len(),
            line
        )));
    }
    Ok(())
}

fn parse_packet_id(field: &str) -> Result<PacketId> {
    if field == "-" {
        return Ok(None);
    }
    parse_int(field).map(Some)
}

fn parse_int(field: &str) -> Result<u64> {
    let parsed = if let Some(hex) = field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else if let Some(bin) = field.strip_prefix("0b").or_else(|| field.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2)
    } else {
        field.parse()
    };

    parsed.map_err(|_| AnalyzerError::MalformedRequest(format!("bad integer: {:?}", field)))
}

fn parse_direction(field: &str) -> Result<Direction> {
    match field.to_ascii_lowercase().as_str() {
        "sda" | "0" => Ok(Direction::Sda),
        "scl" | "1" => Ok(Direction::Scl),
        other => Err(AnalyzerError::MalformedRequest(format!(
            "bad direction: {:?}",
            other
        ))),
    }
}
