//! Arista EOS output parsers.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{after_colon, finish};
use crate::error::ParseError;
use crate::parser::ParsedRecord;

static LOCAL_AS: Lazy<Regex> = Lazy::new(|| Regex::new(r"AS (\d+)").unwrap());
static NEIGHBOR_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\.\d+\.\d+\.\d+").unwrap());

/// Parse `show version`.
pub fn version(text: &str) -> Result<Vec<ParsedRecord>, ParseError> {
    let mut record = ParsedRecord::new("arista_eos.version");

    for line in text.lines() {
        if line.contains("Model:") {
            if let Some(v) = after_colon(line) {
                record.set("model", v);
            }
        } else if line.contains("System uptime:") {
            if let Some(v) = after_colon(line) {
                record.set("uptime", v);
            }
        } else if line.contains("Software image version:") {
            if let Some(v) = after_colon(line) {
                record.set("version", v);
            }
        } else if line.contains("Serial number:") {
            if let Some(v) = after_colon(line) {
                record.set("serial", v);
            }
        }
    }

    finish("arista_eos.version", text, record)
}

/// Parse `show ip bgp summary`.
pub fn bgp_summary(text: &str) -> Result<Vec<ParsedRecord>, ParseError> {
    let mut record = ParsedRecord::new("arista_eos.bgp_summary");

    for line in text.lines() {
        if line.contains("BGP summary") {
            if let Some(c) = LOCAL_AS.captures(line) {
                record.set("local_as", &c[1]);
            }
        }
    }

    let neighbors = text
        .lines()
        .filter(|line| NEIGHBOR_ROW.is_match(line))
        .count();
    if neighbors > 0 {
        record.set("neighbors", neighbors.to_string());
    }

    finish("arista_eos.bgp_summary", text, record)
}
