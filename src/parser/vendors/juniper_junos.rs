//! Juniper JUNOS output parsers.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{after_colon, finish};
use crate::error::ParseError;
use crate::parser::ParsedRecord;

static RELEASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Release\s+\[?([0-9][0-9A-Z.\-]*)").unwrap());

/// Parse `show version`.
pub fn version(text: &str) -> Result<Vec<ParsedRecord>, ParseError> {
    let mut record = ParsedRecord::new("juniper_junos.version");

    for line in text.lines() {
        if line.contains("Model:") {
            if let Some(v) = after_colon(line) {
                record.set("model", v);
            }
        } else if line.contains("JUNOS Software Release") {
            if let Some(c) = RELEASE.captures(line) {
                record.set("version", &c[1]);
            }
        } else if line.contains("Serial ID:") {
            if let Some(v) = after_colon(line) {
                record.set("serial", v);
            }
        }
    }

    finish("juniper_junos.version", text, record)
}

/// Parse `show bgp summary`.
pub fn bgp_summary(text: &str) -> Result<Vec<ParsedRecord>, ParseError> {
    let mut record = ParsedRecord::new("juniper_junos.bgp_summary");

    for line in text.lines() {
        if line.contains("Router ID:") {
            if let Some(v) = after_colon(line) {
                record.set("router_id", v);
            }
        } else if line.contains("Local AS:") {
            if let Some(v) = after_colon(line) {
                record.set("local_as", v);
            }
        }
    }

    finish("juniper_junos.bgp_summary", text, record)
}
