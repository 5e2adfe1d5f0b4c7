//! Cisco IOS output parsers.

use once_cell::sync::Lazy;
use regex::Regex;

use super::finish;
use crate::error::ParseError;
use crate::parser::ParsedRecord;

static MODEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"Cisco (.*?) Software").unwrap());
static VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"Version\s+([\d.()A-Za-z]+)").unwrap());
static UPTIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)uptime is (.+)$").unwrap());
static SERIAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Serial Number\s*:\s*([A-Z0-9]+)").unwrap());
static ROUTER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"BGP router identifier ([0-9.]+)").unwrap());
static NEIGHBOR_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+\.\d+\.\d+\.\d+)\s").unwrap());

/// Parse `show version`.
pub fn version(text: &str) -> Result<Vec<ParsedRecord>, ParseError> {
    let mut record = ParsedRecord::new("cisco_ios.version");

    if let Some(c) = MODEL.captures(text) {
        record.set("model", c[1].trim());
    }
    if let Some(c) = VERSION.captures(text) {
        record.set("version", &c[1]);
    }
    if let Some(c) = UPTIME.captures(text) {
        record.set("uptime", c[1].trim());
    }
    if let Some(c) = SERIAL.captures(text) {
        record.set("serial", &c[1]);
    }

    finish("cisco_ios.version", text, record)
}

/// Parse `show ip bgp summary`.
pub fn bgp_summary(text: &str) -> Result<Vec<ParsedRecord>, ParseError> {
    let mut record = ParsedRecord::new("cisco_ios.bgp_summary");

    if let Some(c) = ROUTER_ID.captures(text) {
        record.set("router_id", &c[1]);
    }

    let neighbors = text
        .lines()
        .filter(|line| NEIGHBOR_ROW.is_match(line))
        .count();
    if neighbors > 0 {
        record.set("neighbors", neighbors.to_string());
    }

    finish("cisco_ios.bgp_summary", text, record)
}
