//! SONiC CLI output parsers.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{after_colon, finish};
use crate::error::ParseError;
use crate::parser::ParsedRecord;

static NEIGHBOR_ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\.\d+\.\d+\.\d+").unwrap());

/// Parse `show version`.
pub fn version(text: &str) -> Result<Vec<ParsedRecord>, ParseError> {
    let mut record = ParsedRecord::new("sonic.version");

    for line in text.lines() {
        if line.contains("Platform:") {
            if let Some(v) = after_colon(line) {
                record.set("platform", v);
            }
        } else if line.contains("SONiC Software Version:") {
            if let Some(v) = after_colon(line) {
                record.set("version", v);
            }
        } else if line.contains("System uptime:") {
            if let Some(v) = after_colon(line) {
                record.set("uptime", v);
            }
        }
    }

    finish("sonic.version", text, record)
}

/// Parse `show ip bgp summary`.
pub fn bgp_summary(text: &str) -> Result<Vec<ParsedRecord>, ParseError> {
    let mut record = ParsedRecord::new("sonic.bgp_summary");

    let neighbors = text
        .lines()
        .filter(|line| NEIGHBOR_ROW.is_match(line))
        .count();
    if neighbors > 0 {
        record.set("neighbors", neighbors.to_string());
    }

    finish("sonic.bgp_summary", text, record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_show_version() {
        let output = "\
SONiC Software Version: SONiC.202205.1
Platform: x86_64-accton_as7726_32x-r0
HwSKU: Accton-AS7726-32X
System uptime: 21 days, 04:10:11
";
        let records = version(output).unwrap();
        let record = &records[0];
        assert_eq!(record.get("version"), Some("SONiC.202205.1"));
        assert_eq!(record.get("platform"), Some("x86_64-accton_as7726_32x-r0"));
        assert_eq!(record.get("uptime"), Some("21 days, 04:10:11"));
    }

    #[test]
    fn parses_bgp_summary() {
        let output = "\
IPv4 Unicast Summary:
Neighbor        V  AS     MsgRcvd  MsgSent  TblVer  InQ  OutQ  Up/Down  State/PfxRcd
10.0.2.1        4  65030  300      301      0       0    0     03:00:00 24
10.0.2.2        4  65031  250      249      0       0    0     01:20:00 18
";
        let records = bgp_summary(output).unwrap();
        assert_eq!(records[0].get("neighbors"), Some("2"));
    }
}
