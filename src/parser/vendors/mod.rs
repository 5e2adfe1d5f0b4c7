//! Built-in parsers for the device CLIs this tool meets in practice.
//!
//! Each vendor module exposes plain parse functions; nothing here holds
//! state. Kinds are named `vendor.command`.

pub mod arista_eos;
pub mod cisco_ios;
pub mod juniper_junos;
pub mod sonic;

use super::{ParsedRecord, ParserRegistry};
use crate::error::ParseError;

/// Register every built-in vendor parser.
pub(crate) fn register_builtins(registry: &mut ParserRegistry) {
    registry.register("cisco_ios.version", cisco_ios::version);
    registry.register("cisco_ios.bgp_summary", cisco_ios::bgp_summary);
    registry.register("arista_eos.version", arista_eos::version);
    registry.register("arista_eos.bgp_summary", arista_eos::bgp_summary);
    registry.register("juniper_junos.version", juniper_junos::version);
    registry.register("juniper_junos.bgp_summary", juniper_junos::bgp_summary);
    registry.register("sonic.version", sonic::version);
    registry.register("sonic.bgp_summary", sonic::bgp_summary);
}

/// Shared guard: empty output is malformed, a record with no extracted
/// fields means the parser recognized nothing.
pub(crate) fn finish(
    kind: &str,
    text: &str,
    record: ParsedRecord,
) -> Result<Vec<ParsedRecord>, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Malformed {
            kind: kind.to_string(),
            message: "empty output".to_string(),
        });
    }
    if record.is_empty() {
        return Err(ParseError::NoMatch {
            kind: kind.to_string(),
        });
    }
    Ok(vec![record])
}

/// Take the value after the first colon on a labeled line.
pub(crate) fn after_colon(line: &str) -> Option<&str> {
    line.splitn(2, ':').nth(1).map(str::trim)
}
