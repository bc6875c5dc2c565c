//! Shared protocol definitions for the chat server and client.
//!
//! The wire protocol is newline-delimited UTF-8 text over TCP. During
//! username negotiation the server drives the exchange with the control
//! lines below; once a name is accepted every line is free-form chat
//! input interpreted by the server's command router.

use thiserror::Error;

/// Control line: the server wants a (new) username candidate.
pub const ENTER_USERNAME: &str = "ENTER_USERNAME";

/// Control line: the last candidate was accepted, normal traffic follows.
pub const VALID: &str = "VALID";

/// Default server host used by the client when none is given.
pub const DEFAULT_HOST: &str = "localhost";

/// Default TCP port for both binaries.
pub const DEFAULT_PORT: &str = "3000";

/// Maximum number of concurrently connected sessions.
pub const MAX_SESSIONS: usize = 50;

/// Errors produced while validating process arguments, before any socket
/// is opened.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("arguments cannot be blank")]
    BlankArgument,
    #[error("port number invalid: {0:?}")]
    InvalidPort(String),
}

/// Parses a port argument. Blank and non-numeric values are refused, as
/// is port zero: the protocol requires a positive port number.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::BlankArgument);
    }
    match trimmed.parse::<u16>() {
        Ok(0) | Err(_) => Err(ConfigError::InvalidPort(raw.to_string())),
        Ok(port) => Ok(port),
    }
}

/// Checks a host argument. Only blankness is validated here; resolution
/// failures surface when the client connects.
pub fn validate_host(raw: &str) -> Result<&str, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::BlankArgument);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_port_accepts_valid_numbers() {
        assert_eq!(parse_port("3000"), Ok(3000));
        assert_eq!(parse_port("1"), Ok(1));
        assert_eq!(parse_port(" 8080 "), Ok(8080));
    }

    #[test]
    fn parse_port_rejects_blank() {
        assert_eq!(parse_port(""), Err(ConfigError::BlankArgument));
        assert_eq!(parse_port("    "), Err(ConfigError::BlankArgument));
    }

    #[test]
    fn parse_port_rejects_non_numeric() {
        assert!(matches!(parse_port("invalid"), Err(ConfigError::InvalidPort(_))));
        assert!(matches!(parse_port("-1"), Err(ConfigError::InvalidPort(_))));
        assert!(matches!(parse_port("80.80"), Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn parse_port_rejects_zero() {
        assert!(matches!(parse_port("0"), Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn parse_port_rejects_out_of_range() {
        assert!(matches!(parse_port("99999"), Err(ConfigError::InvalidPort(_))));
    }

    #[test]
    fn validate_host_rejects_blank_only() {
        assert_eq!(validate_host("   "), Err(ConfigError::BlankArgument));
        assert_eq!(validate_host("localhost"), Ok("localhost"));
        assert_eq!(validate_host("192.168.0.1"), Ok("192.168.0.1"));
    }
}
