//! Address-token resolution for FETCH/STORE sequence arguments
//!
//! A client addresses messages with `1:*` (the whole folder), `A:B` (an
//! inclusive range), or a single number. Depending on the command the numbers
//! are read as 1-based sequence positions or as repository UIDs; this module
//! only classifies the token, the repository query interprets it.

use crate::error::{Error, Result};

/// A parsed message address token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSet {
    /// `1:*` - every message in the folder.
    All,
    /// `A:B` with A <= B, both inclusive.
    Range(u32, u32),
    /// A single positive number.
    Single(u32),
}

impl MessageSet {
    /// Parse an address token. Malformed tokens (non-numeric, reversed
    /// ranges, zero, open ranges other than `1:*`) are rejected before any
    /// repository access happens.
    pub fn parse(token: &str) -> Result<Self> {
        if token == "1:*" {
            return Ok(MessageSet::All);
        }

        if let Some((lo, hi)) = token.split_once(':') {
            let lo: u32 = lo
                .parse()
                .map_err(|_| Error::ProtocolError(format!("Invalid range: {}", token)))?;
            let hi: u32 = hi
                .parse()
                .map_err(|_| Error::ProtocolError(format!("Invalid range: {}", token)))?;
            if lo == 0 || lo > hi {
                return Err(Error::ProtocolError(format!("Invalid range: {}", token)));
            }
            return Ok(MessageSet::Range(lo, hi));
        }

        let n: u32 = token
            .parse()
            .map_err(|_| Error::ProtocolError(format!("Invalid sequence number: {}", token)))?;
        if n == 0 {
            return Err(Error::ProtocolError(format!(
                "Invalid sequence number: {}",
                token
            )));
        }
        Ok(MessageSet::Single(n))
    }
}
