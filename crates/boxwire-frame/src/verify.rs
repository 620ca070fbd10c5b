//! Header verification.
//!
//! A verifier runs on every decoded header before the frame length is
//! trusted. Rejection means the stream is desynchronized.

use crate::field::MAGIC;
use crate::header::Header;

/// Predicate over decoded header values.
pub trait HeaderVerifier: Send + Sync {
    /// Returns `Err(reason)` if the header must be rejected.
    fn verify(&self, header: &Header<'_>) -> std::result::Result<(), String>;
}

/// Accepts every header.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl HeaderVerifier for AcceptAll {
    fn verify(&self, _header: &Header<'_>) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// Checks the `magic` field against a fixed constant.
///
/// Headers without a `magic` field pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagicVerifier {
    expected: i64,
}

impl MagicVerifier {
    pub fn new(expected: i64) -> Self {
        Self { expected }
    }

    pub fn expected(&self) -> i64 {
        self.expected
    }
}

impl HeaderVerifier for MagicVerifier {
    fn verify(&self, header: &Header<'_>) -> std::result::Result<(), String> {
        match header.get(MAGIC) {
            Some(found) if found != self.expected => Err(format!(
                "magic mismatch (expected {:#x}, found {:#x})",
                self.expected, found
            )),
            _ => Ok(()),
        }
    }
}

impl<F> HeaderVerifier for F
where
    F: Fn(&Header<'_>) -> bool + Send + Sync,
{
    fn verify(&self, header: &Header<'_>) -> std::result::Result<(), String> {
        if self(header) {
            Ok(())
        } else {
            Err("header rejected by custom verifier".to_string())
        }
    }
}
