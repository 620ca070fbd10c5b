use crate::error::{FrameError, Result};

/// Result of trying to take one frame off the front of a buffer.
#[derive(Debug)]
#[must_use]
pub enum ParseOutcome {
    /// Not enough bytes yet. Nothing was consumed or modified.
    Incomplete,
    /// A whole frame is present and occupies this many leading bytes.
    Complete(usize),
    /// The buffer can not be interpreted; the stream must be dropped.
    Error(FrameError),
}

impl ParseOutcome {
    /// `0` for incomplete, the used length when complete, a negative error
    /// code otherwise.
    pub fn code(&self) -> i64 {
        match self {
            ParseOutcome::Incomplete => 0,
            ParseOutcome::Complete(used) => i64::try_from(*used).unwrap_or(i64::MAX),
            ParseOutcome::Error(err) => err.code(),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ParseOutcome::Complete(_))
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseOutcome::Incomplete)
    }

    /// Bytes to drop from the front of the buffer, if complete.
    pub fn used(&self) -> Option<usize> {
        match self {
            ParseOutcome::Complete(used) => Some(*used),
            _ => None,
        }
    }

    /// `Ok(Some(used))`, `Ok(None)` for incomplete, or the error.
    pub fn into_result(self) -> Result<Option<usize>> {
        match self {
            ParseOutcome::Incomplete => Ok(None),
            ParseOutcome::Complete(used) => Ok(Some(used)),
            ParseOutcome::Error(err) => Err(err),
        }
    }
}

impl From<Result<Option<usize>>> for ParseOutcome {
    fn from(result: Result<Option<usize>>) -> Self {
        match result {
            Ok(Some(used)) => ParseOutcome::Complete(used),
            Ok(None) => ParseOutcome::Incomplete,
            Err(err) => ParseOutcome::Error(err),
        }
    }
}
