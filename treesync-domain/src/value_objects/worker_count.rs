// /////////////////////////////////////////////////////////////////////////////
// treesync
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

use std::fmt;

/// A validated count of reader or writer threads.
///
/// Unlike a raw `usize`, `WorkerCount` can't silently be zero: the CLI
/// contract requires `READERS`/`WRITERS` to be positive integers, and a
/// pool of zero threads would mean a queue nobody ever drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerCount {
    count: usize,
}

impl WorkerCount {
    pub const DEFAULT_READERS: WorkerCount = WorkerCount { count: 1 };
    pub const DEFAULT_WRITERS: WorkerCount = WorkerCount { count: 8 };

    pub fn new(count: usize) -> Result<Self, String> {
        if count == 0 {
            return Err("worker count must be a positive integer".to_string());
        }
        Ok(Self { count })
    }

    pub fn get(self) -> usize {
        self.count
    }
}

impl fmt::Display for WorkerCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero() {
        assert!(WorkerCount::new(0).is_err());
    }

    #[test]
    fn accepts_positive() {
        assert_eq!(WorkerCount::new(4).unwrap().get(), 4);
    }

    #[test]
    fn defaults_match_spec() {
        assert_eq!(WorkerCount::DEFAULT_READERS.get(), 1);
        assert_eq!(WorkerCount::DEFAULT_WRITERS.get(), 8);
    }
}
