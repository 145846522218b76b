//! Streaming search for the zip local file header signature.
//!
//! Input arrives in windows of arbitrary size. The matcher keeps the last
//! `SIGNATURE.len() - 1` bytes of everything it has seen so a signature split
//! across two windows is still found.

/// Zip local file header signature (`PK\x03\x04`)
pub const LOCAL_HEADER_SIGNATURE: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

const CARRY: usize = LOCAL_HEADER_SIGNATURE.len() - 1;

/// Incremental matcher fed one window at a time
#[derive(Debug, Clone, Default)]
pub struct SignatureMatcher {
    /// Tail of the previous windows, oldest byte first
    carry: [u8; CARRY],
    /// Number of valid bytes in `carry`
    carried: usize,
    /// Total bytes consumed before the current window
    consumed: u64,
}

impl SignatureMatcher {
    /// Creates a matcher positioned at offset zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of bytes fed so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Feeds the next window.
    ///
    /// Returns the absolute offset of the first signature that ends inside
    /// this window, counting from the first byte ever fed.
    pub fn feed(&mut self, window: &[u8]) -> Option<u64> {
        // Candidates straddling the boundary start inside the carry
        for start in 0..self.carried {
            let from_carry = self.carried - start;
            let needed = LOCAL_HEADER_SIGNATURE.len() - from_carry;
            if window.len() < needed {
                continue;
            }
            if self.carry[start..self.carried] == LOCAL_HEADER_SIGNATURE[..from_carry]
                && window[..needed] == LOCAL_HEADER_SIGNATURE[from_carry..]
            {
                return Some(self.consumed - from_carry as u64);
            }
        }

        if let Some(position) = window
            .windows(LOCAL_HEADER_SIGNATURE.len())
            .position(|candidate| candidate == LOCAL_HEADER_SIGNATURE)
        {
            return Some(self.consumed + position as u64);
        }

        self.remember(window);
        self.consumed += window.len() as u64;
        None
    }

    fn remember(&mut self, window: &[u8]) {
        if window.len() >= CARRY {
            self.carry.copy_from_slice(&window[window.len() - CARRY..]);
            self.carried = CARRY;
            return;
        }

        let keep = (CARRY - window.len()).min(self.carried);
        self.carry.copy_within(self.carried - keep..self.carried, 0);
        self.carry[keep..keep + window.len()].copy_from_slice(window);
        self.carried = keep + window.len();
    }
}
