//! Implementation of a Fibonacci Linear Feedback Shift Register (LFSR).
//!
//! An n-bit LFSR generates a bitstream from an n-bit state. For each cycle, the bits at certain
//! positions of the current state are XOR'ed and the result is fed back into the register. The
//! rightmost bit of the state that is "pushed out" of the register is the output bit.
//!
//! # Description
//!
//! *Note: Let a = n. We use a instead of n here because there is no subscript n in Unicode).*
//!
//! An LFSR can be described by the register's bit length (a) and the bit positions that influence
//! the next feedback bit. These bit positions are called "taps" and can be written as vector p =
//! (pₐ₋₁, ..., p₃, p₂, p₁, p₀) where each element can either be 0 or 1 (mathematically speaking: ∀
//! x ∈ ℕ: pₓ ∈ {0, 1}).
//!
//! ```text
//!      MSB                                    LSB
//!     ┌─────┐           ┌───┐  ┌───┐  ┌───┐  ┌───┐
//! ┌──▶│ sₐ₋₁├┬──▶ ... ─▶│ s₃├┬▶│ s₂├┬▶│ s₁├┬▶│ s₀├┬───▶ output bit
//! │   └─────┘│          └───┘│ └───┘│ └───┘│ └───┘│
//! │          ▼               ▼      ▼      ▼      ▼
//! │sₐ        ⊗ ◀─pₐ₋₁        ⊗ ◀─p₃ ⊗ ◀─p₂ ⊗ ◀─p₁ ⊗ ◀─p₀
//! │          │               │      │      │      │
//! │          ▼               ▼      ▼      ▼      │
//! └─────────╴⊕ ◀─ ... ◀──────⊕ ◀────⊕ ◀────⊕ ◀────┘
//! ```
//!
//! The timecode decoder needs to run this LFSR in both directions: forwards to predict the next
//! bit while the record plays normally, and backwards (the exact inverse transform) while it plays
//! in reverse, or to verify that a variant's seed is reachable from itself.

use crate::bits;

/// Advance a `bits`-wide LFSR state by one step (new bit enters at the MSB).
///
/// The feedback bit is the parity of `state` masked by `taps | 1`; forcing bit 0 of the tap mask
/// on guarantees every state transition actually depends on the full register.
pub const fn fwd(bits: usize, state: u32, taps: u32) -> u32 {
    let feedback = self::bits::parity(state, taps | 1);
    self::bits::insert_msb(bits, state, feedback)
}

/// Revert a `bits`-wide LFSR state by one step (new bit enters at the LSB).
///
/// This is the exact inverse of [`fwd`]: `rev(bits, fwd(bits, state, taps), taps) == state` for
/// every reachable `state`.
pub const fn rev(bits: usize, state: u32, taps: u32) -> u32 {
    let rtaps = (taps >> 1) | (1 << (bits - 1));
    let feedback = self::bits::parity(state, rtaps);
    self::bits::insert_lsb(bits, state, feedback)
}

/// Fibonacci Linear Feedback Shift Register (LFSR).
///
/// A thin, stateful wrapper around [`fwd`] and [`rev`] for callers that want to keep clocking the
/// same register (the lookup builder and the test-fixture generator both do).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FibonacciLfsr {
    pub bits: usize,
    pub state: u32,
    pub taps: u32,
}

impl FibonacciLfsr {
    /// Return the next LFSR state (without making any changes).
    pub const fn next_state(&self) -> u32 {
        fwd(self.bits, self.state, self.taps)
    }

    /// Return the previous LFSR state (without making any changes).
    pub const fn previous_state(&self) -> u32 {
        rev(self.bits, self.state, self.taps)
    }

    /// Advance the LFSR state and return it.
    pub fn advance(&mut self) -> u32 {
        self.state = self.next_state();
        self.state
    }

    /// Revert the LFSR state and return it.
    pub fn revert(&mut self) -> u32 {
        self.state = self.previous_state();
        self.state
    }
}
