//! Bounded storage primitives: every register and counter in the machine is
//! clamped to a fixed bit width, and overflow is silent modular wraparound
//! rather than an error.

/// Fixed bit widths available to registers and counters.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BitWidth {
    Two = 2,
    Four = 4,
    Eight = 8,
    Sixteen = 16,
    ThirtyTwo = 32,
    SixtyFour = 64,
}

impl BitWidth {
    /// Largest unsigned value representable at this width.
    pub fn max_value(self) -> u64 {
        // Shift instead of `2.pow(bits) - 1` so the 64-bit case is exact.
        u64::MAX >> (64 - self as u32)
    }
}

/// Mutable storage cell bounded to a bit width. Writes wrap modulo the
/// width's value range.
#[derive(Clone, Copy, Debug)]
pub struct Register {
    max: u64,
    value: u64,
}

impl Register {
    pub fn new(width: BitWidth) -> Self {
        Register {
            max: width.max_value(),
            value: 0,
        }
    }

    /// Write a raw (possibly out-of-range, possibly negative) value, wrapped
    /// into range. Subtraction results below zero wrap from the top, so
    /// `-1` in an 8-bit register reads back as `0xFF`.
    pub fn set(&mut self, value: i64) {
        // 128-bit so the 64-bit width's modulus of 2^64 stays representable.
        let modulus = self.max as i128 + 1;
        self.value = (value as i128).rem_euclid(modulus) as u64;
    }

    pub fn get(&self) -> u64 {
        self.value
    }
}

/// Bounded counter with explicit set and wrap-on-increment, used as the
/// program counter.
#[derive(Clone, Copy, Debug)]
pub struct Counter {
    max: u64,
    value: u64,
}

impl Counter {
    pub fn new(width: BitWidth) -> Self {
        Counter {
            max: width.max_value(),
            value: 0,
        }
    }

    /// Every caller derives addresses from values already bounded to the
    /// counter's width, so this can never be handed an out-of-range address.
    pub fn set(&mut self, address: u64) {
        debug_assert!(address <= self.max);
        self.value = address;
    }

    pub fn get(&self) -> u64 {
        self.value
    }

    /// Advance by one, wrapping to 0 past the maximum.
    pub fn increment(&mut self) {
        self.value = if self.value >= self.max {
            0
        } else {
            self.value + 1
        };
    }
}
