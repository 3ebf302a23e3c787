//! Lock-free level registers
//!
//! Written by the audio thread after every decoded filter block, read from
//! any thread.

use portable_atomic::{AtomicF32, Ordering};

/// Index into the six level registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelIndex {
    Red0 = 0,
    Green0 = 1,
    Blue0 = 2,
    Red1 = 3,
    Green1 = 4,
    Blue1 = 5,
}

/// Latest decoded `r0, g0, b0, r1, g1, b1`
#[derive(Debug)]
pub struct LevelRegisters {
    levels: [AtomicF32; 6],
}

impl Default for LevelRegisters {
    fn default() -> Self {
        Self {
            levels: std::array::from_fn(|_| AtomicF32::new(0.0)),
        }
    }
}

impl LevelRegisters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store all six levels (audio thread)
    #[inline]
    pub fn store(&self, levels: [f32; 6]) {
        for (register, value) in self.levels.iter().zip(levels) {
            register.store(value, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn get(&self, index: LevelIndex) -> f32 {
        self.levels[index as usize].load(Ordering::Relaxed)
    }

    /// All six levels. Each register is read independently, so a concurrent
    /// store may produce a mix of two frames.
    pub fn snapshot(&self) -> [f32; 6] {
        std::array::from_fn(|i| self.levels[i].load(Ordering::Relaxed))
    }

    pub fn clear(&self) {
        self.store([0.0; 6]);
    }
}
