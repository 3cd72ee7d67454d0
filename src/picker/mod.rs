//! Timestamp-driven draw
//!
//! The draw is `now_ms % pool.len()`. It is predictable and slightly biased,
//! and the disclaimer shown to users says exactly that.

pub mod clock;

use thiserror::Error;

pub use clock::{Clock, SystemClock};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PickError {
    #[error("the name pool is empty")]
    EmptyPool,
}

/// Names split out of the pool field, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamePool {
    names: Vec<String>,
}

/// Outcome of one draw
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    pub name: String,
    pub index: usize,
    pub timestamp: u64,
    pub pool_size: usize,
}

impl NamePool {
    pub fn parse(raw: &str) -> Self {
        Self {
            names: raw.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Index for a timestamp, always `< len()`
    pub fn index_at(&self, timestamp: u64) -> Result<usize, PickError> {
        if self.is_empty() {
            return Err(PickError::EmptyPool);
        }
        Ok((timestamp % self.len() as u64) as usize)
    }

    pub fn pick_at(&self, timestamp: u64) -> Result<Pick, PickError> {
        let index = self.index_at(timestamp)?;
        Ok(Pick {
            name: self.names[index].clone(),
            index,
            timestamp,
            pool_size: self.names.len(),
        })
    }

    pub fn pick(&self, clock: &dyn Clock) -> Result<Pick, PickError> {
        self.pick_at(clock.current_time_ms())
    }
}

/// Which of the two clips plays for a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipSlot {
    Even,
    Odd,
}

impl ClipSlot {
    pub fn for_timestamp(timestamp: u64) -> Self {
        if timestamp % 2 == 0 {
            ClipSlot::Even
        } else {
            ClipSlot::Odd
        }
    }
}
