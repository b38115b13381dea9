//! Epoch ranges, checkpoints and cancellation.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use adapot_types::{AdaPots, Epoch, EpochResult};
use serde::{Deserialize, Serialize};

use crate::{EpochError, Result};

/// Inclusive range of epochs to settle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochRange {
    start: Epoch,
    end: Epoch,
}

impl EpochRange {
    /// # Errors
    ///
    /// - [`EpochError::InvalidRange`] if `end < start`
    pub fn new(start: Epoch, end: Epoch) -> Result<Self> {
        if end < start {
            return Err(EpochError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> Epoch {
        self.start
    }

    pub fn end(&self) -> Epoch {
        self.end
    }

    pub fn epochs(&self) -> RangeInclusive<Epoch> {
        self.start..=self.end
    }

    /// What is left of the range after `checkpoint`, if anything.
    pub fn after(&self, checkpoint: &Checkpoint) -> Option<Self> {
        let start = checkpoint.last_settled_epoch.checked_add(1)?.max(self.start);
        Self::new(start, self.end).ok()
    }
}

/// The last settled epoch and its pots.
///
/// A range calculation can resume from a checkpoint instead of fetching
/// the recorded pots of the epoch before the range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Last epoch whose boundary was settled.
    pub last_settled_epoch: Epoch,
    /// Pots after that boundary.
    pub pots: AdaPots,
}

impl Checkpoint {
    pub fn new(pots: AdaPots) -> Self {
        Self {
            last_settled_epoch: pots.epoch,
            pots,
        }
    }
}

/// Cooperative cancellation flag, checked between epochs.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running calculation to stop after the current epoch.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a range calculation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeOutcome {
    /// Settled epochs, in order.
    pub results: Vec<EpochResult>,
    /// Where a later run can resume.
    pub checkpoint: Checkpoint,
    /// Whether the range stopped early on cancellation.
    pub cancelled: bool,
}
