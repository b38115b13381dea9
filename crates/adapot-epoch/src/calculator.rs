//! Epoch and range calculation over a data provider.

use adapot_provider::DataProvider;
use adapot_types::{AdaPots, Epoch, EpochResult, NetworkConfig, TreasuryTransition};
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::inputs::{EpochInputs, FetchScope};
use crate::range::{CancelToken, Checkpoint, EpochRange, RangeOutcome};
use crate::stages::{unrewarded, PendingEpoch};
use crate::{EpochError, Result};

/// Settles epoch boundaries for one network.
pub struct EpochCalculator<P> {
    network: NetworkConfig,
    provider: P,
    workers: ThreadPool,
}

impl<P: DataProvider> EpochCalculator<P> {
    /// Create a calculator with `worker_threads` pool workers; 0 picks one
    /// per CPU.
    ///
    /// # Errors
    ///
    /// - [`EpochError::WorkerPool`] if the threads cannot be spawned
    pub fn new(network: NetworkConfig, provider: P, worker_threads: usize) -> Result<Self> {
        let workers = ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|index| format!("adapot-worker-{index}"))
            .build()
            .map_err(|err| EpochError::WorkerPool(err.to_string()))?;
        Ok(Self {
            network,
            provider,
            workers,
        })
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Settle the boundary at the start of `epoch`, given the pots of the
    /// boundary before it.
    ///
    /// Epochs before the Shelley start have all-zero pots; the Shelley start
    /// itself has the genesis pots and pays nothing.
    ///
    /// # Errors
    ///
    /// Any [`EpochError`]; the epoch has no partial result.
    pub fn calculate_epoch(&self, epoch: Epoch, previous: &AdaPots) -> Result<EpochResult> {
        let start = self.network.shelley_start_epoch;
        if epoch < start {
            return Ok(unrewarded(AdaPots::zero(epoch)));
        }
        if epoch == start {
            return Ok(unrewarded(AdaPots::genesis(&self.network)));
        }

        let inputs = EpochInputs::fetch(&self.provider, &self.network, epoch, FetchScope::Full)?;
        PendingEpoch::new(&self.network, inputs, previous)
            .compute_pot()?
            .compute_pools(&self.workers)?
            .settle()
    }

    /// Treasury transition of `epoch` without computing any pool.
    ///
    /// Unspendable rewards need the pool calculation, so they are taken as
    /// zero here.
    ///
    /// # Errors
    ///
    /// Any [`EpochError`].
    pub fn calculate_treasury_only(
        &self,
        epoch: Epoch,
        previous: &AdaPots,
    ) -> Result<TreasuryTransition> {
        if epoch <= self.network.shelley_start_epoch {
            return Ok(self.calculate_epoch(epoch, previous)?.treasury);
        }
        let inputs =
            EpochInputs::fetch(&self.provider, &self.network, epoch, FetchScope::TreasuryOnly)?;
        Ok(PendingEpoch::new(&self.network, inputs, previous)
            .compute_pot()?
            .skip_pools()
            .settle()?
            .treasury)
    }

    /// Settle every epoch of `range` in order.
    ///
    /// The pots before the range come from `checkpoint` when given, which
    /// must end right before the range. Otherwise they are the recorded pots
    /// of the epoch before the range, or the genesis pots when the range
    /// starts at or before the Shelley start. `cancel` is checked before
    /// each epoch.
    ///
    /// # Errors
    ///
    /// - [`EpochError::CheckpointMismatch`] for a checkpoint that does not
    ///   line up with the range
    /// - [`EpochError::MissingUpstreamData`] if the pots before the range
    ///   are unknown
    /// - [`EpochError::ConservationViolated`] if the pots before the range
    ///   do not add up to the total supply
    /// - any error of [`calculate_epoch`](Self::calculate_epoch); earlier
    ///   epochs of the range are discarded with it
    pub fn calculate_range(
        &self,
        range: EpochRange,
        checkpoint: Option<Checkpoint>,
        cancel: &CancelToken,
    ) -> Result<RangeOutcome> {
        let mut last = match checkpoint {
            Some(checkpoint) => {
                if checkpoint.last_settled_epoch.checked_add(1) != Some(range.start()) {
                    return Err(EpochError::CheckpointMismatch {
                        checkpoint: checkpoint.last_settled_epoch,
                        start: range.start(),
                    });
                }
                checkpoint
            }
            None => Checkpoint::new(self.pots_before(range.start())?),
        };
        self.ensure_conserved(&last.pots)?;

        tracing::info!(
            start = range.start(),
            end = range.end(),
            network_magic = self.network.network_magic,
            "calculating epoch range"
        );

        let mut results = Vec::with_capacity(range.epochs().count());
        let mut cancelled = false;
        for epoch in range.epochs() {
            if cancel.is_cancelled() {
                tracing::warn!(epoch, "range cancelled before epoch");
                cancelled = true;
                break;
            }
            let result = self.calculate_epoch(epoch, &last.pots)?;
            last = Checkpoint::new(result.pots.clone());
            results.push(result);
        }

        Ok(RangeOutcome {
            results,
            checkpoint: last,
            cancelled,
        })
    }

    /// Pots from the Shelley start on must add up to the total supply;
    /// earlier ones are all zero.
    fn ensure_conserved(&self, pots: &AdaPots) -> Result<()> {
        if pots.epoch < self.network.shelley_start_epoch
            || pots.is_conserved(&self.network.total_supply)
        {
            return Ok(());
        }
        tracing::error!(
            epoch = pots.epoch,
            total = %pots.conserved_total(),
            "pots before range are not conserved"
        );
        Err(EpochError::ConservationViolated {
            epoch: pots.epoch,
            total: pots.conserved_total().to_string(),
            expected: self.network.total_supply.to_string(),
        })
    }

    fn pots_before(&self, start: Epoch) -> Result<AdaPots> {
        let previous = start.saturating_sub(1);
        if start <= self.network.shelley_start_epoch {
            return Ok(AdaPots::zero(previous));
        }
        if previous == self.network.shelley_start_epoch {
            return Ok(AdaPots::genesis(&self.network));
        }
        self.provider
            .ada_pots(previous)?
            .ok_or(EpochError::MissingUpstreamData {
                what: "ada pots",
                epoch: previous,
            })
    }
}
