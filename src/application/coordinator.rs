use crate::config::SimulationConfig;
use crate::domain::account::{Account, AccountSnapshot};
use crate::domain::ports::SharedTransferService;
use crate::domain::signal::Signal;
use crate::error::{Result, SimulationError, TransferError};
use crate::infrastructure::in_memory::AccountRegistry;
use futures::FutureExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// How the worker pool ended once the target was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ShutdownOutcome {
    /// Every worker exited within the grace period.
    Graceful,
    /// Workers still running after the grace period were aborted.
    Forced { stragglers: usize },
}

/// Final state of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub accounts: Vec<AccountSnapshot>,
    pub successful_transfers: usize,
    pub attempted_transfers: usize,
    pub shutdown: ShutdownOutcome,
}

impl RunReport {
    pub fn total_balance(&self) -> i64 {
        self.accounts.iter().map(|account| account.balance).sum()
    }
}

/// State shared by every worker of one run.
struct Shared {
    registry: Arc<AccountRegistry>,
    service: SharedTransferService,
    config: SimulationConfig,
    /// Slots claimed by workers, bounded by the target through CAS.
    reserved: AtomicUsize,
    /// Transfers that actually committed.
    succeeded: AtomicUsize,
    attempted: AtomicUsize,
    completion: Signal,
    stop: Signal,
}

impl Shared {
    /// Claims one transfer slot, or `None` once all slots are taken.
    fn reserve_slot(&self) -> Option<usize> {
        let target = self.config.target_transfers;
        loop {
            if self.stop.is_fired() {
                return None;
            }
            let current = self.reserved.load(Ordering::Acquire);
            if current >= target {
                return None;
            }
            if self
                .reserved
                .compare_exchange_weak(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                return Some(current + 1);
            }
        }
    }

    fn release_slot(&self) {
        self.reserved.fetch_sub(1, Ordering::AcqRel);
    }

    fn record_success(&self) {
        let done = self.succeeded.fetch_add(1, Ordering::AcqRel) + 1;
        debug!("Successful transfer #{done}");
        // `succeeded` never passes `reserved`, so reaching the target here means
        // every reserved slot has committed.
        if done == self.config.target_transfers && self.completion.fire() {
            info!(
                target = self.config.target_transfers,
                "Target of transfers reached"
            );
        }
    }
}

struct Worker {
    index: usize,
    shared: Arc<Shared>,
    rng: StdRng,
}

impl Worker {
    async fn run(mut self) {
        debug!(worker = self.index, "Worker started");
        while let Some(slot) = self.shared.reserve_slot() {
            self.shared.attempted.fetch_add(1, Ordering::Relaxed);
            match self.attempt().await {
                Ok(()) => self.shared.record_success(),
                Err(TransferError::Cancelled) if self.shared.stop.is_fired() => {
                    self.shared.release_slot();
                    debug!(worker = self.index, slot, "Attempt cancelled, slot released");
                    break;
                }
                Err(err) => {
                    self.shared.release_slot();
                    debug!(worker = self.index, slot, %err, "Attempt failed, slot released");
                }
            }
        }
        debug!(worker = self.index, "Worker exiting");
    }

    /// Runs one paced attempt, turning a panic into a `Fault`.
    async fn attempt(&mut self) -> std::result::Result<(), TransferError> {
        let shared = Arc::clone(&self.shared);
        let outcome = AssertUnwindSafe(Self::paced_transfer(&shared, &mut self.rng))
            .catch_unwind()
            .await;
        outcome.unwrap_or_else(|panic| {
            let reason = panic_message(panic.as_ref());
            error!(worker = self.index, "Unexpected error in worker: {reason}");
            Err(TransferError::Fault(reason))
        })
    }

    async fn paced_transfer(
        shared: &Shared,
        rng: &mut StdRng,
    ) -> std::result::Result<(), TransferError> {
        let delay = Duration::from_millis(rng.gen_range(shared.config.delay_range_ms()));
        tokio::select! {
            biased;
            _ = shared.stop.fired() => return Err(TransferError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }

        let registry = &shared.registry;
        let from: &Account = registry.pick_random(rng);
        let to = registry
            .pick_random_excluding(rng, from)
            .map_err(|err| TransferError::InvalidArgument(err.to_string()))?;
        let amount = rng.gen_range(1..shared.config.max_amount);

        shared
            .service
            .try_transfer(from, to, amount, &shared.stop)
            .await
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker attempt panicked".to_string()
    }
}

/// Drives a pool of workers until exactly `target_transfers` transfers commit.
///
/// Each worker reserves a slot on a shared counter with compare-and-swap,
/// attempts one random transfer, and hands the slot back if the transfer
/// fails. The worker that commits the last slot fires the completion signal;
/// the driver then stops the pool and waits up to the grace period before
/// aborting stragglers.
pub struct TransferCoordinator {
    shared: Arc<Shared>,
}

impl TransferCoordinator {
    /// Validates `config` and creates a fresh registry from it.
    pub fn new(config: SimulationConfig, service: SharedTransferService) -> Result<Self> {
        config.validate()?;
        let registry = AccountRegistry::create(config.accounts_count, config.initial_balance)?;
        Self::with_registry(config, Arc::new(registry), service)
    }

    /// Runs against an existing registry. `accounts_count` and
    /// `initial_balance` in `config` are ignored.
    pub fn with_registry(
        config: SimulationConfig,
        registry: Arc<AccountRegistry>,
        service: SharedTransferService,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            shared: Arc::new(Shared {
                registry,
                service,
                config,
                reserved: AtomicUsize::new(0),
                succeeded: AtomicUsize::new(0),
                attempted: AtomicUsize::new(0),
                completion: Signal::new(),
                stop: Signal::new(),
            }),
        })
    }

    pub fn accounts(&self) -> &Arc<AccountRegistry> {
        &self.shared.registry
    }

    pub fn successful_transfers(&self) -> usize {
        self.shared.succeeded.load(Ordering::Acquire)
    }

    /// Attempts made so far, including failed ones.
    pub fn attempted_transfers(&self) -> usize {
        self.shared.attempted.load(Ordering::Relaxed)
    }

    /// A handle on the completion signal, for observers other than `run`.
    pub fn completion(&self) -> Signal {
        self.shared.completion.clone()
    }

    /// Spawns the workers, waits for the target, and shuts the pool down.
    pub async fn run(self) -> Result<RunReport> {
        let config = &self.shared.config;
        info!(
            accounts = self.shared.registry.len(),
            target = config.target_transfers,
            workers = config.worker_count,
            "Starting transfer simulation"
        );

        let mut workers = JoinSet::new();
        for index in 0..config.worker_count {
            let rng = match config.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
                None => StdRng::from_entropy(),
            };
            let worker = Worker {
                index,
                shared: Arc::clone(&self.shared),
                rng,
            };
            workers.spawn(worker.run());
        }

        if !wait_for_completion(&self.shared.completion, &mut workers).await {
            let succeeded = self.successful_transfers();
            error!(
                succeeded,
                target = config.target_transfers,
                "All workers exited before the target was reached"
            );
            return Err(SimulationError::PoolExhausted {
                succeeded,
                target: config.target_transfers,
            });
        }
        info!("Shutting down workers");
        self.shared.stop.fire();
        let shutdown = shutdown_workers(workers, config.grace_period).await;
        match shutdown {
            ShutdownOutcome::Graceful => info!("Application finished successfully"),
            ShutdownOutcome::Forced { stragglers } => {
                warn!(stragglers, "Workers didn't terminate gracefully, forced shutdown")
            }
        }

        Ok(RunReport {
            accounts: self.shared.registry.snapshot().await,
            successful_transfers: self.successful_transfers(),
            attempted_transfers: self.attempted_transfers(),
            shutdown,
        })
    }
}

/// Waits for the completion signal. Returns `false` if every worker exited
/// without it firing.
async fn wait_for_completion(completion: &Signal, workers: &mut JoinSet<()>) -> bool {
    tokio::select! {
        _ = completion.fired() => true,
        _ = drain(workers) => completion.is_fired(),
    }
}

/// Waits up to `grace` for every task to finish, then aborts the rest.
async fn shutdown_workers(mut workers: JoinSet<()>, grace: Duration) -> ShutdownOutcome {
    if tokio::time::timeout(grace, drain(&mut workers)).await.is_ok() {
        return ShutdownOutcome::Graceful;
    }
    let stragglers = workers.len();
    workers.abort_all();
    drain(&mut workers).await;
    ShutdownOutcome::Forced { stragglers }
}

async fn drain(workers: &mut JoinSet<()>) {
    while let Some(joined) = workers.join_next().await {
        if let Err(err) = joined
            && err.is_panic()
        {
            error!("Worker task panicked: {err}");
        }
    }
}
