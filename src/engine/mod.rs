//! Load decision engine.
//!
//! Validates deposit ("load") requests against per-customer daily/weekly
//! amount quotas and a daily count quota, producing one accept/reject
//! decision per request. Counters reset on calendar-day and Monday-aligned
//! week boundaries. Account state lives in an [`AccountRegistry`] owned by
//! the caller; the processor itself only carries configuration.

use tokio_stream::{Stream, StreamExt};
use tracing::{error, info};

use crate::QuotaConfig;
use crate::model::{Decision, LoadRequest};

mod account;
mod error;
mod sharded;
mod window;

pub use account::{Account, AccountRegistry};
pub use error::{InternalError, LoadError, QuotaError};
pub use sharded::ShardPool;
pub use window::Window;

/// The load decision processor: the sole entry point for requests.
#[derive(Debug, Clone, Default)]
pub struct Processor {
    config: QuotaConfig,
}

/// Public API
impl Processor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QuotaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QuotaConfig {
        &self.config
    }

    /// Run the processor over a request stream, sending one decision per
    /// request. Stops early if the decision receiver goes away; an
    /// internal inconsistency aborts the run.
    pub async fn run(
        &self,
        accounts: &mut AccountRegistry,
        mut stream: impl Stream<Item = LoadRequest> + Unpin,
        decisions: tokio::sync::mpsc::Sender<Decision>,
    ) -> Result<(), InternalError> {
        while let Some(req) = stream.next().await {
            let decision = self.process(accounts, req)?;
            if decisions.send(decision).await.is_err() {
                break;
            }
        }
        Ok(())
    }

    /// Decide a single load request, committing it if every check passes.
    ///
    /// Rejections collapse into `accepted = false`; only a commit-time
    /// guard failure surfaces as an error.
    pub fn process(
        &self,
        accounts: &mut AccountRegistry,
        req: LoadRequest,
    ) -> Result<Decision, InternalError> {
        let result = self.apply(accounts, &req);
        Self::log_decision(&req, &result);

        match result {
            Ok(()) => Ok(Decision {
                load: req.load,
                customer: req.customer,
                accepted: true,
            }),
            Err(LoadError::Internal(err)) => Err(err),
            Err(_) => Ok(Decision {
                load: req.load,
                customer: req.customer,
                accepted: false,
            }),
        }
    }
}

/// Private API
impl Processor {
    /// Small helper to log one decision with its internal reason.
    fn log_decision(req: &LoadRequest, result: &Result<(), LoadError>) {
        match result {
            Ok(()) => {
                info!(
                    customer = %req.customer,
                    load = %req.load,
                    amount = %req.amount,
                    "load accepted"
                );
            }
            Err(LoadError::Internal(err)) => {
                error!(
                    customer = %req.customer,
                    load = %req.load,
                    amount = %req.amount,
                    "{err}"
                );
            }
            Err(reason) => {
                info!(
                    customer = %req.customer,
                    load = %req.load,
                    amount = %req.amount,
                    reason = %reason,
                    "load rejected"
                );
            }
        }
    }

    fn apply(&self, accounts: &mut AccountRegistry, req: &LoadRequest) -> Result<(), LoadError> {
        // Identifier validity comes first: no account is ever created for
        // a malformed id.
        if !Self::is_numeric_id(&req.customer) {
            return Err(LoadError::InvalidCustomerId);
        }

        let account = accounts.get_or_create(&req.customer);

        let window = match account.last_load {
            Some(last) => Window::between(last, req.timestamp),
            None => {
                // First sight of this account: seed the reference
                // timestamp. Seeding never counts as non-chronological.
                account.last_load = Some(req.timestamp);
                Window::default()
            }
        };
        account.apply_resets(&window);

        self.check_quotas(account, req)?;
        self.commit(account, req)
    }

    /// Ordered quota chain over post-reset values; the first failing
    /// check rejects and the rest never run.
    fn check_quotas(&self, account: &Account, req: &LoadRequest) -> Result<(), QuotaError> {
        if req.amount > self.config.daily_limit - account.daily_used {
            return Err(QuotaError::DailyAmount);
        }
        if account.daily_count >= self.config.max_daily_loads {
            return Err(QuotaError::DailyCount);
        }
        if req.amount > self.config.weekly_limit - account.weekly_used {
            return Err(QuotaError::WeeklyAmount);
        }
        Ok(())
    }

    /// Record an accepted load: advance the timestamp, accumulate the
    /// amount into both windows, bump the count, append the audit trail.
    fn commit(&self, account: &mut Account, req: &LoadRequest) -> Result<(), LoadError> {
        match account.last_load {
            Some(last) if req.timestamp < last => {
                return Err(LoadError::NonChronologicalTimestamp);
            }
            _ => account.last_load = Some(req.timestamp),
        }

        // The quota chain already bounds everything below; a failing
        // guard means the chain itself is broken.
        if req.amount > self.config.weekly_limit {
            return Err(InternalError::WeeklyAmountGuard {
                customer: req.customer.clone(),
            }
            .into());
        }
        account.weekly_used += req.amount;

        if req.amount > self.config.daily_limit {
            return Err(InternalError::DailyAmountGuard {
                customer: req.customer.clone(),
            }
            .into());
        }
        account.daily_used += req.amount;

        if account.daily_count >= self.config.max_daily_loads {
            return Err(InternalError::DailyCountGuard {
                customer: req.customer.clone(),
            }
            .into());
        }
        account.daily_count += 1;
        account.processed_loads.push(req.load.clone());

        Ok(())
    }

    fn is_numeric_id(customer: &str) -> bool {
        !customer.is_empty() && customer.bytes().all(|b| b.is_ascii_digit())
    }
}
