//! Concurrent front-end over the processor.
//!
//! Requests shard by customer id across single-writer worker tasks: all
//! requests for one customer serialize on one worker in arrival order,
//! different customers run in parallel, and no lock is shared between
//! them. Each submission carries a sequence number so [`ShardPool::finish`]
//! can hand decisions back in submission order.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::QuotaConfig;
use crate::model::{Decision, LoadRequest};

use super::{AccountRegistry, InternalError, Processor};

pub struct ShardPool {
    shards: Vec<mpsc::Sender<(u64, LoadRequest)>>,
    workers: Vec<JoinHandle<Result<(), InternalError>>>,
    decisions: mpsc::UnboundedReceiver<(u64, Decision)>,
    next_seq: u64,
}

impl ShardPool {
    /// Spawn `shards` worker tasks (at least one), each owning its own
    /// registry for its slice of the customer space.
    pub fn new(config: QuotaConfig, shards: usize) -> Self {
        let shards = shards.max(1);
        let (decision_tx, decision_rx) = mpsc::unbounded_channel();

        let mut senders = Vec::with_capacity(shards);
        let mut workers = Vec::with_capacity(shards);
        for _ in 0..shards {
            let (tx, rx) = mpsc::channel(16);
            senders.push(tx);
            workers.push(tokio::spawn(shard_worker(
                Processor::with_config(config),
                rx,
                decision_tx.clone(),
            )));
        }

        Self {
            shards: senders,
            workers,
            decisions: decision_rx,
            next_seq: 0,
        }
    }

    /// Route one request to its customer's worker. Requests for the same
    /// customer always land on the same shard.
    pub async fn submit(&mut self, req: LoadRequest) {
        let shard = shard_index(&req.customer, self.shards.len());
        let seq = self.next_seq;
        self.next_seq += 1;
        // A closed shard means its worker bailed out; finish() reports it.
        let _ = self.shards[shard].send((seq, req)).await;
    }

    /// Close the pool and return every decision in submission order, or
    /// the first internal inconsistency any worker hit.
    pub async fn finish(mut self) -> Result<Vec<Decision>, InternalError> {
        // Dropping the request senders lets the workers drain and exit.
        self.shards.clear();

        let mut tagged = Vec::new();
        while let Some(entry) = self.decisions.recv().await {
            tagged.push(entry);
        }
        for worker in self.workers {
            worker.await.expect("shard worker panicked")?;
        }

        tagged.sort_unstable_by_key(|(seq, _)| *seq);
        Ok(tagged.into_iter().map(|(_, decision)| decision).collect())
    }
}

async fn shard_worker(
    processor: Processor,
    mut requests: mpsc::Receiver<(u64, LoadRequest)>,
    decisions: mpsc::UnboundedSender<(u64, Decision)>,
) -> Result<(), InternalError> {
    let mut accounts = AccountRegistry::new();
    while let Some((seq, req)) = requests.recv().await {
        let decision = processor.process(&mut accounts, req)?;
        if decisions.send((seq, decision)).is_err() {
            break;
        }
    }
    Ok(())
}

fn shard_index(customer: &str, shards: usize) -> usize {
    let mut hasher = DefaultHasher::new();
    customer.hash(&mut hasher);
    (hasher.finish() % shards as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Amount;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ").unwrap()
    }

    fn load(customer: &str, load: &str, units: i64, time: &str) -> LoadRequest {
        LoadRequest {
            customer: customer.to_string(),
            load: load.to_string(),
            amount: Amount::from_units(units),
            timestamp: ts(time),
        }
    }

    #[tokio::test]
    async fn single_customer_serializes_on_one_worker() {
        let mut pool = ShardPool::new(QuotaConfig::default(), 4);

        pool.submit(load("1", "1", 3_000, "2000-01-03T08:00:00Z")).await;
        pool.submit(load("1", "2", 2_500, "2000-01-03T12:00:00Z")).await;
        pool.submit(load("1", "3", 2_500, "2000-01-04T00:01:00Z")).await;

        let decisions = pool.finish().await.unwrap();
        let flags: Vec<_> = decisions.iter().map(|d| d.accepted).collect();
        assert_eq!(flags, vec![true, false, true]);
    }

    #[tokio::test]
    async fn decisions_come_back_in_submission_order() {
        let mut pool = ShardPool::new(QuotaConfig::default(), 4);

        for i in 0..100u32 {
            let customer = (i % 10).to_string();
            pool.submit(load(&customer, &i.to_string(), 10, "2000-01-03T08:00:00Z"))
                .await;
        }

        let decisions = pool.finish().await.unwrap();
        let ids: Vec<_> = decisions.iter().map(|d| d.load.as_str()).collect();
        let expected: Vec<String> = (0..100u32).map(|i| i.to_string()).collect();
        assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn matches_the_single_threaded_processor() {
        let requests: Vec<LoadRequest> = (0..60u32)
            .map(|i| {
                let customer = (i % 7).to_string();
                let day = 3 + (i % 5); // spread across the week
                load(
                    &customer,
                    &i.to_string(),
                    2_000,
                    &format!("2000-01-{day:02}T1{}:00:00Z", i % 10),
                )
            })
            .collect();

        let processor = Processor::new();
        let mut accounts = AccountRegistry::new();
        let sequential: Vec<bool> = requests
            .iter()
            .map(|req| {
                processor
                    .process(&mut accounts, req.clone())
                    .unwrap()
                    .accepted
            })
            .collect();

        let mut pool = ShardPool::new(QuotaConfig::default(), 3);
        for req in requests {
            pool.submit(req).await;
        }
        let sharded: Vec<bool> = pool
            .finish()
            .await
            .unwrap()
            .iter()
            .map(|d| d.accepted)
            .collect();

        assert_eq!(sequential, sharded);
    }

    #[tokio::test]
    async fn zero_shards_is_clamped_to_one() {
        let mut pool = ShardPool::new(QuotaConfig::default(), 0);
        pool.submit(load("1", "1", 100, "2000-01-03T08:00:00Z")).await;
        let decisions = pool.finish().await.unwrap();
        assert_eq!(decisions.len(), 1);
        assert!(decisions[0].accepted);
    }
}
