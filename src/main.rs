use std::env;
use std::io::Write;

use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

use loads_eng::dedup::DuplicateFilter;
use loads_eng::engine::ShardPool;
use loads_eng::json::{read_loads, write_decision, write_decisions};
use loads_eng::{AccountRegistry, Processor, QuotaConfig};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let path = env::args().nth(1).expect("usage: loads-eng <loads.jsonl>");

    if !(path.ends_with(".jsonl") || path.ends_with(".txt")) {
        warn!(path, "input file seems to not be a json-lines file");
    }

    // LOADS_SHARDS=<n> (n >= 2) routes processing through the sharded
    // front-end; output is identical to the single-threaded path.
    let shards: Option<usize> = env::var("LOADS_SHARDS")
        .ok()
        .and_then(|value| value.parse().ok())
        .filter(|&count| count >= 2);

    let (req_tx, req_rx) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        let mut seen = DuplicateFilter::new();
        for result in read_loads(&path) {
            match result {
                Ok(req) => {
                    // Resubmitted ids never reach the engine.
                    if !seen.first_sight(&req.customer, &req.load) {
                        continue;
                    }
                    req_tx.send(req).await.unwrap();
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    match shards {
        Some(count) => {
            let mut pool = ShardPool::new(QuotaConfig::default(), count);
            let mut requests = req_rx;
            while let Some(req) = requests.recv().await {
                pool.submit(req).await;
            }
            match pool.finish().await {
                Ok(decisions) => write_decisions(decisions),
                Err(e) => {
                    error!("{e}");
                    std::process::exit(1);
                }
            }
        }
        None => {
            let processor = Processor::new();
            let mut accounts = AccountRegistry::new();
            let (decision_tx, mut decision_rx) = tokio::sync::mpsc::channel(16);

            let writer = tokio::spawn(async move {
                let stdout = std::io::stdout();
                while let Some(decision) = decision_rx.recv().await {
                    let mut out = stdout.lock();
                    write_decision(&mut out, &decision).expect("failed to write decision");
                }
                let mut out = stdout.lock();
                out.flush().expect("failed to flush decisions");
            });

            if let Err(e) = processor
                .run(&mut accounts, ReceiverStream::new(req_rx), decision_tx)
                .await
            {
                error!("{e}");
                std::process::exit(1);
            }
            writer.await.expect("writer task failed");
        }
    }
}
