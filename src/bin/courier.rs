//! courier: run one bridge plugin against Redis
//!
//! ## Usage
//! ```text
//! courier <plugin> [config.yaml]
//! ```
//!
//! - `redis-listen`: logs every record received on `listener.channel_in`
//! - `redis-call`: reads stdin lines, sends each to `call.channel_out` and
//!   prints the reply (or the passed-through line)
//! - `redis-broadcast`: publishes stdin lines as JSON on `broadcast.channel_out`
//!
//! ## Configuration
//! - COURIER_CONFIG: path to a YAML config file (optional)
//! - COURIER__*: overrides, e.g. COURIER__BROKER__HOST
//! - COURIER_LOG: log filter (default: info)

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info};

use courier::bus::{BrokerPort, RedisBroker};
use courier::config::Config;
use courier::pipeline::{Broadcaster, CallFilter, Listener};
use courier::processors::{JsonEncoder, SequenceNamer, TextAnnotator};
use courier::record::Record;
use courier::registry::{self, REDIS_BROADCAST, REDIS_CALL, REDIS_LISTEN};
use courier::utils::bootstrap::{connect_with_retry, init_tracing};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn usage() -> String {
    let mut text = String::from("usage: courier <plugin> [config.yaml]\n\nplugins:\n");
    for (role, names) in registry::by_role() {
        for name in names {
            if let Some(plugin) = registry::lookup(name) {
                text.push_str(&format!("  {:<16} ({}) {}\n", name, role, plugin.description));
            }
        }
    }
    text
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    init_tracing();

    let mut args = std::env::args().skip(1);
    let Some(plugin) = args.next().and_then(|name| registry::lookup(&name)) else {
        eprint!("{}", usage());
        std::process::exit(2);
    };
    let config = Config::load(args.next().as_deref())?;

    let url = config.broker.url();
    let broker: Arc<dyn BrokerPort> = Arc::new(
        connect_with_retry(&url, || RedisBroker::connect(&config.broker)).await?,
    );

    info!(plugin = plugin.name, role = %plugin.role, "courier started");

    let result = match plugin.name {
        REDIS_LISTEN => run_listen(broker, &config).await,
        REDIS_CALL => run_call(broker, &config).await,
        REDIS_BROADCAST => run_broadcast(broker, &config).await,
        other => Err(format!("plugin '{}' has no runner", other).into()),
    };

    if let Err(e) = &result {
        error!(plugin = plugin.name, error = %e, "courier failed");
    }
    result
}

async fn run_listen(broker: Arc<dyn BrokerPort>, config: &Config) -> Result<(), BoxError> {
    let namer = SequenceNamer::from_config(&config.listener);
    let listener = Listener::from_config(broker, &config.listener, namer)?;

    let records = listener.into_stream();
    tokio::pin!(records);
    while let Some(record) = records.next().await {
        let record = record?;
        info!(name = %record.name, bytes = record.data.len(), "Received record");
    }
    Ok(())
}

async fn run_call(broker: Arc<dyn BrokerPort>, config: &Config) -> Result<(), BoxError> {
    let mut filter = CallFilter::from_config(broker, &config.call, TextAnnotator)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut counter = 0u64;
    while let Some(line) = lines.next_line().await? {
        counter += 1;
        let item = Record::new(counter.to_string(), Bytes::from(line.clone()));
        for record in filter.process(item).await? {
            match record.annotation {
                Some(annotation) => println!("{}", annotation),
                None => println!("{}", line),
            }
        }
    }
    Ok(())
}

async fn run_broadcast(broker: Arc<dyn BrokerPort>, config: &Config) -> Result<(), BoxError> {
    let writer = Broadcaster::from_config(
        broker,
        &config.broadcast,
        JsonEncoder::from_config(&config.broadcast),
    )?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut counter = 0u64;
    while let Some(line) = lines.next_line().await? {
        counter += 1;
        let record = Record::new(counter.to_string(), Bytes::new()).with_annotation(line);
        writer.write(&[record]).await?;
    }
    Ok(())
}
