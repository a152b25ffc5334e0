// monitoring/publisher.rs
//
// Ships run output to a RabbitMQ queue, one JSON message per record.

use crate::error::{Error, Result};

use amiquip::{Connection, Exchange, Publish, QueueDeclareOptions};
use log::info;
use serde::Serialize;

/// Serializes each item to JSON, skipping none.
pub fn encode_payloads<T: Serialize>(items: &[T]) -> Result<Vec<Vec<u8>>> {
    items
        .iter()
        .map(|item| serde_json::to_vec(item).map_err(Error::from))
        .collect()
}

/// Publishes every item to `queue` on the direct exchange. Returns how many were sent.
pub fn publish_records<T: Serialize>(amqp_url: &str, queue: &str, items: &[T]) -> Result<usize> {
    let payloads = encode_payloads(items)?;
    let mut connection = Connection::insecure_open(amqp_url)?;
    let channel = connection.open_channel(None)?;
    let exchange = Exchange::direct(&channel);
    channel.queue_declare(queue, QueueDeclareOptions::default())?;
    for payload in &payloads {
        exchange.publish(Publish::new(payload, queue))?;
    }
    connection.close()?;
    info!("Published {} messages to queue {}", payloads.len(), queue);
    Ok(payloads.len())
}

/// Runs [`publish_records`] off the async runtime, since amiquip blocks.
pub async fn publish_records_async<T>(amqp_url: String, queue: String, items: Vec<T>) -> Result<usize>
where
    T: Serialize + Send + 'static,
{
    tokio::task::spawn_blocking(move || publish_records(&amqp_url, &queue, &items))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
}
