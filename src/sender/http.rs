use super::serialization::BatchSerializer;
use super::{Batch, Transport, TransportError};
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, ClientBuilder};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

const BATCH_ID_HEADER: &str = "x-batch-id";

#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
    pub endpoint: String,
    pub timeout: Duration,
    pub connection_timeout: Duration,
    pub user_agent: String,
    pub compression: bool,
    /// Batches waiting for the sender task. Deliveries beyond this are dropped.
    pub channel_capacity: usize,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:9600/v1/events".to_string(),
            timeout: Duration::from_secs(10),
            connection_timeout: Duration::from_secs(5),
            user_agent: format!("rask-log-client/{}", env!("CARGO_PKG_VERSION")),
            compression: false,
            channel_capacity: 64,
        }
    }
}

/// Non-blocking handle that queues batches for the HTTP sender task.
///
/// Cheap to clone. The sender task stops once every handle is dropped and
/// the queue has drained.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    tx: mpsc::Sender<Batch>,
}

impl HttpTransport {
    /// Create the handle and the sender it feeds. The sender must be driven
    /// with `HttpSender::run`.
    pub fn new(config: HttpTransportConfig) -> Result<(Self, HttpSender), TransportError> {
        if config.channel_capacity == 0 {
            return Err(TransportError::InvalidConfig(
                "Channel capacity must be greater than 0".to_string(),
            ));
        }

        let (tx, rx) = mpsc::channel(config.channel_capacity);
        let sender = HttpSender::new(&config, rx)?;

        Ok((Self { tx }, sender))
    }

    /// Create the handle and spawn its sender on the current tokio runtime.
    pub fn spawn(config: HttpTransportConfig) -> Result<(Self, JoinHandle<()>), TransportError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            TransportError::InvalidConfig(format!("HTTP transport needs a tokio runtime: {e}"))
        })?;

        let (transport, sender) = Self::new(config)?;
        let handle = runtime.spawn(sender.run());
        Ok((transport, handle))
    }
}

impl Transport for HttpTransport {
    fn deliver(&self, batch: Batch) -> Result<(), TransportError> {
        self.tx.try_send(batch).map_err(|e| match e {
            mpsc::error::TrySendError::Full(batch) => {
                TransportError::QueueFull(batch.id().to_string())
            }
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

/// Background half of `HttpTransport`: posts each queued batch once.
pub struct HttpSender {
    client: Client,
    endpoint: Url,
    serializer: BatchSerializer,
    rx: mpsc::Receiver<Batch>,
}

impl HttpSender {
    fn new(config: &HttpTransportConfig, rx: mpsc::Receiver<Batch>) -> Result<Self, TransportError> {
        let endpoint: Url = config.endpoint.parse().map_err(|e| {
            TransportError::InvalidConfig(format!("Invalid endpoint URL '{}': {e}", config.endpoint))
        })?;

        let client = ClientBuilder::new()
            .timeout(config.timeout)
            .connect_timeout(config.connection_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                TransportError::InvalidConfig(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint,
            serializer: BatchSerializer::new(config.compression),
            rx,
        })
    }

    pub async fn run(mut self) {
        debug!(endpoint = %self.endpoint, "HTTP sender started");

        while let Some(batch) = self.rx.recv().await {
            let batch_id = batch.id().to_string();
            let size = batch.size();
            let start = Instant::now();

            match self.send(&batch).await {
                Ok(status) => debug!(
                    batch_id = %batch_id,
                    events = size,
                    status,
                    latency_ms = start.elapsed().as_millis() as u64,
                    "Batch delivered"
                ),
                Err(e) => warn!(
                    batch_id = %batch_id,
                    events = size,
                    error = %e,
                    "Batch delivery failed, dropping"
                ),
            }
        }

        debug!("HTTP sender stopped");
    }

    /// Post one batch. Returns the response status on success.
    pub async fn send(&self, batch: &Batch) -> Result<u16, TransportError> {
        let body = self.serializer.serialize(batch)?;

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(BATCH_ID_HEADER, batch.id());

        if self.serializer.is_compressed() {
            request = request.header(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        }

        let response = request.body(body).send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(status.as_u16())
        } else {
            Err(TransportError::HttpError {
                status: status.as_u16(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Event, EventData, Level};

    #[test]
    fn test_invalid_endpoint_rejected() {
        let config = HttpTransportConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            HttpTransport::new(config),
            Err(TransportError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_spawn_outside_runtime_fails() {
        let result = HttpTransport::spawn(HttpTransportConfig::default());
        assert!(matches!(result, Err(TransportError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_deliver_never_blocks_when_full() {
        let config = HttpTransportConfig {
            channel_capacity: 1,
            ..Default::default()
        };
        // Sender intentionally not running
        let (transport, _sender) = HttpTransport::new(config).unwrap();
        let batch = Batch::new(vec![Event::new(Level::Info, "e", EventData::Empty)]);

        assert!(transport.deliver(batch.clone()).is_ok());
        assert!(matches!(
            transport.deliver(batch),
            Err(TransportError::QueueFull(_))
        ));
    }

    #[tokio::test]
    async fn test_deliver_after_sender_dropped() {
        let (transport, sender) = HttpTransport::new(HttpTransportConfig::default()).unwrap();
        drop(sender);

        let batch = Batch::new(vec![Event::new(Level::Info, "e", EventData::Empty)]);
        assert!(matches!(transport.deliver(batch), Err(TransportError::Closed)));
    }
}
