use rask_log_client::sender::HttpTransport;
use rask_log_client::{
    CapturedError, ErrorInterceptor, EventData, Fields, HttpTransportConfig, InterceptorChain,
    Logger, LoggerOptions, Transport, TransportError,
};
use serde_json::{Value, json};
use std::io::Read;
use std::time::Duration;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, header_exists, method, path},
};

fn config_for(server: &MockServer) -> HttpTransportConfig {
    HttpTransportConfig {
        endpoint: format!("{}/v1/events", server.uri()),
        timeout: Duration::from_secs(5),
        connection_timeout: Duration::from_secs(2),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_logger_posts_json_batch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .and(header("content-type", "application/json"))
        .and(header_exists("x-batch-id"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (transport, sender) = HttpTransport::spawn(config_for(&mock_server)).unwrap();
    let logger = Logger::new(
        "web",
        LoggerOptions::default()
            .with_interceptors(InterceptorChain::new().with(ErrorInterceptor::default()))
            .with_transport(transport),
    );

    logger.info("page view", Fields::new().with("path", "/cart"));
    logger.error(
        "User experienced a crash",
        EventData::error(CapturedError::new("Error", "boom").with_stack("Error: boom")),
    );

    // Dropping the logger drops the last handle, which lets the sender drain and stop
    drop(logger);
    tokio::time::timeout(Duration::from_secs(5), sender)
        .await
        .expect("sender should stop once handles are dropped")
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        body,
        json!([
            {
                "level": "info",
                "event": "page view",
                "service": "web",
                "data": { "path": "/cart" },
            },
            {
                "level": "error",
                "event": "User experienced a crash",
                "service": "web",
                "data": { "name": "Error", "message": "boom", "stack": "Error: boom" },
            },
        ])
    );
}

#[tokio::test]
async fn test_gzip_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .and(header("content-encoding", "gzip"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let config = HttpTransportConfig {
        compression: true,
        ..config_for(&mock_server)
    };
    let (transport, sender) = HttpTransport::new(config).unwrap();

    let logger = Logger::new("svc", LoggerOptions::default().with_transport(transport));
    logger.error("compressed", EventData::Empty);
    drop(logger);
    sender.run().await;

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);

    let mut decoded = String::new();
    flate2::read::GzDecoder::new(requests[0].body.as_slice())
        .read_to_string(&mut decoded)
        .unwrap();
    let body: Value = serde_json::from_str(&decoded).unwrap();
    assert_eq!(body[0]["event"], json!("compressed"));
}

#[tokio::test]
async fn test_server_error_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/events"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(2)
        .mount(&mock_server)
        .await;

    let (transport, sender) = HttpTransport::new(config_for(&mock_server)).unwrap();
    let batch = rask_log_client::Batch::new(vec![rask_log_client::Event::new(
        rask_log_client::Level::Error,
        "boom",
        EventData::Empty,
    )]);

    match sender.send(&batch).await {
        Err(TransportError::HttpError { status }) => assert_eq!(status, 500),
        other => panic!("Expected HttpError, got: {other:?}"),
    }

    // The queued path only logs the failure
    transport.deliver(batch).unwrap();
    drop(transport);
    sender.run().await;
}
