use parking_lot::Mutex;
use rask_log_client::{
    Batch, CapturedError, ErrorInterceptor, EventData, Fields, InterceptorChain, Level, Logger,
    LoggerConfig, LoggerOptions, TransportError,
};
use serde_json::{Value, json};
use std::sync::Arc;

/// Collects delivered batches as wire JSON.
fn recording_transport() -> (
    Arc<Mutex<Vec<Value>>>,
    impl Fn(Batch) -> Result<(), TransportError> + Send + Sync + 'static,
) {
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = delivered.clone();
    let transport = move |batch: Batch| -> Result<(), TransportError> {
        let body = serde_json::to_value(batch.events()).expect("events serialize");
        sink.lock().push(body);
        Ok(())
    };
    (delivered, transport)
}

#[test]
fn test_error_level_flushes_immediately() {
    let (delivered, transport) = recording_transport();
    let logger = Logger::new("checkout", LoggerOptions::default().with_transport(transport));

    logger.info("viewed cart", Fields::new().with("items", 2));
    logger.warn("slow response", EventData::Empty);
    assert_eq!(logger.pending(), 2);
    assert!(delivered.lock().is_empty());

    logger.error("payment failed", Fields::new().with("orderId", "o-17"));

    assert_eq!(logger.pending(), 0);
    let batches = delivered.lock();
    assert_eq!(batches.len(), 1);
    let events = batches[0].as_array().unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0]["event"], json!("viewed cart"));
    assert_eq!(events[1]["data"], json!({}));
    assert_eq!(events[2]["level"], json!("error"));
    assert_eq!(events[2]["service"], json!("checkout"));
}

#[test]
fn test_manual_flush_sends_one_batch() {
    let (delivered, transport) = recording_transport();
    let logger = Logger::new(
        "svc",
        LoggerOptions::default()
            .with_transport(transport)
            .with_auto_flush_levels([]),
    );

    logger.error("not flushed yet", EventData::Empty);
    logger.debug("still queued", EventData::Empty);
    assert_eq!(logger.pending(), 2);

    assert_eq!(logger.flush().unwrap(), 2);
    assert_eq!(logger.flush().unwrap(), 0);
    assert_eq!(delivered.lock().len(), 1);
}

#[test]
fn test_errors_are_exposed_before_delivery() {
    let (delivered, transport) = recording_transport();
    let logger = Logger::new(
        "web",
        LoggerOptions::default()
            .with_client_id("k3j9x0a1b")
            .with_interceptors(InterceptorChain::new().with(ErrorInterceptor::default()))
            .with_transport(transport),
    );

    let error = CapturedError::new("TypeError", "undefined is not a function")
        .with_stack("TypeError: undefined is not a function\n    at render")
        .with_property("component", "Cart");
    logger.error(
        "User experienced a crash",
        Fields::new().with_error("error", error).with("userId", 1),
    );

    let batches = delivered.lock();
    let event = &batches[0][0];
    assert_eq!(event["clientId"], json!("k3j9x0a1b"));
    assert_eq!(
        event["data"],
        json!({
            "error": {
                "name": "TypeError",
                "message": "undefined is not a function",
                "stack": "TypeError: undefined is not a function\n    at render",
                "component": "Cart",
            },
            "userId": 1,
        })
    );
}

#[test]
fn test_unexposed_errors_lose_hidden_properties() {
    let (delivered, transport) = recording_transport();
    let logger = Logger::new("web", LoggerOptions::default().with_transport(transport));

    // No error interceptor: standard serialization keeps enumerable data only.
    logger.error(
        "crash",
        EventData::error(CapturedError::new("Error", "boom").with_property("code", json!(7))),
    );

    assert_eq!(delivered.lock()[0][0]["data"], json!({ "code": 7 }));
}

#[test]
fn test_transport_failure_does_not_panic() {
    let logger = Logger::new(
        "svc",
        LoggerOptions::default().with_transport(
            |_batch: Batch| -> Result<(), TransportError> { Err(TransportError::Closed) },
        ),
    );

    // Auto-flush failure is logged and the buffer is still cleared
    logger.error("lost", EventData::Empty);
    assert_eq!(logger.pending(), 0);

    logger.info("queued", EventData::Empty);
    assert!(matches!(logger.flush(), Err(TransportError::Closed)));
}

#[test]
fn test_from_config_wires_error_interceptor() {
    let (delivered, transport) = recording_transport();
    let mut config = LoggerConfig::default();
    config.service = "api".to_string();
    config.client_id = Some("client-9".to_string());
    config.errors.whitelist = vec!["name".to_string()];
    config.errors.expose_own_properties = false;

    let logger = Logger::from_config(&config, transport);
    assert_eq!(logger.name(), "api");
    assert_eq!(logger.options().interceptors.names(), vec!["error"]);

    logger.log(
        Level::Error,
        "crash",
        EventData::error(CapturedError::new("RangeError", "too big")),
    );

    let batches = delivered.lock();
    assert_eq!(batches[0][0]["data"], json!({ "name": "RangeError" }));
    assert_eq!(batches[0][0]["clientId"], json!("client-9"));
}
