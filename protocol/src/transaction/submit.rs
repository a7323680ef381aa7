//! Handing signed transactions to the network.
//!
//! The pipeline only sees the [`Submitter`] trait. [`WebSocketSubmitter`]
//! is the production implementation: one connection, one `submit` request,
//! one reply or a timeout. There are no retries.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::config::SigningConfig;
use crate::error::TxError;

/// The network's provisional verdict on a submitted transaction.
///
/// Failure codes (`tec...`, `tef...`, ...) are results, not errors: they
/// are reported exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineResult {
    pub code: String,
    pub message: String,
}

impl EngineResult {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// `true` only for `tesSUCCESS`.
    pub fn is_success(&self) -> bool {
        self.code == "tesSUCCESS"
    }
}

impl std::fmt::Display for EngineResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Delivers encoded transactions to the network.
#[async_trait]
pub trait Submitter: Send + Sync {
    /// Submits one signed transaction blob and waits for the verdict.
    ///
    /// Fails with [`TxError::Transport`] if no verdict could be obtained.
    async fn submit(&self, tx_blob: &[u8]) -> Result<EngineResult, TxError>;
}

/// Submits over a websocket connection to a ledger server.
#[derive(Debug, Clone)]
pub struct WebSocketSubmitter {
    endpoint: String,
    timeout: Duration,
}

impl WebSocketSubmitter {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout,
        }
    }

    pub fn from_config(config: &SigningConfig) -> Self {
        Self::new(config.endpoint.clone(), config.submit_timeout)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn exchange(&self, request: String) -> Result<EngineResult, TxError> {
        let (mut ws, _) = connect_async(self.endpoint.as_str())
            .await
            .map_err(|e| TxError::Transport(format!("connect to {}: {}", self.endpoint, e)))?;
        debug!(endpoint = %self.endpoint, "connected");

        ws.send(Message::text(request))
            .await
            .map_err(|e| TxError::Transport(format!("send: {}", e)))?;

        while let Some(frame) = ws.next().await {
            let frame = frame.map_err(|e| TxError::Transport(format!("receive: {}", e)))?;
            match frame {
                Message::Text(text) => {
                    let result = parse_response(text.as_str());
                    if let Err(e) = ws.close(None).await {
                        debug!(error = %e, "close after reply failed");
                    }
                    return result;
                }
                Message::Close(_) => break,
                _ => continue,
            }
        }
        Err(TxError::Transport(
            "connection closed before a reply arrived".to_string(),
        ))
    }
}

#[async_trait]
impl Submitter for WebSocketSubmitter {
    async fn submit(&self, tx_blob: &[u8]) -> Result<EngineResult, TxError> {
        let request = submit_request(tx_blob);
        info!(endpoint = %self.endpoint, bytes = tx_blob.len(), "submitting transaction");

        let result = match timeout(self.timeout, self.exchange(request)).await {
            Ok(result) => result,
            Err(_) => Err(TxError::Transport(format!(
                "no reply from {} within {:?}",
                self.endpoint, self.timeout
            ))),
        };
        match &result {
            Ok(verdict) => info!(code = %verdict.code, "submission answered"),
            Err(e) => warn!(error = %e, "submission failed"),
        }
        result
    }
}

/// The `submit` command for a signed blob.
pub fn submit_request(tx_blob: &[u8]) -> String {
    json!({
        "id": 1,
        "command": "submit",
        "tx_blob": hex::encode_upper(tx_blob),
    })
    .to_string()
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    status: Option<String>,
    result: Option<SubmitResult>,
    error: Option<String>,
    error_message: Option<String>,
    error_exception: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResult {
    engine_result: Option<String>,
    engine_result_message: Option<String>,
}

/// Extracts the verdict from a server reply.
///
/// A reply carrying `engine_result` is a verdict whatever it says; a
/// request-level error (bad blob, server overloaded) is a failed submission.
pub fn parse_response(text: &str) -> Result<EngineResult, TxError> {
    let response: SubmitResponse = serde_json::from_str(text)
        .map_err(|e| TxError::Transport(format!("unreadable reply: {}", e)))?;

    if let Some(SubmitResult {
        engine_result: Some(code),
        engine_result_message,
    }) = response.result
    {
        return Ok(EngineResult::new(code, engine_result_message.unwrap_or_default()));
    }

    let error = response
        .error
        .or(response.status)
        .unwrap_or_else(|| "unknown".to_string());
    let detail = response
        .error_message
        .or(response.error_exception)
        .unwrap_or_default();
    Err(TxError::Transport(if detail.is_empty() {
        format!("server rejected the request: {}", error)
    } else {
        format!("server rejected the request: {}: {}", error, detail)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_shape() {
        let request: serde_json::Value =
            serde_json::from_str(&submit_request(&[0x12, 0x00, 0xAB])).unwrap();
        assert_eq!(request["command"], "submit");
        assert_eq!(request["tx_blob"], "1200AB");
    }

    #[test]
    fn success_reply() {
        let reply = r#"{"id":1,"status":"success","type":"response","result":{
            "engine_result":"tesSUCCESS","engine_result_code":0,
            "engine_result_message":"The transaction was applied.","tx_blob":"12"}}"#;
        let verdict = parse_response(reply).unwrap();
        assert_eq!(verdict, EngineResult::new("tesSUCCESS", "The transaction was applied."));
        assert!(verdict.is_success());
        assert_eq!(verdict.to_string(), "tesSUCCESS: The transaction was applied.");
    }

    #[test]
    fn provisional_failure_is_still_a_verdict() {
        let reply = r#"{"status":"success","result":{
            "engine_result":"tefPAST_SEQ",
            "engine_result_message":"This sequence number has already passed."}}"#;
        let verdict = parse_response(reply).unwrap();
        assert_eq!(verdict.code, "tefPAST_SEQ");
        assert!(!verdict.is_success());
    }

    #[test]
    fn request_error_is_a_transport_failure() {
        let reply = r#"{"status":"error","error":"invalidTransaction",
            "error_exception":"fails local checks"}"#;
        let err = parse_response(reply).unwrap_err();
        assert!(matches!(err, TxError::Transport(ref m) if m.contains("invalidTransaction")));
    }

    #[test]
    fn garbage_reply() {
        assert!(matches!(parse_response("not json"), Err(TxError::Transport(_))));
    }

    #[tokio::test]
    async fn refused_connection_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let submitter =
            WebSocketSubmitter::new(format!("ws://127.0.0.1:{port}"), Duration::from_secs(5));
        let err = submitter.submit(&[0x12]).await.unwrap_err();
        assert!(matches!(err, TxError::Transport(_)));
    }

    #[tokio::test]
    async fn silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            // Accept and hold the socket without ever answering the handshake.
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
            drop(socket);
        });

        let submitter =
            WebSocketSubmitter::new(format!("ws://127.0.0.1:{port}"), Duration::from_millis(200));
        let err = submitter.submit(&[0x12]).await.unwrap_err();
        assert!(err.to_string().contains("no reply"));
        server.abort();
    }
}
