//! DevTools WebSocket client.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, trace, warn};

use crate::error::CdpError;
use crate::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo};
use crate::session::PageSession;

/// Default remote debugging endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9222";

const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;
type Pending = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;

/// Command channel shared by the client and every attached session.
///
/// The receive task is aborted once the last holder drops.
pub(crate) struct Transport {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: Pending,
    recv_task: JoinHandle<()>,
}

impl Transport {
    /// Send one command and wait for its result.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let json = serde_json::to_string(&CdpRequest {
            id,
            method,
            params,
            session_id,
        })?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);

        let sent = {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await
        };
        if let Err(e) = sent {
            self.pending.lock().remove(&id);
            return Err(e.into());
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("{} timed out", method)))
            }
        }
    }

    async fn receive_loop(mut ws_source: WsSource, pending: Pending) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => Self::route(resp, &pending),
                        Err(e) => warn!("Failed to parse CDP message: {}", e),
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("DevTools socket closed");
                    break;
                }
                Err(e) => {
                    error!("DevTools socket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
        // Dropping the senders fails every waiter with SessionClosed.
        pending.lock().clear();
    }

    fn route(resp: CdpResponse, pending: &Pending) {
        let Some(id) = resp.id else {
            if let Some(method) = resp.method {
                trace!("Ignoring CDP event {}", method);
            }
            return;
        };
        let Some(tx) = pending.lock().remove(&id) else {
            return;
        };
        let result = match resp.error {
            Some(error) => Err(CdpError::Protocol {
                code: error.code,
                message: error.message,
            }),
            None => Ok(resp.result.unwrap_or(Value::Null)),
        };
        let _ = tx.send(result);
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}

/// Connection to a browser's remote debugging endpoint.
pub struct CdpClient {
    http_endpoint: String,
    transport: Arc<Transport>,
}

impl CdpClient {
    /// Connect to the browser at `endpoint` (e.g. `http://127.0.0.1:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        url::Url::parse(&http_endpoint)?;

        let version = Self::browser_version(&http_endpoint).await?;
        debug!("Found browser {}", version.browser);

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::WebSocket(format!("{}: {}", version.web_socket_debugger_url, e)))?;
        let (ws_sink, ws_source) = ws_stream.split();

        let pending: Pending = Arc::new(Mutex::new(HashMap::new()));
        let recv_task = tokio::spawn(Transport::receive_loop(ws_source, pending.clone()));

        debug!("CDP client connected to {}", version.web_socket_debugger_url);
        Ok(Self {
            http_endpoint,
            transport: Arc::new(Transport {
                ws_tx: tokio::sync::Mutex::new(ws_sink),
                request_id: AtomicU64::new(1),
                pending,
                recv_task,
            }),
        })
    }

    async fn browser_version(http_endpoint: &str) -> Result<BrowserVersion, CdpError> {
        let url = format!("{}/json/version", http_endpoint);
        let unavailable = |e: reqwest::Error| CdpError::BrowserUnavailable(format!("{}: {}", http_endpoint, e));
        reqwest::get(&url)
            .await
            .map_err(unavailable)?
            .json()
            .await
            .map_err(unavailable)
    }

    pub fn endpoint(&self) -> &str {
        &self.http_endpoint
    }

    /// Open page tabs, most recently focused first.
    pub async fn list_pages(&self) -> Result<Vec<PageInfo>, CdpError> {
        let url = format!("{}/json/list", self.http_endpoint);
        let targets: Vec<PageInfo> = reqwest::get(&url).await?.json().await?;
        Ok(targets.into_iter().filter(PageInfo::is_page).collect())
    }

    /// Attach a flattened session to `target_id`.
    pub async fn attach_page(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .transport
            .call(
                "Target.attachToTarget",
                Some(json!({ "targetId": target_id, "flatten": true })),
                None,
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("missing sessionId".to_string()))?
            .to_string();

        debug!("Attached to target {} (session {})", target_id, session_id);
        let session = PageSession::new(session_id, self.transport.clone());
        session.enable_domains().await?;
        Ok(session)
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
