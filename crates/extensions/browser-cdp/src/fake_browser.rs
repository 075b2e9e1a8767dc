//! Scripted DevTools endpoint for tests.
//!
//! Serves `/json/version` and `/json/list` through wiremock and answers
//! WebSocket commands with a caller-supplied handler.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub type Handler = Arc<dyn Fn(&str, &Value) -> Result<Value, (i64, String)> + Send + Sync>;

/// Command received by the fake: method, params, session id.
pub type Recorded = (String, Value, Option<String>);

pub struct FakeBrowser {
    pub http: MockServer,
    pub calls: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeBrowser {
    pub async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_url = format!(
            "ws://{}/devtools/browser/fake",
            listener.local_addr().unwrap()
        );
        let calls = Arc::new(Mutex::new(Vec::new()));

        let recorded = calls.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = handler.clone();
                let recorded = recorded.clone();
                tokio::spawn(async move {
                    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                        return;
                    };
                    while let Some(Ok(Message::Text(text))) = ws.next().await {
                        let request: Value = serde_json::from_str(&text).unwrap();
                        let method = request["method"].as_str().unwrap_or_default().to_string();
                        let params = request["params"].clone();
                        let session = request["sessionId"].as_str().map(str::to_string);
                        recorded.lock().push((method.clone(), params.clone(), session));

                        let reply = match handler(&method, &params) {
                            Ok(result) => json!({ "id": request["id"], "result": result }),
                            Err((code, message)) => json!({
                                "id": request["id"],
                                "error": { "code": code, "message": message }
                            }),
                        };
                        // An unrelated event first, as a real browser interleaves them.
                        let event = json!({ "method": "DOM.documentUpdated", "params": {} });
                        if ws.send(Message::Text(event.to_string().into())).await.is_err()
                            || ws.send(Message::Text(reply.to_string().into())).await.is_err()
                        {
                            return;
                        }
                    }
                });
            }
        });

        let http = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Browser": "FakeChrome/1.0",
                "Protocol-Version": "1.3",
                "webSocketDebuggerUrl": ws_url,
            })))
            .mount(&http)
            .await;
        Mock::given(method("GET"))
            .and(path("/json/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": "SW", "type": "service_worker", "title": "", "url": "chrome-extension://x/sw.js" },
                { "id": "T1", "type": "page", "title": "Example", "url": "https://example.com/" },
                { "id": "T2", "type": "page", "title": "Other", "url": "https://other.test/" }
            ])))
            .mount(&http)
            .await;

        Self { http, calls }
    }

    pub fn endpoint(&self) -> String {
        self.http.uri()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls.lock().iter().map(|(m, _, _)| m.clone()).collect()
    }

    pub fn params_of(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|(m, _, _)| m == method)
            .map(|(_, p, _)| p.clone())
            .collect()
    }
}

fn value(v: Value) -> Result<Value, (i64, String)> {
    Ok(json!({ "result": { "type": "object", "value": v } }))
}

fn missing_node() -> Result<Value, (i64, String)> {
    Err((-32000, "Could not find node with given id".to_string()))
}

/// Handler modelling a small page with one `<body>` node (id 5).
pub fn example_page() -> Handler {
    Arc::new(|method: &str, params: &Value| match method {
        "Target.attachToTarget" => Ok(json!({ "sessionId": "S1" })),
        m if m.ends_with(".enable") => Ok(json!({})),
        "Runtime.evaluate" => {
            let expr = params["expression"].as_str().unwrap_or_default();
            match expr {
                "location.href" => value(json!("https://example.com/")),
                "document.title" => value(json!("Example")),
                "document.documentElement.outerHTML" => value(json!(
                    "<html><head><meta name=\"description\" content=\"demo\"></head><body><a href=\"/a\">A</a></body></html>"
                )),
                "navigator.userAgent" => value(json!("FakeChrome/1.0")),
                e if e.contains("innerWidth") => value(json!({ "width": 800, "height": 600 })),
                e if e.contains("getSelection") => value(json!({
                    "text": "  chosen  ",
                    "element": {
                        "tagName": "P",
                        "className": "lead",
                        "id": "",
                        "textContent": "chosen",
                        "outerHTML": "<p class=\"lead\">chosen</p>"
                    }
                })),
                e if e.contains("localStorage") => value(json!({ "theme": "dark" })),
                e if e.contains("sessionStorage") => Ok(json!({
                    "result": { "type": "object" },
                    "exceptionDetails": {
                        "text": "Uncaught",
                        "exception": { "description": "SecurityError: storage disabled" }
                    }
                })),
                e if e.contains("performance") => {
                    value(json!({ "loadTime": 12.5, "domContentLoaded": 3.0, "firstPaint": 1.0 }))
                }
                _ => Ok(json!({ "result": { "type": "undefined" } })),
            }
        }
        "Network.getCookies" => Ok(json!({ "cookies": [{
            "name": "sid", "value": "1", "domain": "example.com", "path": "/",
            "expires": -1, "size": 4, "httpOnly": true, "secure": false,
            "session": true, "sameSite": "Lax"
        }] })),
        "DOM.getDocument" => Ok(json!({ "root": { "nodeId": 1, "nodeName": "#document" } })),
        "DOM.querySelectorAll" => match params["selector"].as_str().unwrap_or_default() {
            "body" => Ok(json!({ "nodeIds": [5] })),
            "!!bad" => Err((-32000, "DOM Error while querying".to_string())),
            _ => Ok(json!({ "nodeIds": [] })),
        },
        "DOM.resolveNode" if params["nodeId"] == 5 => Ok(json!({
            "object": { "type": "object", "subtype": "node", "className": "HTMLBodyElement", "objectId": "obj-5" }
        })),
        "DOM.resolveNode" => missing_node(),
        "Runtime.callFunctionOn" => {
            let function = params["functionDeclaration"].as_str().unwrap_or_default();
            if function.contains("return this.innerHTML") {
                value(json!("Hello"))
            } else {
                Ok(json!({ "result": { "type": "undefined" } }))
            }
        }
        "DOM.removeNode" | "DOM.setAttributeValue" if params["nodeId"] == 5 => Ok(json!({})),
        "DOM.removeNode" | "DOM.setAttributeValue" => missing_node(),
        other => Err((-32601, format!("'{}' wasn't found", other))),
    })
}
