//! Mock Services
//!
//! WordPress / WordPress.com / テキスト生成APIを模したローカルHTTPサーバー

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;

/// 記録されたリクエスト
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// ルーティングキー（`/wp-json/...` または `?rest_route=/...`）
    pub route: String,
    /// パスとクエリ文字列
    pub uri: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body is JSON")
    }
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status_code: u16,
    pub body: String,
}

impl MockResponse {
    pub fn json(status_code: u16, value: serde_json::Value) -> Self {
        Self {
            status_code,
            body: value.to_string(),
        }
    }

    pub fn text(status_code: u16, body: impl Into<String>) -> Self {
        Self {
            status_code,
            body: body.into(),
        }
    }
}

#[derive(Default)]
struct MockState {
    responses: Mutex<HashMap<(String, String), MockResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// 127.0.0.1 の空きポートで動くモックサーバー
///
/// 未登録のルートには WordPress と同じ `rest_no_route` の404を返す。
pub struct MockServer {
    state: Arc<MockState>,
    addr: SocketAddr,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock server");
        let addr = listener.local_addr().expect("mock server address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server");
        });

        Self { state, addr }
    }

    /// `http://127.0.0.1:{port}`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// レスポンスを登録（同じキーは上書き）
    pub async fn mock(&self, method: &str, route: &str, response: MockResponse) {
        self.state
            .responses
            .lock()
            .await
            .insert((method.to_string(), route.to_string()), response);
    }

    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().await.clone()
    }

    pub async fn requests_to(&self, method: &str, route: &str) -> Vec<RecordedRequest> {
        self.requests()
            .await
            .into_iter()
            .filter(|r| r.method == method && r.route == route)
            .collect()
    }
}

/// 接続は受け付けるが応答を返さないサーバー（タイムアウト確認用）
pub async fn silent_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind silent server");
    let addr = listener.local_addr().expect("silent server address");
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

fn route_key(uri: &Uri) -> String {
    let rest_route = uri.query().and_then(|q| {
        url::form_urlencoded::parse(q.as_bytes())
            .find(|(k, _)| k == "rest_route")
            .map(|(_, v)| v.into_owned())
    });

    match rest_route {
        Some(route) => format!("?rest_route={}", route),
        None => uri.path().to_string(),
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let route = route_key(&uri);
    let key = (method.as_str().to_string(), route.clone());

    state.requests.lock().await.push(RecordedRequest {
        method: method.as_str().to_string(),
        route,
        uri: uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_default(),
        headers,
        body: body.to_vec(),
    });

    let response = state
        .responses
        .lock()
        .await
        .get(&key)
        .cloned()
        .unwrap_or_else(|| {
            MockResponse::json(
                404,
                serde_json::json!({"code": "rest_no_route", "message": "No route was found"}),
            )
        });

    let status = StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        response.body,
    )
        .into_response()
}
