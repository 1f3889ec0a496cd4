use axum::{
    extract::{Query, State},
    routing::post,
    Json, Router,
};
use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct EffectSnapshot {
    active: bool,
    show_sparks: bool,
    bolt_visible: bool,
    confirmation_visible: bool,
    bolt_svg: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChargeResponse {
    date: String,
    kwh: f64,
    cost: f64,
    effects: EffectSnapshot,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    start: String,
    end: String,
    data: Value,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

type Posts = Arc<std::sync::Mutex<Vec<String>>>;

/// Stand-in for the spreadsheet macro endpoint, served from its own thread
/// so it outlives each test's runtime.
struct FakeSheet {
    url: String,
    posts: Posts,
}

impl FakeSheet {
    fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    fn last_post(&self) -> Value {
        let posts = self.posts.lock().unwrap();
        let body = posts.last().expect("no charge was posted");
        serde_json::from_str(body).expect("posted body is not JSON")
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));
static SHEET: Lazy<FakeSheet> = Lazy::new(spawn_fake_sheet);

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn spawn_fake_sheet() -> FakeSheet {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake sheet");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().unwrap();
    let posts: Posts = Arc::default();
    let captured = Arc::clone(&posts);

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("fake sheet runtime");
        runtime.block_on(async move {
            let app = Router::new()
                .route("/exec", post(record_charge).get(range_totals))
                .with_state(captured);
            let listener = tokio::net::TcpListener::from_std(listener).expect("fake sheet listener");
            axum::serve(listener, app).await.expect("fake sheet stopped");
        });
    });

    FakeSheet {
        url: format!("http://{addr}/exec"),
        posts,
    }
}

async fn record_charge(State(posts): State<Posts>, body: String) -> &'static str {
    posts.lock().unwrap().push(body);
    "ok"
}

async fn range_totals(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "start": params.get("start"),
        "end": params.get("end"),
        "totalKwh": 42.5,
    }))
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/effects")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(endpoint: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_charge_log"))
        .env("PORT", port.to_string())
        .env("CHARGE_ENDPOINT_URL", endpoint)
        .env("CHARGE_RATE", "0")
        .env("CHARGE_TIMEOUT_SECS", "2")
        .env("RUST_LOG", "info")
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    let base_url = format!("http://127.0.0.1:{port}");
    let server = TestServer { base_url, child };
    wait_until_ready(&server.base_url).await;
    server
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = spawn_server(&SHEET.url).await;
    #[cfg(unix)]
    cleanup::register(server.child.id());
    let server = Arc::new(server);
    *guard = Some(Arc::clone(&server));
    server
}

/// Loads the page and returns the view id it was issued.
async fn open_page(client: &Client, base_url: &str) -> u64 {
    let html = client
        .get(format!("{base_url}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    let start = html.find("data-view=\"").expect("page has no view id") + "data-view=\"".len();
    let len = html[start..].find('"').expect("unterminated view id");
    html[start..start + len].parse().expect("view id is not a number")
}

async fn set_view(client: &Client, base_url: &str, view: u64, active: bool) -> EffectSnapshot {
    client
        .post(format!("{base_url}/api/view"))
        .json(&json!({ "view": view, "active": active }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn effects(client: &Client, base_url: &str, view: u64) -> EffectSnapshot {
    client
        .get(format!("{base_url}/api/effects"))
        .query(&[("view", view)])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn log_charge(client: &Client, base_url: &str, body: Value) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/charge"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_log_charge_posts_sheet_payload_and_celebrates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let view = open_page(&client, &server.base_url).await;
    assert!(set_view(&client, &server.base_url, view, true).await.active);

    let response = log_charge(
        &client,
        &server.base_url,
        json!({ "kwh": 5.2, "date": "2024-03-09", "view": view }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let logged: ChargeResponse = response.json().await.unwrap();

    assert_eq!(logged.date, "03/09/2024");
    assert_eq!(logged.kwh, 5.2);
    assert_eq!(logged.cost, 0.0);
    assert!(logged.effects.active);
    assert!(logged.effects.confirmation_visible);
    assert!(logged.effects.bolt_visible);
    assert!(logged.effects.show_sparks);
    let svg = logged.effects.bolt_svg.expect("celebration bolt");
    assert!(svg.starts_with("<svg"));

    let posted = SHEET.last_post();
    assert_eq!(posted["date"], "03/09/2024");
    assert_eq!(posted["kwh"].as_f64(), Some(5.2));
    assert_eq!(posted["cost"].as_f64(), Some(0.0));
    assert_eq!(posted.as_object().unwrap().len(), 3);

    set_view(&client, &server.base_url, view, false).await;
}

#[tokio::test]
async fn http_log_charge_requires_kwh_and_date() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let before = SHEET.post_count();

    for body in [
        json!({ "date": "2024-03-09" }),
        json!({ "kwh": 0, "date": "2024-03-09" }),
        json!({ "kwh": 3.1 }),
        json!({ "kwh": 3.1, "date": "  " }),
        json!({ "kwh": 3.1, "date": "09/03/2024" }),
    ] {
        let response = log_charge(&client, &server.base_url, body.clone()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {body}");
    }

    assert_eq!(SHEET.post_count(), before);
}

#[tokio::test]
async fn http_history_proxies_range() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/api/history", server.base_url))
        .query(&[("start", "2024-03-01"), ("end", "2024-03-31")])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let history: HistoryResponse = response.json().await.unwrap();

    assert_eq!(history.start, "2024-03-01");
    assert_eq!(history.end, "2024-03-31");
    assert_eq!(history.data["start"], "2024-03-01");
    assert_eq!(history.data["end"], "2024-03-31");
    assert_eq!(history.data["totalKwh"].as_f64(), Some(42.5));
}

#[tokio::test]
async fn http_hidden_page_does_not_stop_other_pages() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    let first = open_page(&client, &server.base_url).await;
    let second = open_page(&client, &server.base_url).await;
    assert_ne!(first, second);

    assert!(set_view(&client, &server.base_url, first, true).await.active);
    assert!(set_view(&client, &server.base_url, second, true).await.active);

    let hidden = set_view(&client, &server.base_url, first, false).await;
    assert!(!hidden.active);
    assert!(hidden.bolt_svg.is_none());
    assert!(!effects(&client, &server.base_url, first).await.active);
    assert!(effects(&client, &server.base_url, second).await.active);

    let response = log_charge(
        &client,
        &server.base_url,
        json!({ "kwh": 1.5, "date": "2024-03-10", "view": second }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let logged: ChargeResponse = response.json().await.unwrap();
    assert!(logged.effects.active);
    assert!(logged.effects.confirmation_visible);
    assert!(logged.effects.bolt_visible);

    set_view(&client, &server.base_url, second, false).await;
}

#[tokio::test]
async fn http_unreachable_endpoint_is_not_logged() {
    let _guard = TEST_LOCK.lock().await;
    let dead_endpoint = format!("http://127.0.0.1:{}/exec", pick_free_port());
    let server = spawn_server(&dead_endpoint).await;
    let client = Client::new();
    let view = open_page(&client, &server.base_url).await;
    set_view(&client, &server.base_url, view, true).await;

    let response = log_charge(
        &client,
        &server.base_url,
        json!({ "kwh": 5.2, "date": "2024-03-09", "view": view }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let message = response.text().await.unwrap();
    assert!(message.contains("request failed, not logged"), "{message}");

    let snapshot = effects(&client, &server.base_url, view).await;
    assert!(snapshot.active);
    assert!(!snapshot.confirmation_visible);
}
