use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const RELAY_FALLBACK: &str = "AI couldn't respond right now — but you're doing great ❤️";
const TRANSPORT_FALLBACK: &str = "AI unavailable right now, but you’re doing great ❤️";

#[derive(Debug, Deserialize)]
struct Stats {
    count: usize,
    average: Option<f64>,
    streak: u32,
    trend: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct Dashboard {
    stats: Stats,
    average_display: String,
    history_html: String,
    activities: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Feedback {
    phase: String,
    message: Option<String>,
    controls_enabled: bool,
}

#[derive(Debug, Deserialize)]
struct CheckinResponse {
    dashboard: Dashboard,
    feedback: Feedback,
}

#[derive(Debug, Deserialize)]
struct RelayReply {
    reply: String,
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

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

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

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

fn unique_data_path() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("mood_tracker_http_{}_{}.json", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/dashboard")).send().await {
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

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    // Nothing listens here, so every feedback request fails at the transport.
    let dead_relay = format!("http://127.0.0.1:{}/ai-response", pick_free_port());
    let child = Command::new(env!("CARGO_BIN_EXE_mood_tracker"))
        .env("PORT", port.to_string())
        .env("APP_DATA_PATH", unique_data_path())
        .env("RELAY_URL", dead_relay)
        .env("RELAY_TIMEOUT_SECS", "2")
        .env("GEMINI_API_KEY", "")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn dashboard(client: &Client, base_url: &str) -> Dashboard {
    client
        .get(format!("{base_url}/api/dashboard?range=all"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn wait_for_idle(client: &Client, base_url: &str) -> Feedback {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        let status: Feedback = client
            .get(format!("{base_url}/api/feedback"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        if status.controls_enabled {
            return status;
        }
        if Instant::now() > deadline {
            panic!("feedback never settled");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn save(client: &Client, base_url: &str, body: serde_json::Value) -> reqwest::Response {
    client
        .post(format!("{base_url}/api/checkin"))
        .json(&body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_save_without_mood_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = dashboard(&client, &server.base_url).await;
    let response = save(&client, &server.base_url, serde_json::json!({ "note": "hi" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response.text().await.unwrap(),
        "Please select your mood (tap an emoji)."
    );

    let after = dashboard(&client, &server.base_url).await;
    assert_eq!(after.stats.count, before.stats.count);
}

#[tokio::test]
async fn http_save_out_of_range_mood_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = dashboard(&client, &server.base_url).await;
    let response = save(&client, &server.base_url, serde_json::json!({ "moodValue": 8 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(dashboard(&client, &server.base_url).await.stats.count, before.stats.count);
}

#[tokio::test]
async fn http_checkin_updates_history_and_falls_back_on_relay_failure() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = dashboard(&client, &server.base_url).await;
    let response = save(
        &client,
        &server.base_url,
        serde_json::json!({ "moodValue": 4, "note": "<b>sunny</b> walk", "range": "all" }),
    )
    .await;
    assert!(response.status().is_success());

    let body: CheckinResponse = response.json().await.unwrap();
    assert_eq!(body.dashboard.stats.count, before.stats.count + 1);
    assert!(body.dashboard.stats.streak >= 1);
    assert_eq!(body.dashboard.stats.trend.last(), Some(&4));
    assert!(body.dashboard.stats.average.is_some());
    assert_ne!(body.dashboard.average_display, "—");
    assert!(body.dashboard.history_html.contains("&lt;b&gt;sunny&lt;/b&gt; walk"));
    assert_eq!(body.dashboard.activities[0], "Celebrate 1 win from today");

    if !body.feedback.controls_enabled {
        assert_eq!(body.feedback.phase, "awaiting_response");
    }

    let settled = wait_for_idle(&client, &server.base_url).await;
    assert_eq!(settled.phase, "idle");
    assert_eq!(settled.message.as_deref(), Some(TRANSPORT_FALLBACK));
}

#[tokio::test]
async fn http_export_serves_csv_attachment() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = save(
        &client,
        &server.base_url,
        serde_json::json!({ "moodValue": 2, "note": "line one\nline \"two\", three" }),
    )
    .await;
    assert!(response.status().is_success());
    wait_for_idle(&client, &server.base_url).await;

    let response = client
        .get(format!("{}/api/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    assert_eq!(response.headers()["content-type"], "text/csv");
    assert!(
        response.headers()["content-disposition"]
            .to_str()
            .unwrap()
            .contains("mood_entries.csv")
    );

    let text = response.text().await.unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("date,mood,note"));
    assert!(text.ends_with(r#",2,"line one line ""two"", three""#));
}

#[tokio::test]
async fn http_clear_requires_confirmation() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = save(&client, &server.base_url, serde_json::json!({ "moodValue": 3 })).await;
    assert!(response.status().is_success());
    wait_for_idle(&client, &server.base_url).await;

    let response = client
        .delete(format!("{}/api/entries", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(dashboard(&client, &server.base_url).await.stats.count > 0);

    let response = client
        .delete(format!("{}/api/entries?confirm=true", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let after = dashboard(&client, &server.base_url).await;
    assert_eq!(after.stats.count, 0);
    assert_eq!(after.stats.streak, 0);
    assert_eq!(after.average_display, "—");
    assert!(after.history_html.contains("No entries yet"));

    let response = client
        .get(format!("{}/api/export", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn http_relay_endpoint_always_replies() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let reply: RelayReply = client
        .post(format!("{}/ai-response", server.base_url))
        .json(&serde_json::json!({ "moodValue": 2, "note": "tired" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reply.reply, RELAY_FALLBACK);

    let response = client
        .post(format!("{}/ai-response", server.base_url))
        .header("content-type", "application/json")
        .body("{ not json")
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let reply: RelayReply = response.json().await.unwrap();
    assert_eq!(reply.reply, RELAY_FALLBACK);
}

#[tokio::test]
async fn http_activity_suggestions_follow_mood() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let body: serde_json::Value = client
        .get(format!("{}/api/activities?mood=1", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["activities"][0], "Slow 2-minute breathing");

    let body: serde_json::Value = client
        .post(format!("{}/api/activities/apply", server.base_url))
        .json(&serde_json::json!({ "note": "Stretch", "label": "Stretch" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["note"], "Stretch");
}

#[tokio::test]
async fn http_unreadable_mood_falls_back_to_default_activities() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for mood in ["abc", "", "3.5"] {
        let response = client
            .get(format!("{}/api/activities?mood={mood}", server.base_url))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["mood"].is_null());
        assert_eq!(body["activities"][0], "2-minute breathing");
        assert_eq!(body["activities"].as_array().unwrap().len(), 5);
    }

    let response = client
        .get(format!("{}/api/dashboard?range=7&mood=oops", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/?range=7&mood=oops", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn http_index_renders_page() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let html = client
        .get(format!("{}/?range=30", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(html.contains("How are you feeling?"));
    assert!(html.contains(r#"<option value="30" selected>"#));
    assert!(!html.contains("{{"));
}
