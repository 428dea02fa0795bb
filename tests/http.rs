use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Task {
    id: String,
    completed: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WorkingResponse {
    folder: Value,
    date: String,
    tasks: Vec<Task>,
    transitions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrowseResponse {
    view: String,
    current_index: usize,
    counter: String,
    folders: Vec<Value>,
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

fn unique_data_dir() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("day_timer_http_{}_{}", std::process::id(), nanos));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/folders")).send().await {
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
    let child = Command::new(env!("CARGO_BIN_EXE_day_timer"))
        .env("PORT", port.to_string())
        .env("DAY_TIMER_DATA_DIR", unique_data_dir())
        .env("DAY_TIMER_DEMO", "true")
        .env("DAY_TIMER_AUTOSAVE_MS", "50")
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

/// Releases the animation guard and returns to the browse view.
async fn settle(client: &Client, base_url: &str) {
    client
        .post(format!("{base_url}/api/animation/complete"))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{base_url}/api/folder/close"))
        .send()
        .await
        .unwrap();
    client
        .post(format!("{base_url}/api/animation/complete"))
        .send()
        .await
        .unwrap();
}

async fn open(client: &Client, base_url: &str, folder_id: &str) -> WorkingResponse {
    let response = client
        .post(format!("{base_url}/api/folders/{folder_id}/open"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

#[tokio::test]
async fn http_open_folder_engages_animation_guard() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    settle(&client, &server.base_url).await;

    let working = open(&client, &server.base_url, "demo-goal-1").await;
    assert_eq!(working.folder["id"], "demo-goal-1");
    assert!(!working.tasks.is_empty());
    assert_eq!(working.date.len(), 10);
    assert_eq!(working.transitions[0]["kind"], "open_folder");

    let blocked = client
        .post(format!("{}/api/folders/demo-goal-2/open", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(blocked.status(), StatusCode::CONFLICT);

    client
        .post(format!("{}/api/animation/complete", server.base_url))
        .send()
        .await
        .unwrap();
    let closed: BrowseResponse = client
        .post(format!("{}/api/folder/close", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(closed.view, "browse");

    settle(&client, &server.base_url).await;
}

#[tokio::test]
async fn http_toggle_task_flips_completion() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    settle(&client, &server.base_url).await;

    let working = open(&client, &server.base_url, "demo-goal-3").await;
    let first = &working.tasks[0];

    let toggled: Value = client
        .post(format!("{}/api/tasks/{}/toggle", server.base_url, first.id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(toggled["task"]["completed"], !first.completed);

    let unknown = client
        .post(format!("{}/api/tasks/no-such-task/toggle", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::OK);
    let unknown: Value = unknown.json().await.unwrap();
    assert!(unknown["task"].is_null());

    let current: WorkingResponse = client
        .get(format!("{}/api/working", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(current.tasks.len(), working.tasks.len());
    assert_eq!(current.tasks[0].completed, !first.completed);

    settle(&client, &server.base_url).await;
}

#[tokio::test]
async fn http_manual_reset_carries_incomplete_tasks() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    settle(&client, &server.base_url).await;

    let working = open(&client, &server.base_url, "demo-goal-2").await;
    client
        .post(format!("{}/api/animation/complete", server.base_url))
        .send()
        .await
        .unwrap();
    let incomplete = working.tasks.iter().filter(|task| !task.completed).count();
    assert!(incomplete > 0);

    let reset: Value = client
        .post(format!("{}/api/day/reset", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reset["transitions"][0]["kind"], "page_tear");
    assert_eq!(reset["incompleteTasks"].as_array().unwrap().len(), incomplete);
    assert_eq!(reset["note"], "");

    client
        .post(format!("{}/api/incomplete/clear", server.base_url))
        .send()
        .await
        .unwrap();
    let after: Value = client
        .get(format!("{}/api/working", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(after["incompleteTasks"].as_array().unwrap().is_empty());

    settle(&client, &server.base_url).await;
}

#[tokio::test]
async fn http_navigation_wraps_and_unknown_folder_is_not_found() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();
    settle(&client, &server.base_url).await;

    let before: BrowseResponse = client
        .get(format!("{}/api/folders", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(before.folders.len(), 3);

    let after: BrowseResponse = client
        .post(format!("{}/api/folders/navigate", server.base_url))
        .json(&serde_json::json!({ "direction": "next" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after.current_index, (before.current_index + 1) % 3);
    assert_eq!(after.counter, format!("{} / 3", after.current_index + 1));

    settle(&client, &server.base_url).await;
    let missing = client
        .post(format!("{}/api/folders/nope/open", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}
