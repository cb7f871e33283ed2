use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct OnboardingState {
    step: usize,
    step_count: usize,
    complete: bool,
}

#[derive(Debug, Deserialize)]
struct RoutineDay {
    routines: Vec<Routine>,
    completed_count: usize,
    total_count: usize,
    percentage: u8,
}

#[derive(Debug, Deserialize)]
struct Routine {
    id: String,
    completed: bool,
}

#[derive(Debug, Deserialize)]
struct Achievements {
    achievements: Vec<Achievement>,
    total_points: u32,
}

#[derive(Debug, Deserialize)]
struct Achievement {
    kind: String,
    progress: u32,
    target: u32,
    completed: bool,
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

fn unique_suffix() -> u128 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos()
}

fn unique_data_path() -> String {
    let mut path = std::env::temp_dir();
    path.push(format!(
        "viva_radiante_http_{}_{}.json",
        std::process::id(),
        unique_suffix()
    ));
    path.to_string_lossy().to_string()
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(base_url.to_string()).send().await {
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

async fn spawn_server_at(data_path: &str) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_viva_radiante"))
        .env("PORT", port.to_string())
        .env("VIVA_DATA_PATH", data_path)
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

async fn spawn_server() -> TestServer {
    spawn_server_at(&unique_data_path()).await
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

async fn sign_up(server: &TestServer, client: &Client) -> AuthResponse {
    let email = format!("user{}@example.com", unique_suffix());
    let response = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({ "email": email, "password": "secret1", "full_name": "Ana" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    response.json().await.unwrap()
}

async fn post_authed(
    server: &TestServer,
    client: &Client,
    token: &str,
    path: &str,
    body: Value,
) -> reqwest::Response {
    client
        .post(format!("{}{path}", server.base_url))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap()
}

async fn complete_onboarding(server: &TestServer, client: &Client, token: &str) {
    let answers = [
        json!({ "age_bracket": "31-45" }),
        json!({ "main_goal": "skin_health" }),
        json!({ "activity_level": "moderate" }),
        json!({ "skin_type": "combination" }),
    ];
    for answer in answers {
        let response =
            post_authed(server, client, token, "/api/onboarding/answer", answer).await;
        assert!(response.status().is_success());
        let response =
            post_authed(server, client, token, "/api/onboarding/next", json!({})).await;
        assert!(response.status().is_success());
    }
}

#[tokio::test]
async fn http_signup_onboarding_and_profile() {
    let server = shared_server().await;
    let client = Client::new();
    let auth = sign_up(&server, &client).await;

    let me: Value = client
        .get(format!("{}/api/me", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["onboarding_complete"], json!(false));
    assert_eq!(me["profile"]["id"], json!(auth.user_id));

    // Advancing without answering the current step is blocked.
    let blocked = post_authed(&server, &client, &auth.token, "/api/onboarding/next", json!({})).await;
    assert_eq!(blocked.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // First answer, then back and forth keeps the value.
    let response = post_authed(
        &server,
        &client,
        &auth.token,
        "/api/onboarding/answer",
        json!({ "age_bracket": "31-45" }),
    )
    .await;
    assert!(response.status().is_success());
    let state: OnboardingState = post_authed(&server, &client, &auth.token, "/api/onboarding/next", json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(state.step, 1);
    assert_eq!(state.step_count, 4);
    let state: OnboardingState = post_authed(&server, &client, &auth.token, "/api/onboarding/back", json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(state.step, 0);
    let state: OnboardingState = post_authed(&server, &client, &auth.token, "/api/onboarding/next", json!({}))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(state.step, 1);

    for answer in [
        json!({ "main_goal": "skin_health" }),
        json!({ "activity_level": "moderate" }),
        json!({ "skin_type": "combination" }),
    ] {
        post_authed(&server, &client, &auth.token, "/api/onboarding/answer", answer).await;
        let response =
            post_authed(&server, &client, &auth.token, "/api/onboarding/next", json!({})).await;
        assert!(response.status().is_success());
    }

    let me: Value = client
        .get(format!("{}/api/me", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["onboarding_complete"], json!(true));
    assert_eq!(me["profile"]["age_bracket"], json!("31-45"));
    assert_eq!(me["profile"]["main_goal"], json!("skin_health"));
    assert_eq!(me["profile"]["activity_level"], json!("moderate"));
    assert_eq!(me["profile"]["skin_type"], json!("combination"));

    let achievements: Achievements = client
        .get(format!("{}/api/achievements", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(achievements.achievements.len(), 3);
    assert_eq!(achievements.total_points, 0);
    assert!(achievements
        .achievements
        .iter()
        .all(|a| a.progress == 0 && !a.completed));

    // Re-entering a finished onboarding is rejected.
    let rejected =
        post_authed(&server, &client, &auth.token, "/api/onboarding/next", json!({})).await;
    assert_eq!(rejected.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn http_routine_seeding_is_idempotent() {
    let server = shared_server().await;
    let client = Client::new();
    let auth = sign_up(&server, &client).await;
    complete_onboarding(&server, &client, &auth.token).await;

    let url = format!("{}/api/routines?date=2026-09-01", server.base_url);
    let first: RoutineDay = client
        .get(&url)
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first.total_count, 5);
    assert_eq!(first.completed_count, 0);
    assert_eq!(first.percentage, 0);

    let second: RoutineDay = client
        .get(&url)
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let first_ids: Vec<&str> = first.routines.iter().map(|r| r.id.as_str()).collect();
    let second_ids: Vec<&str> = second.routines.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(first_ids, second_ids);
}

#[tokio::test]
async fn http_toggle_updates_percentage_and_achievements() {
    let server = shared_server().await;
    let client = Client::new();
    let auth = sign_up(&server, &client).await;
    complete_onboarding(&server, &client, &auth.token).await;

    let url = format!("{}/api/routines?date=2026-09-02", server.base_url);
    let day: RoutineDay = client
        .get(&url)
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let routine = &day.routines[0];

    let toggled: Value = post_authed(
        &server,
        &client,
        &auth.token,
        "/api/routines/toggle",
        json!({ "routine_id": routine.id, "completed": routine.completed }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(toggled["routine"]["completed"], json!(true));
    assert_eq!(toggled["day"]["percentage"], json!(20));

    let achievements: Achievements = client
        .get(format!("{}/api/achievements", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let streak = achievements
        .achievements
        .iter()
        .find(|a| a.kind == "streak")
        .expect("streak achievement");
    assert_eq!(streak.progress, 1);
    assert!(streak.target > streak.progress);

    // Toggling back restores the day but achievement progress is monotonic.
    let toggled: Value = post_authed(
        &server,
        &client,
        &auth.token,
        "/api/routines/toggle",
        json!({ "routine_id": routine.id, "completed": true }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(toggled["routine"]["completed"], json!(false));
    assert_eq!(toggled["day"]["percentage"], json!(0));

    let achievements: Achievements = client
        .get(format!("{}/api/achievements", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let streak = achievements
        .achievements
        .iter()
        .find(|a| a.kind == "streak")
        .unwrap();
    assert_eq!(streak.progress, 1);
}

#[tokio::test]
async fn http_auth_failures() {
    let server = shared_server().await;
    let client = Client::new();

    let email = format!("dup{}@example.com", unique_suffix());
    let signup = json!({ "email": email, "password": "secret1", "full_name": "Ana" });
    let response = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&signup)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let duplicate = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&signup)
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let wrong_password = client
        .post(format!("{}/api/auth/signin", server.base_url))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);

    let weak = client
        .post(format!("{}/api/auth/signup", server.base_url))
        .json(&json!({ "email": "x@example.com", "password": "short", "full_name": "Ana" }))
        .send()
        .await
        .unwrap();
    assert_eq!(weak.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let anonymous = client
        .get(format!("{}/api/routines", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn http_progress_upsert_and_latest() {
    let server = shared_server().await;
    let client = Client::new();
    let auth = sign_up(&server, &client).await;

    let entry = json!({
        "date": "2026-09-03",
        "energy_level": 70,
        "skin_quality": 60,
        "sleep_quality": 80,
        "hydration": 50,
        "mood": 90,
        "notes": "slept well"
    });
    let response = client
        .put(format!("{}/api/progress", server.base_url))
        .bearer_auth(&auth.token)
        .json(&entry)
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let latest: Value = client
        .get(format!("{}/api/progress/latest", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(latest["date"], json!("2026-09-03"));
    assert_eq!(latest["energy_level"], json!(70));
    assert_eq!(latest["notes"], json!("slept well"));

    let out_of_range = json!({
        "date": "2026-09-03",
        "energy_level": 101,
        "skin_quality": 60,
        "sleep_quality": 80,
        "hydration": 50,
        "mood": 90
    });
    let response = client
        .put(format!("{}/api/progress", server.base_url))
        .bearer_auth(&auth.token)
        .json(&out_of_range)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn http_preference_edits_require_completed_onboarding() {
    let server = shared_server().await;
    let client = Client::new();
    let auth = sign_up(&server, &client).await;

    // A partial preference edit on a fresh account must not fake the
    // onboarding-complete signal while the other fields are empty.
    let response = client
        .put(format!("{}/api/profile", server.base_url))
        .bearer_auth(&auth.token)
        .json(&json!({ "age_bracket": "31-45" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let me: Value = client
        .get(format!("{}/api/me", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["onboarding_complete"], json!(false));
    assert_eq!(me["profile"]["age_bracket"], json!(null));

    // Name edits are fine before onboarding.
    let response = client
        .put(format!("{}/api/profile", server.base_url))
        .bearer_auth(&auth.token)
        .json(&json!({ "full_name": "Ana Clara" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    // Onboarding is still reachable and creates the starter set.
    complete_onboarding(&server, &client, &auth.token).await;
    let achievements: Achievements = client
        .get(format!("{}/api/achievements", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(achievements.achievements.len(), 3);

    // With onboarding done, preference edits go through.
    let me: Value = client
        .put(format!("{}/api/profile", server.base_url))
        .bearer_auth(&auth.token)
        .json(&json!({ "skin_type": "oily" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["profile"]["skin_type"], json!("oily"));
    assert_eq!(me["profile"]["age_bracket"], json!("31-45"));
}

#[tokio::test]
async fn http_failed_persist_leaves_operations_unapplied() {
    // Dedicated server so the data path can be sabotaged mid-test.
    let data_path = unique_data_path();
    let server = spawn_server_at(&data_path).await;
    let client = Client::new();
    let auth = sign_up(&server, &client).await;

    for answer in [
        json!({ "age_bracket": "31-45" }),
        json!({ "main_goal": "skin_health" }),
        json!({ "activity_level": "moderate" }),
        json!({ "skin_type": "combination" }),
    ] {
        let response =
            post_authed(&server, &client, &auth.token, "/api/onboarding/answer", answer).await;
        assert!(response.status().is_success());
    }
    for _ in 0..3 {
        let response =
            post_authed(&server, &client, &auth.token, "/api/onboarding/next", json!({})).await;
        assert!(response.status().is_success());
    }

    // A directory at the data path makes the snapshot write fail.
    std::fs::remove_file(&data_path).unwrap();
    std::fs::create_dir(&data_path).unwrap();

    let response =
        post_authed(&server, &client, &auth.token, "/api/onboarding/next", json!({})).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let me: Value = client
        .get(format!("{}/api/me", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["onboarding_complete"], json!(false));

    // Restore storage; the sequencer kept every answer for the retry.
    std::fs::remove_dir(&data_path).unwrap();
    let state: OnboardingState =
        post_authed(&server, &client, &auth.token, "/api/onboarding/next", json!({}))
            .await
            .json()
            .await
            .unwrap();
    assert!(state.complete);

    let url = format!("{}/api/routines?date=2026-09-05", server.base_url);
    let day: RoutineDay = client
        .get(&url)
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let routine_id = day.routines[0].id.clone();

    // Break storage again: the toggle must come back not-applied.
    std::fs::remove_file(&data_path).unwrap();
    std::fs::create_dir(&data_path).unwrap();

    let response = post_authed(
        &server,
        &client,
        &auth.token,
        "/api/routines/toggle",
        json!({ "routine_id": routine_id, "completed": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let day: RoutineDay = client
        .get(&url)
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(day.completed_count, 0);
    assert!(!day.routines[0].completed);

    let achievements: Achievements = client
        .get(format!("{}/api/achievements", server.base_url))
        .bearer_auth(&auth.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(achievements.achievements.iter().all(|a| a.progress == 0));

    // And once storage is back, the same toggle succeeds.
    std::fs::remove_dir(&data_path).unwrap();
    let toggled: Value = post_authed(
        &server,
        &client,
        &auth.token,
        "/api/routines/toggle",
        json!({ "routine_id": routine_id, "completed": false }),
    )
    .await
    .json()
    .await
    .unwrap();
    assert_eq!(toggled["routine"]["completed"], json!(true));
}
