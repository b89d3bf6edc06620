use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::{Json, Router};
use http::StatusCode;
use serde_json::{json, Value};
use tokio::sync::Notify;

use api::response::{Health, SyncReport, Trigger};
use registrar::config::Config;
use registrar::startup::WaitError;
use registrar::sync::Registrar;

mod common;

const SECRET: &str = "test-secret";
const TOKEN: &str = "test-token";

type Calls = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

#[derive(Clone)]
struct MediaServer {
    /// Readiness probes answered with 503 before the server comes up.
    warmup: Arc<AtomicUsize>,
    media: Value,
    list_code: i64,
    calls: Calls,
}

impl MediaServer {
    fn new(active: &[&str]) -> Self {
        let media: Vec<_> = active
            .iter()
            .map(|id| json!({"app": "live", "stream": id, "schema": "rtsp", "vhost": "__defaultVhost__"}))
            .collect();
        Self {
            warmup: Arc::new(AtomicUsize::new(0)),
            media: Value::Array(media),
            list_code: 0,
            calls: Default::default(),
        }
    }

    fn calls(&self, method: &str) -> Vec<HashMap<String, String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, q)| q.clone())
            .collect()
    }
}

async fn mediakit(
    State(server): State<MediaServer>,
    Path(method): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    server
        .calls
        .lock()
        .unwrap()
        .push((method.clone(), query.clone()));
    if query.get("secret").map(String::as_str) != Some(SECRET) {
        return (StatusCode::OK, Json(json!({"code": -100, "msg": "bad secret"})));
    }
    match method.as_str() {
        "getServerConfig" => {
            let warming = server
                .warmup
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if warming {
                (StatusCode::SERVICE_UNAVAILABLE, Json(json!({})))
            } else {
                (StatusCode::OK, Json(json!({"code": 0, "data": [{}]})))
            }
        }
        "setServerConfig" => (StatusCode::OK, Json(json!({"code": 0, "changed": 4}))),
        "getMediaList" => {
            if server.list_code != 0 {
                return (
                    StatusCode::OK,
                    Json(json!({"code": server.list_code, "msg": "boom"})),
                );
            }
            (StatusCode::OK, Json(json!({"code": 0, "data": server.media})))
        }
        "addStreamProxy" => {
            if query.get("stream").map(String::as_str) == Some("broken") {
                return (
                    StatusCode::OK,
                    Json(json!({"code": -1, "msg": "pull failed"})),
                );
            }
            (
                StatusCode::OK,
                Json(json!({"code": 0, "data": {"key": "__defaultVhost__/live/x"}})),
            )
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({"code": -404}))),
    }
}

#[derive(Clone)]
struct CameraApi {
    body: Value,
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

async fn cameras(State(registry): State<CameraApi>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    if headers.get("X-Service-Token").and_then(|v| v.to_str().ok()) != Some(TOKEN) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "token"})));
    }
    if let Some((entered, release)) = &registry.gate {
        entered.notify_one();
        release.notified().await;
    }
    (StatusCode::OK, Json(registry.body))
}

fn camera(id: &str, status: &str, url: &str) -> Value {
    json!({"id": id, "name": format!("Camera {id}"), "status": status, "rtsp_url": url})
}

async fn start(server: MediaServer, registry: CameraApi, tmp: &std::path::Path) -> Config {
    let app = Router::new()
        .route("/index/api/:method", get(mediakit))
        .with_state(server)
        .merge(
            Router::new()
                .route("/api/cameras", get(cameras))
                .with_state(registry),
        );
    let addr = common::spawn(app).await;

    let mut cfg = Config::default();
    cfg.mediakit.base_url = format!("http://{addr}");
    cfg.mediakit.secret = SECRET.to_string();
    cfg.api.base = format!("http://{addr}/api");
    cfg.api.token = Some(TOKEN.to_string());
    cfg.streams.pause = 0;
    cfg.startup.initial_backoff = 10;
    cfg.startup.max_backoff = 40;
    cfg.startup.timeout = 5_000;
    cfg.recordings_dir = Some(tmp.join("record").join("proxy"));
    cfg
}

fn registry(body: Value) -> CameraApi {
    CameraApi { body, gate: None }
}

#[tokio::test]
async fn online_camera_without_stream_gets_a_proxy() {
    let tmp = tempfile::tempdir().unwrap();
    let server = MediaServer::new(&[]);
    let cfg = start(
        server.clone(),
        registry(json!([camera("camA", "online", "rtsp://10.0.0.1/a")])),
        tmp.path(),
    )
    .await;

    let report = Registrar::new(&cfg).unwrap().sync().await.unwrap();
    assert_eq!(
        report,
        SyncReport {
            eligible: 1,
            active: 0,
            started: 1,
            failed: 0
        }
    );

    let proxies = server.calls("addStreamProxy");
    assert_eq!(proxies.len(), 1);
    let q = &proxies[0];
    assert_eq!(q["stream"], "camA");
    assert_eq!(q["url"], "rtsp://10.0.0.1/a");
    assert_eq!(q["vhost"], "__defaultVhost__");
    assert_eq!(q["app"], "live");
    for flag in ["enable_rtsp", "enable_rtmp", "enable_hls", "enable_mp4"] {
        assert_eq!(q[flag], "1", "{flag}");
    }
    assert!(tmp.path().join("record/proxy").is_dir());
}

#[tokio::test]
async fn active_and_ineligible_cameras_are_not_started() {
    let tmp = tempfile::tempdir().unwrap();
    let server = MediaServer::new(&["camA"]);
    let cfg = start(
        server.clone(),
        registry(json!({"data": [
            camera("camA", "online", "rtsp://a"),
            camera("camB", "offline", "rtsp://b"),
            {"id": 7, "status": "online"},
        ]})),
        tmp.path(),
    )
    .await;

    let report = Registrar::new(&cfg).unwrap().sync().await.unwrap();
    assert_eq!(report.eligible, 1);
    assert_eq!(report.active, 1);
    assert_eq!(report.started, 0);
    assert!(server.calls("addStreamProxy").is_empty());
}

#[tokio::test]
async fn one_failing_camera_does_not_stop_the_rest() {
    let tmp = tempfile::tempdir().unwrap();
    let server = MediaServer::new(&[]);
    let cfg = start(
        server.clone(),
        registry(json!([
            camera("broken", "online", "rtsp://x"),
            camera("camB", "online", "rtsp://b"),
        ])),
        tmp.path(),
    )
    .await;

    let report = Registrar::new(&cfg).unwrap().sync().await.unwrap();
    assert_eq!(report.started, 1);
    assert_eq!(report.failed, 1);
    let started: Vec<_> = server
        .calls("addStreamProxy")
        .into_iter()
        .map(|q| q["stream"].clone())
        .collect();
    assert_eq!(started, vec!["broken", "camB"]);
}

#[tokio::test]
async fn media_list_errors_fail_the_pass() {
    let tmp = tempfile::tempdir().unwrap();
    let server = MediaServer {
        list_code: -1,
        ..MediaServer::new(&[])
    };
    let cfg = start(
        server.clone(),
        registry(json!([camera("camA", "online", "rtsp://a")])),
        tmp.path(),
    )
    .await;

    assert!(Registrar::new(&cfg).unwrap().sync().await.is_err());
    assert!(server.calls("addStreamProxy").is_empty());
}

#[tokio::test]
async fn wrong_token_fails_the_pass() {
    let tmp = tempfile::tempdir().unwrap();
    let server = MediaServer::new(&[]);
    let mut cfg = start(
        server.clone(),
        registry(json!([camera("camA", "online", "rtsp://a")])),
        tmp.path(),
    )
    .await;
    cfg.api.token = Some("nope".to_string());

    assert!(Registrar::new(&cfg).unwrap().sync().await.is_err());
    assert!(server.calls("addStreamProxy").is_empty());
}

#[tokio::test]
async fn startup_waits_enables_recording_and_serves() {
    let tmp = tempfile::tempdir().unwrap();
    let server = MediaServer::new(&[]);
    server.warmup.store(2, Ordering::SeqCst);
    let cfg = start(
        server.clone(),
        registry(json!([camera("camA", "online", "rtsp://a")])),
        tmp.path(),
    )
    .await;

    let (listener, addr) = common::local_listener().await;
    tokio::spawn(registrar::serve(cfg, listener, std::future::pending()));

    let health = loop {
        match reqwest::get(format!("http://{addr}{}", api::path::HEALTH)).await {
            Ok(res) => break res,
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    };
    assert_eq!(health.status(), StatusCode::OK);
    let health: Health = health.json().await.unwrap();
    assert_eq!(health.service, "zlm-registrar");
    assert_eq!(server.calls("getServerConfig").len(), 3);

    let config = server.calls("setServerConfig");
    assert_eq!(config.len(), 1);
    assert_eq!(config[0]["record.enableMP4"], "1");
    assert_eq!(config[0]["record.fileSecond"], "3600");
    assert_eq!(config[0]["record.filePath"], "./record/proxy/");
    assert_eq!(config[0]["record.enableHLS"], "1");

    let mut res = reqwest::get(format!("http://{addr}{}", api::path::SYNC))
        .await
        .unwrap();
    while res.status() == StatusCode::CONFLICT {
        tokio::time::sleep(Duration::from_millis(20)).await;
        res = reqwest::get(format!("http://{addr}{}", api::path::SYNC))
            .await
            .unwrap();
    }
    assert_eq!(res.status(), StatusCode::OK);
    let body: Trigger<SyncReport> = res.json().await.unwrap();
    assert_eq!(body.status, "success");
    assert!(body.report.is_some());
}

#[tokio::test]
async fn startup_gives_up_when_the_media_server_never_answers() {
    let tmp = tempfile::tempdir().unwrap();
    let server = MediaServer::new(&[]);
    server.warmup.store(usize::MAX, Ordering::SeqCst);
    let mut cfg = start(server.clone(), registry(json!([])), tmp.path()).await;
    cfg.startup.timeout = 200;

    let (listener, _) = common::local_listener().await;
    let err = registrar::serve(cfg, listener, std::future::pending())
        .await
        .unwrap_err();
    match err.downcast_ref::<WaitError>() {
        Some(WaitError::Timeout { attempts, elapsed }) => {
            assert!(*attempts > 1);
            assert!(*elapsed >= Duration::from_millis(200));
        }
        None => panic!("unexpected error: {err:#}"),
    }
    assert!(server.calls("setServerConfig").is_empty());
}

#[tokio::test]
async fn sync_is_refused_while_a_pass_runs() {
    let tmp = tempfile::tempdir().unwrap();
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let server = MediaServer::new(&[]);
    let cfg = start(
        server,
        CameraApi {
            body: json!([]),
            gate: Some((entered.clone(), release.clone())),
        },
        tmp.path(),
    )
    .await;

    let (listener, addr) = common::local_listener().await;
    tokio::spawn(registrar::serve(cfg, listener, std::future::pending()));

    // the startup pass is now waiting on the camera API
    entered.notified().await;
    let res = reqwest::get(format!("http://{addr}{}", api::path::SYNC))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body: Trigger<SyncReport> = res.json().await.unwrap();
    assert_eq!(body.status, "error");

    release.notify_one();
}

#[tokio::test]
async fn failed_manual_sync_answers_500() {
    let tmp = tempfile::tempdir().unwrap();
    let server = MediaServer {
        list_code: -1,
        ..MediaServer::new(&[])
    };
    let cfg = start(server, registry(json!([])), tmp.path()).await;

    let (listener, addr) = common::local_listener().await;
    tokio::spawn(registrar::serve(cfg, listener, std::future::pending()));

    let mut res = loop {
        match reqwest::get(format!("http://{addr}{}", api::path::SYNC)).await {
            Ok(res) => break res,
            Err(_) => tokio::time::sleep(Duration::from_millis(20)).await,
        }
    };
    while res.status() == StatusCode::CONFLICT {
        tokio::time::sleep(Duration::from_millis(20)).await;
        res = reqwest::get(format!("http://{addr}{}", api::path::SYNC))
            .await
            .unwrap();
    }
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Trigger<SyncReport> = res.json().await.unwrap();
    assert_eq!(body.status, "error");
}

#[tokio::test]
async fn manual_sync_finishes_after_the_client_leaves() {
    let tmp = tempfile::tempdir().unwrap();
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let server = MediaServer::new(&[]);
    let cfg = start(
        server.clone(),
        CameraApi {
            body: json!([camera("camA", "online", "rtsp://a")]),
            gate: Some((entered.clone(), release.clone())),
        },
        tmp.path(),
    )
    .await;

    let (listener, addr) = common::local_listener().await;
    tokio::spawn(registrar::serve(cfg, listener, std::future::pending()));

    // let the startup pass through
    entered.notified().await;
    release.notify_one();

    let url = format!("http://{addr}{}", api::path::SYNC);
    let client = reqwest::Client::new();
    loop {
        match client
            .get(&url)
            .timeout(Duration::from_millis(300))
            .send()
            .await
        {
            Ok(res) if res.status() == StatusCode::CONFLICT => {
                tokio::time::sleep(Duration::from_millis(20)).await
            }
            Ok(res) => panic!("unexpected answer {}", res.status()),
            Err(e) => {
                assert!(e.is_timeout(), "{e}");
                break;
            }
        }
    }

    entered.notified().await;
    release.notify_one();
    assert!(common::eventually(|| server.calls("addStreamProxy").len() == 2).await);
}
