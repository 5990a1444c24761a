//! MetricsClient against a stub collector served by axum on a random local port.

use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::{
    extract::Query,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use url::Url;

use perftop::client::{MetricsApi, MetricsClient};
use perftop::error::ApiError;
use perftop::sync::{CycleOutcome, Phase, SyncController, SyncOptions};
use perftop::view::{metric_cards, stat_rows};

fn sample_json(ts: &str, cpu: f64, mem: f64) -> Value {
    json!({
        "id": 1,
        "timestamp": ts,
        "cpu_percent": cpu,
        "memory_total": 8589934592u64,
        "memory_available": 2147483648u64,
        "memory_used": 6442450944u64,
        "memory_percent": mem,
        "disk_usage": {
            "/dev/sda1": {"mountpoint": "/", "total": 1000, "used": 600, "free": 400, "percent": 60.0, "fstype": "ext4"}
        },
        "network_sent": 2048,
        "network_recv": 1536
    })
}

async fn serve(app: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/api")).unwrap()
}

fn client(base: &Url) -> MetricsClient {
    MetricsClient::new(base, Duration::from_secs(5)).unwrap()
}

fn hours(h: u32) -> NonZeroU32 {
    NonZeroU32::new(h).unwrap()
}

#[tokio::test]
async fn latest_parses_sample() {
    let app = Router::new().route(
        "/api/metrics/latest/",
        get(|| async { Json(sample_json("2024-05-01T10:00:00Z", 42.0, 70.0)) }),
    );
    let base = serve(app).await;
    let s = client(&base).fetch_latest().await.unwrap();
    assert_eq!(s.cpu_percent, 42.0);
    assert_eq!(s.disk_usage.len(), 1);
}

#[tokio::test]
async fn latest_404_is_not_found() {
    let app = Router::new().route(
        "/api/metrics/latest/",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "No metrics available"})),
            )
        }),
    );
    let base = serve(app).await;
    match client(&base).fetch_latest().await {
        Err(ApiError::NotFound(msg)) => assert_eq!(msg.as_deref(), Some("No metrics available")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn history_sends_hours_and_accepts_both_shapes() {
    let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
    let seen_route = Arc::clone(&seen);
    let app = Router::new().route(
        "/api/metrics/",
        get(move |Query(q): Query<HashMap<String, String>>| {
            let seen = Arc::clone(&seen_route);
            async move {
                let h = q.get("hours").cloned();
                let wrapped = h.is_some();
                seen.lock().unwrap().push(h);
                let items = vec![
                    sample_json("2024-05-01T10:00:05Z", 10.0, 50.0),
                    sample_json("2024-05-01T10:00:00Z", 20.0, 50.0),
                ];
                if wrapped {
                    Json(json!({"count": 2, "next": null, "previous": null, "results": items}))
                } else {
                    Json(Value::Array(items))
                }
            }
        }),
    );
    let base = serve(app).await;
    let c = client(&base);

    assert_eq!(c.fetch_history(Some(hours(24))).await.unwrap().len(), 2);
    assert_eq!(c.fetch_history(None).await.unwrap().len(), 2);
    assert_eq!(*seen.lock().unwrap(), vec![Some("24".to_string()), None]);
}

#[tokio::test]
async fn empty_stats_window_is_success() {
    let app = Router::new().route(
        "/api/metrics/stats/",
        get(|| async {
            (
                StatusCode::NOT_FOUND,
                Json(json!({"message": "No metrics available for the specified time range"})),
            )
        }),
    );
    let base = serve(app).await;
    let st = client(&base).fetch_stats(hours(6)).await.unwrap();
    assert_eq!(st.total_samples, 0);
    assert_eq!(st.time_range_hours, Some(6));
    assert!(st.cpu_summary().is_none());
}

#[tokio::test]
async fn server_error_keeps_message() {
    let app = Router::new().route(
        "/api/metrics/collect/",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Error collecting system metrics: boom"})),
            )
        }),
    );
    let base = serve(app).await;
    let err = client(&base).trigger_collection().await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 500, .. }), "{err:?}");
    assert_eq!(err.display_message(), "Error collecting system metrics: boom");
}

#[tokio::test]
async fn bad_shape_is_malformed() {
    let app = Router::new()
        .route(
            "/api/metrics/latest/",
            get(|| async { Json(json!({"cpu": "high"})) }),
        )
        .route(
            "/api/metrics/",
            get(|| async { Json(json!([sample_json("2024-05-01T10:00:00Z", 250.0, 50.0)])) }),
        );
    let base = serve(app).await;
    let c = client(&base);
    assert!(matches!(c.fetch_latest().await, Err(ApiError::Malformed(_))));
    // parses, but cpu_percent is out of range
    assert!(matches!(c.fetch_history(None).await, Err(ApiError::Malformed(_))));
}

#[tokio::test]
async fn slow_server_times_out_as_transport() {
    let app = Router::new().route(
        "/api/metrics/latest/",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(sample_json("2024-05-01T10:00:00Z", 1.0, 1.0))
        }),
    );
    let base = serve(app).await;
    let c = MetricsClient::new(&base, Duration::from_millis(200)).unwrap();
    let started = Instant::now();
    let err = c.fetch_latest().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
    assert!(err.is_retryable());
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn unreachable_collector_is_transport() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let base = Url::parse(&format!("http://{addr}/api")).unwrap();
    let err = client(&base).trigger_collection().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)), "{err:?}");
}

#[derive(Clone, Default)]
struct Collector {
    collects: Arc<AtomicUsize>,
    fail_stats: Arc<AtomicBool>,
    empty_stats: Arc<AtomicBool>,
    cpu: Arc<Mutex<f64>>,
}

fn collector_routes(c: Collector) -> Router {
    let collect = c.clone();
    let latest = c.clone();
    let history = c.clone();
    let stats = c;
    Router::new()
        .route(
            "/api/metrics/collect/",
            post(move || {
                let c = collect.clone();
                async move {
                    c.collects.fetch_add(1, Ordering::SeqCst);
                    (StatusCode::CREATED, Json(json!({})))
                }
            }),
        )
        .route(
            "/api/metrics/latest/",
            get(move || {
                let cpu = *latest.cpu.lock().unwrap();
                async move { Json(sample_json("2024-05-01T10:00:10Z", cpu, 70.0)) }
            }),
        )
        .route(
            "/api/metrics/",
            get(move || {
                let cpu = *history.cpu.lock().unwrap();
                async move {
                    Json(json!({"results": [
                        sample_json("2024-05-01T10:00:10Z", cpu, 70.0),
                        sample_json("2024-05-01T10:00:05Z", cpu, 69.0)
                    ]}))
                }
            }),
        )
        .route(
            "/api/metrics/stats/",
            get(move || {
                let fail = stats.fail_stats.load(Ordering::SeqCst);
                let empty = stats.empty_stats.load(Ordering::SeqCst);
                async move {
                    if fail {
                        (StatusCode::BAD_GATEWAY, Json(json!({"error": "database unavailable"})))
                    } else if empty {
                        (StatusCode::NOT_FOUND, Json(json!({"message": "No metrics available"})))
                    } else {
                        (
                            StatusCode::OK,
                            Json(json!({
                                "time_range_hours": 24, "total_samples": 2,
                                "cpu": {"average": 40.5, "maximum": 42.0, "minimum": 39.0},
                                "memory": {"average": 69.5, "maximum": 70.0, "minimum": 69.0}
                            })),
                        )
                    }
                }
            }),
        )
}

fn controller(base: &Url) -> SyncController<MetricsClient> {
    SyncController::new(
        client(base),
        SyncOptions {
            auto_refresh: false,
            ..SyncOptions::default()
        },
    )
}

#[tokio::test]
async fn cycle_feeds_cards_from_real_http() {
    let collector = Collector::default();
    *collector.cpu.lock().unwrap() = 42.0;
    let base = serve(collector_routes(collector.clone())).await;
    let ctl = controller(&base);

    assert_eq!(ctl.run_cycle().await, CycleOutcome::Refreshed);
    let st = ctl.snapshot();
    let latest = st.latest.as_ref().unwrap();
    let cards = metric_cards(latest);
    assert_eq!(cards[0].value, "42%");
    assert_eq!(cards[1].value, "70%");
    assert_eq!(cards[1].subtitle, "6 GB / 8 GB");
    assert_eq!(st.history.len(), 2);
    assert_eq!(collector.collects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_stats_render_without_nan() {
    let collector = Collector::default();
    collector.empty_stats.store(true, Ordering::SeqCst);
    let base = serve(collector_routes(collector)).await;
    let ctl = controller(&base);

    assert_eq!(ctl.run_cycle().await, CycleOutcome::Refreshed);
    let st = ctl.snapshot();
    let rows = stat_rows(st.stats.as_ref().unwrap());
    assert!(rows.iter().all(|r| !r.value.contains("NaN")));
    assert_eq!(rows[0].value, "—");
    assert_eq!(rows[1].value, "—");
}

#[tokio::test]
async fn stats_failure_keeps_previous_data_over_http() {
    let collector = Collector::default();
    *collector.cpu.lock().unwrap() = 10.0;
    let base = serve(collector_routes(collector.clone())).await;
    let ctl = controller(&base);
    assert_eq!(ctl.run_cycle().await, CycleOutcome::Refreshed);

    *collector.cpu.lock().unwrap() = 90.0;
    collector.fail_stats.store(true, Ordering::SeqCst);
    assert_eq!(ctl.run_cycle().await, CycleOutcome::Failed);

    let st = ctl.snapshot();
    assert_eq!(st.phase, Phase::RefreshFailed);
    assert_eq!(st.latest.map(|s| s.cpu_percent), Some(10.0));
    assert!(st.history.iter().all(|s| s.cpu_percent == 10.0));
    assert_eq!(st.error.map(|e| e.message).as_deref(), Some("database unavailable"));
}
