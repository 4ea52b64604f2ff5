//! End-to-end loads against a local HTTP server using the real reqwest client.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::timeout;

use demonlist::{
    DemonlistConfig, DemonlistLoader, HttpClient, ListCache, ListItem, ListSource, ProbeMode,
    ReqwestClient,
};

struct Route {
    path: &'static str,
    status: StatusCode,
    body: &'static str,
}

const fn route(path: &'static str, status: StatusCode, body: &'static str) -> Route {
    Route { path, status, body }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn start_server(routes: Vec<Route>) -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let mut app = Router::new();
    for Route { path, status, body } in routes {
        app = app.route(path, get(move || async move { (status, body) }));
    }

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn loader_for(addr: SocketAddr, mode: ProbeMode) -> DemonlistLoader {
    let config = DemonlistConfig::default()
        .with_base_url(ListSource::Tsl, format!("http://{}/tsl", addr))
        .with_base_url(ListSource::TslPlus, format!("http://{}/plus", addr))
        .with_probe_mode(mode)
        .with_timeout(Duration::from_secs(5));
    let client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::from_config(&config).unwrap());
    DemonlistLoader::new(client, Arc::new(ListCache::new()), config).unwrap()
}

fn tsl_routes() -> Vec<Route> {
    vec![
        route("/tsl/_list.json", StatusCode::OK, r#"["a","b","c"]"#),
        route("/tsl/a.json", StatusCode::OK, r#"{"id":1,"name":"A","points":250}"#),
        route("/tsl/b.json", StatusCode::INTERNAL_SERVER_ERROR, ""),
        route("/tsl/c.json", StatusCode::OK, r#"{"id":3,"name":"C"}"#),
        route("/plus/_list.json", StatusCode::OK, r#"{"not":"an array"}"#),
    ]
}

#[tokio::test]
async fn test_load_tsl_over_http() {
    init_tracing();
    let (addr, _server) = start_server(tsl_routes()).await;
    let loader = loader_for(addr, ProbeMode::Head);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let failure_tx = tx.clone();

    loader.load_tsl(
        move || {
            let _ = tx.send(None);
        },
        move |code| {
            let _ = failure_tx.send(Some(code));
        },
    );

    let outcome = timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("load timed out");
    assert_eq!(outcome, Some(None));

    let cache = loader.cache();
    assert!(cache.is_loaded(ListSource::Tsl));
    assert_eq!(
        cache.collection(ListSource::Tsl),
        vec![
            ListItem {
                id: 1,
                name: "A".to_string(),
                position: 1
            },
            ListItem {
                id: 3,
                name: "C".to_string(),
                position: 3
            },
        ]
    );
    assert_eq!(cache.find_by_id(ListSource::Tsl, 3).unwrap().position, 3);
}

#[tokio::test]
async fn test_range_probe_over_http() {
    init_tracing();
    let (addr, _server) = start_server(tsl_routes()).await;
    let loader = loader_for(addr, ProbeMode::Range);

    loader.load_async(ListSource::Tsl).await.unwrap();

    assert_eq!(loader.cache().len(ListSource::Tsl), 2);
}

#[tokio::test]
async fn test_malformed_manifest_over_http() {
    init_tracing();
    let (addr, _server) = start_server(tsl_routes()).await;
    let loader = loader_for(addr, ProbeMode::Head);

    let err = loader.load_async(ListSource::TslPlus).await.unwrap_err();

    assert_eq!(err.code(), 400);
    assert!(!loader.cache().is_loaded(ListSource::TslPlus));
}

#[tokio::test]
async fn test_missing_manifest_over_http() {
    init_tracing();
    let (addr, _server) = start_server(Vec::new()).await;
    let loader = loader_for(addr, ProbeMode::Head);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let success_tx = tx.clone();

    loader.load_tsl_plus(
        move || {
            let _ = success_tx.send(None);
        },
        move |code| {
            let _ = tx.send(Some(code));
        },
    );

    let outcome = timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("load timed out");
    assert_eq!(outcome, Some(Some(404)));
}

#[tokio::test]
async fn test_unreachable_host_reports_zero() {
    init_tracing();
    // Grab a free port, then close it so nothing is listening.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let loader = loader_for(addr, ProbeMode::Head);

    let err = loader.load_async(ListSource::Tsl).await.unwrap_err();

    assert_eq!(err.code(), 0);
}
