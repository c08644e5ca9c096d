//! Download manager against a local HTTP server.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ndfd_download::{DownloadConfig, DownloadError, DownloadManager, NdfdProduct};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Canned responses by request path. A route listed in `flaky` fails with
/// 503 that many times before serving its body.
#[derive(Clone, Default)]
struct Routes {
    bodies: HashMap<String, Vec<u8>>,
    flaky: HashMap<String, usize>,
}

struct TestServer {
    addr: SocketAddr,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    async fn start(routes: Routes) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let failures: Arc<std::sync::Mutex<HashMap<String, usize>>> =
            Arc::new(std::sync::Mutex::new(routes.flaky.clone()));

        let counter = hits.clone();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                counter.fetch_add(1, Ordering::SeqCst);
                let routes = routes.clone();
                let failures = failures.clone();

                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    let n = socket.read(&mut buf).await.unwrap_or(0);
                    let request = String::from_utf8_lossy(&buf[..n]);
                    let path = request
                        .lines()
                        .next()
                        .and_then(|l| l.split_whitespace().nth(1))
                        .unwrap_or("/")
                        .to_string();

                    let fail = {
                        let mut f = failures.lock().unwrap();
                        match f.get_mut(&path) {
                            Some(remaining) if *remaining > 0 => {
                                *remaining -= 1;
                                true
                            }
                            _ => false,
                        }
                    };

                    let (status, body): (&str, &[u8]) = if fail {
                        ("503 Service Unavailable", b"")
                    } else {
                        match routes.bodies.get(&path) {
                            Some(body) => ("200 OK", body.as_slice()),
                            None => ("404 Not Found", b""),
                        }
                    };

                    let head = format!(
                        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        status,
                        body.len()
                    );
                    let _ = socket.write_all(head.as_bytes()).await;
                    let _ = socket.write_all(body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { addr, hits }
    }

    fn base_url(&self) -> String {
        format!("http://{}/ndfd", self.addr)
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

fn manager(base_url: String, cache_dir: &std::path::Path) -> DownloadManager {
    DownloadManager::new(DownloadConfig {
        base_url,
        cache_dir: cache_dir.to_path_buf(),
        max_retries: 2,
        initial_retry_delay: Duration::from_millis(10),
        max_retry_delay: Duration::from_millis(40),
        request_timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(5),
        max_age: Duration::from_secs(600),
    })
    .unwrap()
}

fn route(sector: &str, period: &str, file: &str) -> String {
    format!("/ndfd/AR.{}/{}/{}", sector, period, file)
}

#[tokio::test]
async fn test_fetch_product_concatenates_periods() {
    let mut routes = Routes::default();
    routes
        .bodies
        .insert(route("conus", "VP.001-003", "ds.maxrh.bin"), b"SHORT".to_vec());
    routes
        .bodies
        .insert(route("conus", "VP.004-007", "ds.maxrh.bin"), b"LONG".to_vec());
    let server = TestServer::start(routes).await;
    let dir = tempfile::tempdir().unwrap();

    let data = manager(server.base_url(), dir.path())
        .fetch_product("conus", NdfdProduct::MaxRh)
        .await
        .unwrap();
    assert_eq!(&data[..], b"SHORTLONG");
}

#[tokio::test]
async fn test_missing_long_range_period_is_skipped() {
    let mut routes = Routes::default();
    routes
        .bodies
        .insert(route("pacswest", "VP.001-003", "ds.wgust.bin"), b"GUST".to_vec());
    let server = TestServer::start(routes).await;
    let dir = tempfile::tempdir().unwrap();

    let data = manager(server.base_url(), dir.path())
        .fetch_product("pacswest", NdfdProduct::WindGust)
        .await
        .unwrap();
    assert_eq!(&data[..], b"GUST");
}

#[tokio::test]
async fn test_no_periods_is_no_data() {
    let server = TestServer::start(Routes::default()).await;
    let dir = tempfile::tempdir().unwrap();

    let err = manager(server.base_url(), dir.path())
        .fetch_product("conus", NdfdProduct::MinT)
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::NoData { .. }));
    // 404s are not retried: one request per period
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn test_retry_after_server_error() {
    let path = route("conus", "VP.001-003", "ds.wspd.bin");
    let mut routes = Routes::default();
    routes.bodies.insert(path.clone(), b"WIND".to_vec());
    routes.flaky.insert(path, 2);
    let server = TestServer::start(routes).await;
    let dir = tempfile::tempdir().unwrap();

    let file = manager(server.base_url(), dir.path())
        .fetch_file("conus", NdfdProduct::WindSpeed, "VP.001-003")
        .await
        .unwrap();
    assert_eq!(std::fs::read(&file).unwrap(), b"WIND");
    assert_eq!(server.hits(), 3);
    assert!(!file.with_extension("bin.partial").exists());
}

#[tokio::test]
async fn test_retries_exhausted() {
    let path = route("conus", "VP.001-003", "ds.rhm.bin");
    let mut routes = Routes::default();
    routes.bodies.insert(path.clone(), b"RH".to_vec());
    routes.flaky.insert(path, 10);
    let server = TestServer::start(routes).await;
    let dir = tempfile::tempdir().unwrap();

    let err = manager(server.base_url(), dir.path())
        .fetch_file("conus", NdfdProduct::Rh, "VP.001-003")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DownloadError::RetriesExhausted { attempts: 3, .. }
    ));
}

#[tokio::test]
async fn test_cached_file_is_reused() {
    let mut routes = Routes::default();
    routes
        .bodies
        .insert(route("conus", "VP.001-003", "ds.minrh.bin"), b"MIN".to_vec());
    let server = TestServer::start(routes).await;
    let dir = tempfile::tempdir().unwrap();
    let manager = manager(server.base_url(), dir.path());

    manager
        .fetch_file("conus", NdfdProduct::MinRh, "VP.001-003")
        .await
        .unwrap();
    manager
        .fetch_file("conus", NdfdProduct::MinRh, "VP.001-003")
        .await
        .unwrap();
    assert_eq!(server.hits(), 1);
}
