//! End-to-end runs of the reqwest transport. Fixed replies come from mockito;
//! scripted sequences and truncated bodies from a raw HTTP/1.1 responder.
#![cfg(feature = "reqwest")]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use haul_fetch::{
    DownloadError, DownloadRequest, Downloader, HttpClient, Payload, ReqwestClient, RetryOptions,
    download,
};
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct Canned {
    status: u16,
    content_length: usize,
    body: Vec<u8>,
}

impl Canned {
    fn new(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            content_length: body.len(),
            body: body.to_vec(),
        }
    }

    /// Declares `content_length` but sends only `body`.
    fn truncated(content_length: usize, body: &[u8]) -> Self {
        Self {
            status: 200,
            content_length,
            body: body.to_vec(),
        }
    }
}

/// Serves one canned response per connection, in order. The last one repeats.
async fn serve(responses: Vec<Canned>) -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            let n = counter.fetch_add(1, Ordering::SeqCst) as usize;
            let canned = responses[n.min(responses.len() - 1)].clone();
            tokio::spawn(respond(socket, canned));
        }
    });

    (addr, hits)
}

async fn respond(mut socket: TcpStream, canned: Canned) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let reason = match canned.status {
        200 => "OK",
        404 => "Not Found",
        503 => "Service Unavailable",
        _ => "Unknown",
    };
    let head = format!(
        "HTTP/1.1 {} {reason}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        canned.status, canned.content_length
    );
    let _ = socket.write_all(head.as_bytes()).await;
    let _ = socket.write_all(&canned.body).await;
    let _ = socket.shutdown().await;
}

fn options(max_attempts: u32) -> RetryOptions {
    RetryOptions::default()
        .max_attempts(max_attempts)
        .retry_delay(Duration::from_millis(10))
        .silent(true)
}

#[tokio::test]
async fn test_503_503_200_end_to_end() {
    let (addr, hits) = serve(vec![
        Canned::new(503, b"busy"),
        Canned::new(503, b"busy"),
        Canned::new(200, b"0123456789"),
    ])
    .await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out").join("f.zip");

    let request = DownloadRequest::new(format!("http://{addr}/f.zip"))
        .destination(&dest)
        .temp_dir(dir.path())
        .options(options(3));
    let result = Downloader::new(ReqwestClient::new().unwrap())
        .start(request)
        .end()
        .await;

    assert_eq!(result.attempts, 3);
    assert_eq!(hits.load(Ordering::SeqCst), 3);
    assert_eq!(result.payload(), Some(&Payload::File(dest.clone())));
    assert_eq!(std::fs::read(&dest).unwrap(), b"0123456789");
}

#[tokio::test]
async fn test_always_404_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/f.zip")
        .with_status(404)
        .with_body("missing")
        .expect(3)
        .create_async()
        .await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("out").join("f.zip");

    let request = DownloadRequest::new(format!("{}/f.zip", server.url()))
        .destination(&dest)
        .temp_dir(dir.path())
        .options(options(3));
    let result = Downloader::new(ReqwestClient::new().unwrap())
        .run(request)
        .await;

    mock.assert_async().await;
    assert_eq!(result.attempts, 3);
    assert_eq!(
        result.error().map(ToString::to_string).as_deref(),
        Some("Error status code: 404")
    );
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_truncated_body_never_reaches_destination() {
    let (addr, _) = serve(vec![Canned::truncated(1000, &[b'z'; 900])]).await;
    let dir = tempdir().unwrap();
    let dest = dir.path().join("f.zip");

    let request = DownloadRequest::new(format!("http://{addr}/f.zip"))
        .destination(&dest)
        .temp_dir(dir.path())
        .options(options(1));
    let result = Downloader::new(ReqwestClient::new().unwrap())
        .run(request)
        .await;

    let err = result.error().unwrap();
    assert!(
        matches!(
            err,
            DownloadError::SizeMismatch {
                actual: 900,
                expected: 1000
            }
        ),
        "{err:?}"
    );
    assert_eq!(
        err.to_string(),
        "downloaded size 900 does not match expected size 1000"
    );
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_download_into_memory() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/latest.txt")
        .with_status(200)
        .with_body("1.4.2\n")
        .create_async()
        .await;

    let result = download(&format!("{}/latest.txt", server.url()), None, options(1))
        .end()
        .await;

    assert_eq!(result.payload().and_then(Payload::as_text), Some("1.4.2\n"));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let result = download(&format!("http://{addr}/f.zip"), None, options(2))
        .end()
        .await;

    assert_eq!(result.attempts, 2);
    assert!(matches!(result.error(), Some(DownloadError::Transport(_))));
}

#[tokio::test]
async fn test_client_reports_status_and_length() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/")
        .with_status(503)
        .with_body("busy")
        .create_async()
        .await;
    let client = ReqwestClient::new().unwrap();

    let response = client.get(&format!("{}/", server.url())).await.unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(response.content_length, Some(4));
}
