use flat_ledger::{
    Config, ListingDraft, ListingError, ListingId, ListingPatch, ListingSource, ListingStatus,
    NetworkFailure, RemoteClient,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Minimal HTTP server answering every request with the same response
struct CannedServer {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    async fn start(status_line: &'static str, body: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}/api", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let seen = seen.clone();
                tokio::spawn(async move {
                    respond(stream, &seen, status_line, body).await;
                });
            }
        });

        Self { base_url, requests }
    }

    fn client(&self) -> RemoteClient {
        RemoteClient::new(&Config::new(&self.base_url)).unwrap()
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn respond(
    mut stream: TcpStream,
    seen: &Mutex<Vec<String>>,
    status_line: &str,
    body: &str,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    loop {
        let n = stream.read(&mut chunk).await.unwrap_or(0);
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }

    seen.lock()
        .unwrap()
        .push(String::from_utf8_lossy(&buf).into_owned());

    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

#[tokio::test]
async fn list_normalizes_identity_aliases() {
    let server = CannedServer::start(
        "200 OK",
        r#"[
            {"_id":"65a1","flatNo":"A-101","type":"2BHK","price":150000,"status":"Available","image":""},
            {"id":9,"flatNo":"B-204","type":"3BHK","price":"245000","status":"Sold","image":"https://img.example/b.jpg"}
        ]"#,
    )
    .await;

    let listings = server.client().list().await.unwrap();

    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].id, ListingId::from("65a1"));
    assert_eq!(listings[0].image_url, None);
    assert_eq!(listings[1].id, ListingId::from("9"));
    assert_eq!(listings[1].price, 245_000.0);
    assert_eq!(listings[1].status, ListingStatus::Sold);

    let requests = server.requests();
    assert!(requests[0].starts_with("GET /api/flats HTTP/1.1"));
}

#[tokio::test]
async fn non_array_list_body_is_empty() {
    let server = CannedServer::start("200 OK", r#"{"flats":[]}"#).await;
    assert!(server.client().list().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_posts_wire_fields() {
    let server = CannedServer::start(
        "201 Created",
        r#"{"_id":"new1","flatNo":"A-101","type":"2BHK","price":150000,"status":"Available","image":""}"#,
    )
    .await;

    let draft = ListingDraft::new("A-101", "2BHK", 150_000.0);
    let created = server.client().create(&draft).await.unwrap();

    assert_eq!(created.id, ListingId::from("new1"));
    assert_eq!(created.to_draft(), draft);

    let request = &server.requests()[0];
    assert!(request.starts_with("POST /api/flats HTTP/1.1"));
    assert!(request.contains(r#""flatNo":"A-101""#));
    assert!(request.contains(r#""type":"2BHK""#));
    assert!(!request.contains("_id"));
}

#[tokio::test]
async fn update_sends_partial_body() {
    let server = CannedServer::start(
        "200 OK",
        r#"{"_id":"x1","flatNo":"A-101","type":"2BHK","price":150000,"status":"Sold"}"#,
    )
    .await;

    let updated = server
        .client()
        .update(&ListingId::from("x1"), &ListingPatch::status(ListingStatus::Sold))
        .await
        .unwrap();
    assert_eq!(updated.status, ListingStatus::Sold);

    let request = &server.requests()[0];
    assert!(request.starts_with("PUT /api/flats/x1 HTTP/1.1"));
    assert!(request.ends_with(r#"{"status":"Sold"}"#));
}

#[tokio::test]
async fn update_ack_without_listing_is_a_protocol_error() {
    let server = CannedServer::start("200 OK", r#"{"message":"updated"}"#).await;

    let result = server
        .client()
        .update(&ListingId::from("x1"), &ListingPatch::status(ListingStatus::Sold))
        .await;
    assert!(matches!(result, Err(ListingError::Protocol(_))));
}

#[tokio::test]
async fn missing_listing_maps_to_not_found() {
    let server = CannedServer::start("404 Not Found", r#"{"message":"Flat not found"}"#).await;
    let id = ListingId::from("gone");

    assert_eq!(
        server.client().remove(&id).await,
        Err(ListingError::NotFound(id))
    );
}

#[tokio::test]
async fn delete_accepts_empty_body() {
    let server = CannedServer::start("200 OK", "").await;
    server.client().remove(&ListingId::from("abc")).await.unwrap();
    assert!(server.requests()[0].starts_with("DELETE /api/flats/abc HTTP/1.1"));
}

#[tokio::test]
async fn rejected_create_is_validation() {
    let server = CannedServer::start("400 Bad Request", "flatNo is required").await;
    let result = server
        .client()
        .create(&ListingDraft::new("A-1", "2BHK", 1.0))
        .await;
    assert_eq!(
        result,
        Err(ListingError::Validation("flatNo is required".to_string()))
    );
}

#[tokio::test]
async fn server_error_is_rejected() {
    let server = CannedServer::start("503 Service Unavailable", "").await;
    assert!(matches!(
        server.client().list().await,
        Err(ListingError::ServerRejected { status: 503, .. })
    ));
}

#[tokio::test]
async fn hung_backend_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let config = Config::new(base_url).with_timeout(Duration::from_millis(200));
    let client = RemoteClient::new(&config).unwrap();

    assert_eq!(
        client.list().await,
        Err(ListingError::Network(NetworkFailure::Timeout))
    );
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}/api", listener.local_addr().unwrap());
    drop(listener);

    let client = RemoteClient::new(&Config::new(base_url)).unwrap();
    assert!(matches!(
        client.list().await,
        Err(ListingError::Network(NetworkFailure::Unreachable(_)))
    ));
}
