//! Minimal HTTP/1.1 server for exercising the real clients.
//!
//! Each accepted connection is answered with the next canned response and
//! then closed; the raw request text is kept for assertions.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub struct StubResponse {
    status: u16,
    content_type: &'static str,
    body: Vec<u8>,
    declared_length: Option<usize>,
}

impl StubResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self::with_type(status, "application/json", body.as_bytes())
    }

    pub fn html(status: u16, body: &str) -> Self {
        Self::with_type(status, "text/html", body.as_bytes())
    }

    pub fn image(status: u16, body: &[u8]) -> Self {
        Self::with_type(status, "image/jpeg", body)
    }

    /// Advertise a longer body than is sent, then hang up.
    pub fn truncated(mut self, declared_length: usize) -> Self {
        self.declared_length = Some(declared_length);
        self
    }

    fn with_type(status: u16, content_type: &'static str, body: &[u8]) -> Self {
        Self {
            status,
            content_type,
            body: body.to_vec(),
            declared_length: None,
        }
    }

    fn to_bytes(&self) -> Vec<u8> {
        let length = self.declared_length.unwrap_or(self.body.len());
        let mut raw = format!(
            "HTTP/1.1 {} Stub\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            self.status, self.content_type, length
        )
        .into_bytes();
        raw.extend_from_slice(&self.body);
        raw
    }
}

pub struct StubServer {
    pub url: String,
    listener: Option<TcpListener>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl StubServer {
    pub async fn bind() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        Self {
            url,
            listener: Some(listener),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer one connection per response, in order.
    pub fn serve(&mut self, responses: Vec<StubResponse>) {
        let listener = self.listener.take().expect("serve called twice");
        let requests = Arc::clone(&self.requests);
        tokio::spawn(async move {
            for response in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let request = read_request(&mut stream).await;
                requests.lock().unwrap().push(request);
                stream.write_all(&response.to_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&buf[..n]);
        if request_complete(&raw) {
            break;
        }
    }
    String::from_utf8_lossy(&raw).into_owned()
}

fn request_complete(raw: &[u8]) -> bool {
    let Some(head_end) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
        return false;
    };
    let head = String::from_utf8_lossy(&raw[..head_end]).to_ascii_lowercase();
    let body = &raw[head_end + 4..];
    if head.contains("transfer-encoding: chunked") {
        return body.ends_with(b"0\r\n\r\n");
    }
    let length = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|value| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    body.len() >= length
}
