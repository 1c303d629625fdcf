//! Minimal HTTP stub standing in for the Cloudflare API and the IP-echo endpoint
//!
//! Every connection carries exactly one request; responses are sent with
//! `Connection: close`. Requests are recorded in arrival order.
//!
//! Test-only: shared by the provider and binary integration tests.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

/// A request as received by the stub
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    pub fn query(&self) -> &str {
        self.target.split_once('?').map(|(_, q)| q).unwrap_or("")
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is JSON")
    }
}

/// A canned response for requests whose method matches and whose target starts with `prefix`
#[derive(Debug, Clone)]
pub struct Route {
    pub method: &'static str,
    pub prefix: String,
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn new(method: &'static str, prefix: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            method,
            prefix: prefix.into(),
            status,
            body: body.into(),
        }
    }
}

pub struct StubServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    /// Start serving `routes` on an ephemeral local port
    ///
    /// Routes are matched in order; the first match wins. Unmatched requests
    /// get a 599 so tests fail loudly.
    pub fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { continue };
                handle(stream, &routes, &recorded);
            }
        });

        Self { addr, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_with_method(&self, method: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }
}

fn handle(stream: TcpStream, routes: &[Route], recorded: &Mutex<Vec<RecordedRequest>>) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or("").to_string();
    let target = parts.next().unwrap_or("").to_string();

    let mut headers = Vec::new();
    let mut content_length = 0usize;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 {
            break;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let (name, value) = (name.trim().to_string(), value.trim().to_string());
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.parse().unwrap_or(0);
            }
            headers.push((name, value));
        }
    }

    let mut body = vec![0u8; content_length];
    if content_length > 0 && reader.read_exact(&mut body).is_err() {
        return;
    }

    let request = RecordedRequest {
        method,
        target,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    };

    let (status, body) = routes
        .iter()
        .find(|route| route.method == request.method && request.target.starts_with(&route.prefix))
        .map(|route| (route.status, route.body.clone()))
        .unwrap_or((599, "no stub route".to_string()));

    recorded.lock().unwrap().push(request);

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        body.len(),
        body
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

/// `{"success":true,...,"result":<result>}`
pub fn ok_envelope(result: &str) -> String {
    format!(r#"{{"success":true,"errors":[],"messages":[],"result":{}}}"#, result)
}

/// A successful listing page
pub fn list_envelope(records: &str, page: u32, total_pages: u32) -> String {
    format!(
        r#"{{"success":true,"errors":[],"messages":[],"result":{},"result_info":{{"page":{},"per_page":100,"total_pages":{}}}}}"#,
        records, page, total_pages
    )
}

pub fn record_json(id: &str, name: &str, content: &str) -> String {
    format!(
        r#"{{"id":"{}","type":"A","name":"{}","content":"{}","proxied":false,"ttl":1,"comment":null}}"#,
        id, name, content
    )
}
