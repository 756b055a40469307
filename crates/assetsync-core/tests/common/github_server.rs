//! Minimal HTTP/1.1 server standing in for the GitHub tree API and raw host.
//!
//! Serves `GET /api/repos/{repo}/git/trees/{branch}?recursive=1` with a JSON
//! listing of the configured files, and `GET /raw/{repo}/{branch}/{path}`
//! with each file's body and content type. Counts requests per route.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

/// One file in the fake repository.
#[derive(Debug, Clone)]
pub struct FakeFile {
    pub path: String,
    pub content_type: Option<&'static str>,
    /// `None`: listed in the tree but the raw host answers 404.
    pub body: Option<Vec<u8>>,
}

impl FakeFile {
    pub fn new(path: &str, content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.to_string(),
            content_type: Some(content_type),
            body: Some(body.into()),
        }
    }

    pub fn vanished(path: &str) -> Self {
        Self {
            path: path.to_string(),
            content_type: None,
            body: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// Number of initial tree requests answered with 503.
    pub tree_failures: usize,
}

struct Repo {
    repo: String,
    branch: String,
    files: Vec<FakeFile>,
    opts: ServerOptions,
    tree_requests: AtomicUsize,
    raw_requests: AtomicUsize,
}

/// Handle to a running server. The server runs until the process exits.
#[derive(Clone)]
pub struct FakeGithub {
    pub base_url: String,
    state: Arc<Repo>,
}

impl FakeGithub {
    pub fn api_url(&self) -> String {
        format!("{}/api", self.base_url)
    }

    pub fn raw_url(&self) -> String {
        format!("{}/raw", self.base_url)
    }

    pub fn tree_requests(&self) -> usize {
        self.state.tree_requests.load(Ordering::SeqCst)
    }

    pub fn raw_requests(&self) -> usize {
        self.state.raw_requests.load(Ordering::SeqCst)
    }
}

pub fn start(repo: &str, branch: &str, files: Vec<FakeFile>) -> FakeGithub {
    start_with_options(repo, branch, files, ServerOptions::default())
}

pub fn start_with_options(
    repo: &str,
    branch: &str,
    files: Vec<FakeFile>,
    opts: ServerOptions,
) -> FakeGithub {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let state = Arc::new(Repo {
        repo: repo.to_string(),
        branch: branch.to_string(),
        files,
        opts,
        tree_requests: AtomicUsize::new(0),
        raw_requests: AtomicUsize::new(0),
    });
    let server_state = Arc::clone(&state);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let state = Arc::clone(&server_state);
            thread::spawn(move || handle(stream, &state));
        }
    });
    FakeGithub {
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    }
}

fn read_request_target(stream: &mut TcpStream) -> Option<String> {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match stream.read(&mut chunk) {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let request = String::from_utf8_lossy(&buf);
    let mut first = request.lines().next()?.split_whitespace();
    let method = first.next()?;
    if !method.eq_ignore_ascii_case("GET") {
        return None;
    }
    first.next().map(|s| s.to_string())
}

fn respond(stream: &mut TcpStream, status: &str, content_type: Option<&str>, body: &[u8]) {
    let ct = content_type
        .map(|c| format!("Content-Type: {}\r\n", c))
        .unwrap_or_default();
    let head = format!(
        "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        ct,
        body.len()
    );
    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
}

fn tree_json(repo: &Repo) -> Vec<u8> {
    let mut entries = Vec::new();
    let mut dirs = std::collections::BTreeSet::new();
    for f in &repo.files {
        let mut parent = f.path.as_str();
        while let Some((p, _)) = parent.rsplit_once('/') {
            dirs.insert(p.to_string());
            parent = p;
        }
        entries.push(serde_json::json!({
            "path": f.path,
            "mode": "100644",
            "type": "blob",
            "sha": format!("sha-{}", f.path),
            "size": f.body.as_ref().map(|b| b.len()).unwrap_or(0),
        }));
    }
    for d in dirs {
        entries.push(serde_json::json!({
            "path": d,
            "mode": "040000",
            "type": "tree",
            "sha": format!("tree-{}", d),
        }));
    }
    serde_json::to_vec(&serde_json::json!({
        "sha": "root",
        "tree": entries,
        "truncated": false,
    }))
    .unwrap()
}

fn handle(mut stream: TcpStream, repo: &Repo) {
    let Some(target) = read_request_target(&mut stream) else {
        respond(&mut stream, "405 Method Not Allowed", None, b"");
        return;
    };

    let tree_path = format!(
        "/api/repos/{}/git/trees/{}?recursive=1",
        repo.repo, repo.branch
    );
    if target.starts_with("/api/") {
        let n = repo.tree_requests.fetch_add(1, Ordering::SeqCst);
        if n < repo.opts.tree_failures {
            respond(&mut stream, "503 Service Unavailable", None, b"");
        } else if target == tree_path {
            respond(&mut stream, "200 OK", Some("application/json"), &tree_json(repo));
        } else {
            respond(
                &mut stream,
                "404 Not Found",
                Some("application/json"),
                br#"{"message":"Not Found"}"#,
            );
        }
        return;
    }

    let raw_prefix = format!("/raw/{}/{}/", repo.repo, repo.branch);
    if let Some(path) = target.strip_prefix(&raw_prefix) {
        repo.raw_requests.fetch_add(1, Ordering::SeqCst);
        let file = repo.files.iter().find(|f| f.path == path);
        match file.and_then(|f| f.body.as_ref().map(|b| (f.content_type, b))) {
            Some((ct, body)) => respond(&mut stream, "200 OK", ct, body),
            None => respond(&mut stream, "404 Not Found", Some("text/plain"), b"404: Not Found"),
        }
        return;
    }

    respond(&mut stream, "404 Not Found", None, b"");
}
