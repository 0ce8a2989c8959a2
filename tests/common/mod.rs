//! In-process OpenKeyval stand-in for integration tests
//!
//! Serves `GET /{key}` and form-encoded `POST /` from an in-memory map on its
//! own thread and runtime, so both async and blocking tests can use it.
//! Faults, delays and the answer for missing keys can be injected.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use percent_encoding::percent_decode;
use tokio::net::TcpListener;

const NOT_FOUND_BODY: &[u8] = b"{\"error\":\"not_found\",\"documentation_url\":\"http://openkeyval.org/\"}";

#[derive(Default)]
struct State {
    values: Mutex<HashMap<String, Vec<u8>>>,
    fault: Mutex<Option<(StatusCode, Bytes)>>,
    missing: Mutex<Option<(StatusCode, Bytes)>>,
    delay: Mutex<Option<Duration>>,
    requests: AtomicUsize,
}

pub struct StubServer {
    addr: SocketAddr,
    state: Arc<State>,
}

impl StubServer {
    pub fn start() -> Self {
        let state = Arc::new(State::default());
        let server_state = Arc::clone(&state);
        let (addr_tx, addr_rx) = mpsc::channel();

        std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("Failed to build stub runtime");

            runtime.block_on(async move {
                let listener = TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("Failed to bind stub listener");
                addr_tx
                    .send(listener.local_addr().expect("Stub has no local address"))
                    .expect("Failed to report stub address");

                loop {
                    let Ok((stream, _)) = listener.accept().await else {
                        continue;
                    };
                    let state = Arc::clone(&server_state);
                    tokio::spawn(async move {
                        let service = service_fn(move |req| handle(Arc::clone(&state), req));
                        let _ = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service)
                            .await;
                    });
                }
            });
        });

        let addr = addr_rx.recv().expect("Stub server did not start");
        Self { addr, state }
    }

    /// Base URL to hand to a store.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Answer every request with `status` and `body`.
    pub fn fail_with(&self, status: u16, body: &'static str) {
        *self.state.fault.lock().unwrap() = Some((
            StatusCode::from_u16(status).unwrap(),
            Bytes::from_static(body.as_bytes()),
        ));
    }

    /// Answer reads of unknown keys with `status` and `body` instead of a 404.
    pub fn answer_missing_with(&self, status: u16, body: &'static str) {
        *self.state.missing.lock().unwrap() = Some((
            StatusCode::from_u16(status).unwrap(),
            Bytes::from_static(body.as_bytes()),
        ));
    }

    /// Hold every response for `delay`.
    pub fn delay_responses(&self, delay: Duration) {
        *self.state.delay.lock().unwrap() = Some(delay);
    }

    /// Put a raw value in place without going through a client.
    pub fn seed(&self, key: &str, value: &[u8]) {
        self.state
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_vec());
    }

    /// Value currently held for `key`.
    pub fn stored(&self, key: &str) -> Option<Vec<u8>> {
        self.state.values.lock().unwrap().get(key).cloned()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

async fn handle(state: Arc<State>, req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    state.requests.fetch_add(1, Ordering::SeqCst);

    let delay = *state.delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let fault = state.fault.lock().unwrap().clone();
    if let Some((status, body)) = fault {
        return Ok(respond(status, body));
    }

    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match (method, path.as_str()) {
        (Method::POST, "/") => {
            let body = match req.into_body().collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(e) => return Ok(respond(StatusCode::BAD_REQUEST, Bytes::from(e.to_string()))),
            };
            let mut fields = parse_form(&body);
            match (fields.remove("key"), fields.remove("value")) {
                (Some(key), Some(value)) => {
                    let key = String::from_utf8_lossy(&key).into_owned();
                    let reply = format!("{{\"status\":\"multiset\",\"keys\":{{\"{}\":\"{}\"}}}}", key, key);
                    state.values.lock().unwrap().insert(key, value);
                    respond(StatusCode::OK, Bytes::from(reply))
                }
                _ => respond(StatusCode::BAD_REQUEST, Bytes::from_static(b"missing key or value")),
            }
        }
        (Method::GET, path) if path.len() > 1 => {
            let key = percent_decode(path[1..].as_bytes()).decode_utf8_lossy().into_owned();
            let value = state.values.lock().unwrap().get(&key).cloned();
            match value {
                Some(value) => respond(StatusCode::OK, Bytes::from(value)),
                None => {
                    let missing = state.missing.lock().unwrap().clone();
                    let (status, body) =
                        missing.unwrap_or((StatusCode::NOT_FOUND, Bytes::from_static(NOT_FOUND_BODY)));
                    respond(status, body)
                }
            }
        }
        _ => respond(StatusCode::NOT_FOUND, Bytes::from_static(b"Path not found")),
    };

    Ok(response)
}

fn respond(status: StatusCode, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
}

/// Decodes a form body byte-wise so binary values survive.
fn parse_form(body: &[u8]) -> HashMap<String, Vec<u8>> {
    body.split(|b| *b == b'&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, |b| *b == b'=');
            let name = decode_component(parts.next()?);
            let value = decode_component(parts.next().unwrap_or_default());
            Some((String::from_utf8_lossy(&name).into_owned(), value))
        })
        .collect()
}

fn decode_component(raw: &[u8]) -> Vec<u8> {
    let spaced: Vec<u8> = raw.iter().map(|&b| if b == b'+' { b' ' } else { b }).collect();
    percent_decode(&spaced).collect()
}

/// An address nothing listens on.
pub fn refused_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Probe has no local address");
    drop(listener);
    format!("http://{}", addr)
}
