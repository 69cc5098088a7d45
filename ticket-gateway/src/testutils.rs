use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::AUTHORIZATION;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use url::Url;

#[derive(Default)]
pub struct MockHelpdeskBuilder {
    tickets: HashMap<u64, (Value, Duration)>,
    conversations: HashMap<u64, (Value, Duration)>,
    contacts: HashMap<u64, (Value, Duration)>,
}

impl MockHelpdeskBuilder {
    pub fn ticket(self, id: u64, ticket: Value) -> Self {
        self.ticket_with_delay(id, ticket, Duration::ZERO)
    }

    pub fn ticket_with_delay(mut self, id: u64, ticket: Value, delay: Duration) -> Self {
        self.tickets.insert(id, (ticket, delay));
        self
    }

    pub fn conversations(self, ticket_id: u64, conversations: Value) -> Self {
        self.conversations_with_delay(ticket_id, conversations, Duration::ZERO)
    }

    pub fn conversations_with_delay(
        mut self,
        ticket_id: u64,
        conversations: Value,
        delay: Duration,
    ) -> Self {
        self.conversations.insert(ticket_id, (conversations, delay));
        self
    }

    pub fn contact(self, id: u64, name: &str) -> Self {
        self.contact_with_delay(id, name, Duration::ZERO)
    }

    /// Registers a contact whose lookup only answers after `delay`.
    pub fn contact_with_delay(mut self, id: u64, name: &str, delay: Duration) -> Self {
        self.contacts
            .insert(id, (json!({"id": id, "name": name}), delay));
        self
    }

    pub async fn start(self) -> MockHelpdesk {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();

        let state = Arc::new(MockState {
            fixtures: self,
            requests: Mutex::new(Vec::new()),
            spans: Mutex::new(Vec::new()),
            unauthenticated: AtomicUsize::new(0),
        });

        let server_state = state.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);
                let state = server_state.clone();

                tokio::spawn(async move {
                    let _ = Builder::new(TokioExecutor::new())
                        .serve_connection(io, service_fn(move |req| handle(state.clone(), req)))
                        .await;
                });
            }
        });

        MockHelpdesk {
            url: Url::parse(&format!("http://127.0.0.1:{port}")).unwrap(),
            state,
        }
    }
}

struct MockState {
    fixtures: MockHelpdeskBuilder,
    requests: Mutex<Vec<String>>,
    spans: Mutex<Vec<RequestSpan>>,
    unauthenticated: AtomicUsize,
}

/// When the mock started and finished answering one request.
#[derive(Debug, Clone)]
pub struct RequestSpan {
    pub path: String,
    pub started: Instant,
    pub finished: Instant,
}

impl RequestSpan {
    pub fn overlaps(&self, other: &RequestSpan) -> bool {
        self.started < other.finished && other.started < self.finished
    }
}

/// In-process stand-in for the helpdesk API that records every request path.
/// Unknown resources answer 404.
pub struct MockHelpdesk {
    pub url: Url,
    state: Arc<MockState>,
}

impl MockHelpdesk {
    pub fn builder() -> MockHelpdeskBuilder {
        MockHelpdeskBuilder::default()
    }

    /// Paths requested so far, in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_matching(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|path| path.starts_with(prefix))
            .count()
    }

    /// Span of the completed request for exactly `path`.
    pub fn span(&self, path: &str) -> Option<RequestSpan> {
        self.state
            .spans
            .lock()
            .unwrap()
            .iter()
            .find(|span| span.path == path)
            .cloned()
    }

    /// Highest number of requests answered at the same time.
    pub fn max_in_flight(&self) -> usize {
        let spans = self.state.spans.lock().unwrap().clone();
        spans
            .iter()
            .map(|span| {
                spans
                    .iter()
                    .filter(|other| {
                        other.started <= span.started && span.started < other.finished
                    })
                    .count()
            })
            .max()
            .unwrap_or(0)
    }

    pub fn unauthenticated_requests(&self) -> usize {
        self.state.unauthenticated.load(Ordering::SeqCst)
    }
}

async fn handle(
    state: Arc<MockState>,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let path = req.uri().path().to_string();
    let authenticated = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if !authenticated {
        state.unauthenticated.fetch_add(1, Ordering::SeqCst);
    }
    state.requests.lock().unwrap().push(path.clone());

    let fixtures = &state.fixtures;
    let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    let fixture = match segments.as_slice() {
        ["api", "v2", "tickets", id] => lookup(&fixtures.tickets, id),
        ["api", "v2", "tickets", id, "conversations"] => lookup(&fixtures.conversations, id),
        ["api", "v2", "contacts", id] => lookup(&fixtures.contacts, id),
        _ => None,
    };
    let found = match fixture {
        Some((value, delay)) => {
            tokio::time::sleep(*delay).await;
            Some(value.clone())
        }
        None => None,
    };
    state.spans.lock().unwrap().push(RequestSpan {
        path,
        started,
        finished: Instant::now(),
    });

    let response = match found {
        Some(value) => Response::new(Full::new(Bytes::from(value.to_string()))),
        None => {
            let mut response = Response::new(Full::new(Bytes::from_static(
                br#"{"code":"not_found","message":"There is no resource at this path"}"#,
            )));
            *response.status_mut() = StatusCode::NOT_FOUND;
            response
        }
    };
    Ok(response)
}

fn lookup<'a>(
    fixtures: &'a HashMap<u64, (Value, Duration)>,
    id: &str,
) -> Option<&'a (Value, Duration)> {
    id.parse::<u64>().ok().and_then(|id| fixtures.get(&id))
}
