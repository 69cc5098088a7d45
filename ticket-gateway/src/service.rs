use crate::aggregator::Aggregator;
use crate::http::{html_response, json_response, text_response};
use crate::metrics_defs::REQUEST_DURATION;
use crate::summary::{format_summary, render_summary_page};
use crate::types::TicketId;
use hyper::body::Incoming;
use hyper::service::Service;
use hyper::{Method, Request, Response, StatusCode};
use serde::Serialize;
use shared::histogram;
use shared::http::{ResponseBody, make_error_response};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use subtle::ConstantTimeEq;

pub const ACCESS_KEY_HEADER: &str = "x-api-key";

const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Invalid API key";
const TICKET_ERROR_MESSAGE: &str = "Failed to fetch ticket or conversations";
const SUMMARY_ERROR_MESSAGE: &str = "Could not generate summary.";

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Requests rejected before reaching the aggregator
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ApiError {
    #[error("missing or invalid access key")]
    Unauthorized,
    #[error("no route for path")]
    NotFound,
    #[error("method not allowed")]
    MethodNotAllowed,
}

impl ApiError {
    fn into_response(self) -> Response<ResponseBody> {
        match self {
            ApiError::Unauthorized => json_response(
                StatusCode::UNAUTHORIZED,
                &ErrorBody {
                    error: UNAUTHORIZED_MESSAGE,
                },
            ),
            ApiError::NotFound => make_error_response(StatusCode::NOT_FOUND),
            ApiError::MethodNotAllowed => make_error_response(StatusCode::METHOD_NOT_ALLOWED),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Route {
    Ticket(TicketId),
    Summary(TicketId),
}

impl Route {
    /// Matches `/ticket/{id}` and `/summary/{id}`, with or without one trailing slash.
    fn parse(method: &Method, path: &str) -> Result<Route, ApiError> {
        let path = path.trim_start_matches('/');
        let path = path.strip_suffix('/').unwrap_or(path);
        let segments: Vec<&str> = path.split('/').collect();
        let route = match segments.as_slice() {
            ["ticket", id] => Route::Ticket(parse_id(id)?),
            ["summary", id] => Route::Summary(parse_id(id)?),
            _ => return Err(ApiError::NotFound),
        };

        if *method != Method::GET && *method != Method::HEAD {
            return Err(ApiError::MethodNotAllowed);
        }
        Ok(route)
    }

    fn name(&self) -> &'static str {
        match self {
            Route::Ticket(_) => "ticket",
            Route::Summary(_) => "summary",
        }
    }
}

/// Digits only; `u64::from_str` alone would also take a leading `+`.
fn parse_id(segment: &str) -> Result<TicketId, ApiError> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::NotFound);
    }
    segment.parse().map_err(|_| ApiError::NotFound)
}

/// Caller-facing service: checks the access key, then serves the ticket and summary views.
#[derive(Clone)]
pub struct GatewayService {
    access_key: Arc<str>,
    aggregator: Aggregator,
}

impl GatewayService {
    pub fn new(access_key: &str, aggregator: Aggregator) -> Self {
        Self {
            access_key: access_key.into(),
            aggregator,
        }
    }

    pub async fn handle<B>(&self, req: Request<B>) -> Response<ResponseBody> {
        let start = Instant::now();

        let route = self
            .authenticate(&req)
            .and_then(|()| Route::parse(req.method(), req.uri().path()));

        let (route_name, response) = match route {
            Ok(route) => (route.name(), self.dispatch(route).await),
            Err(e) => {
                tracing::warn!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    error = %e,
                    "Rejected request"
                );
                ("none", e.into_response())
            }
        };

        histogram!(
            REQUEST_DURATION,
            "route" => route_name,
            "status" => response.status().as_u16().to_string()
        )
        .record(start.elapsed().as_secs_f64());

        response
    }

    fn authenticate<B>(&self, req: &Request<B>) -> Result<(), ApiError> {
        let provided = req
            .headers()
            .get(ACCESS_KEY_HEADER)
            .map(|v| v.as_bytes())
            .unwrap_or_default();

        let matches: bool = provided.ct_eq(self.access_key.as_bytes()).into();
        if matches && !self.access_key.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }

    async fn dispatch(&self, route: Route) -> Response<ResponseBody> {
        match route {
            Route::Ticket(ticket_id) => match self.aggregator.aggregate(ticket_id).await {
                Ok(ticket) => json_response(StatusCode::OK, &ticket),
                Err(e) => {
                    tracing::error!(ticket_id, error = %e, "Failed to aggregate ticket");
                    json_response(
                        StatusCode::INTERNAL_SERVER_ERROR,
                        &ErrorBody {
                            error: TICKET_ERROR_MESSAGE,
                        },
                    )
                }
            },
            Route::Summary(ticket_id) => match self.aggregator.aggregate(ticket_id).await {
                Ok(ticket) => {
                    let summary = format_summary(&ticket);
                    html_response(StatusCode::OK, render_summary_page(&summary))
                }
                Err(e) => {
                    tracing::error!(ticket_id, error = %e, "Failed to build ticket summary");
                    text_response(StatusCode::INTERNAL_SERVER_ERROR, SUMMARY_ERROR_MESSAGE)
                }
            },
        }
    }
}

impl Service<Request<Incoming>> for GatewayService {
    type Response = Response<ResponseBody>;
    type Error = Infallible;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move { Ok(service.handle(req).await) })
    }
}
