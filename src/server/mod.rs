//! HTTP entry point.
//!
//! A plain hyper http1 server: one task per accepted connection, every request
//! routed through [`route`]. Routes:
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | `GET` | `/healthz` | liveness, `ok` |
//! | `POST` | `/regenerate` | rebuild and overwrite the snapshot |
//! | `OPTIONS` | any | CORS preflight |
//! | `GET`/`HEAD` | anything else | cached snapshot, built on a miss |
//!
//! Failures are logged with full detail and answered with an opaque 500.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::header::{self, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{Instrument, error, info, info_span};
use uuid::Uuid;

use crate::constants::SNAPSHOT_CONTENT_TYPE;
use crate::core::RosterError;
use crate::gateway::{Served, SnapshotGateway};

/// Response header reporting whether the snapshot came from the cache.
pub const CACHE_HEADER: &str = "x-roster-cache";

/// Accept connections on `listener` until `shutdown` resolves.
pub async fn run(
    listener: TcpListener,
    gateway: Arc<SnapshotGateway>,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    info!("Listening on {}", listener.local_addr()?);
    tokio::pin!(shutdown);

    loop {
        let (stream, addr) = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("Error accepting connection: {:?}", e);
                    continue;
                }
            },
            () = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
        };

        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move {
            let io = TokioIo::new(stream);
            let service = service_fn(move |req| {
                let gateway = Arc::clone(&gateway);
                async move { handle_request(gateway, addr, req).await }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!("Error serving connection from {}: {:?}", addr, err);
            }
        });
    }
}

async fn handle_request(
    gateway: Arc<SnapshotGateway>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let span = info_span!("request", id = %Uuid::new_v4(), %method, %path);

    async move {
        info!("{} {} from {}", method, path, addr);
        let response = route(&gateway, &method, &path).await;
        info!("{} {} -> {}", method, path, response.status());
        Ok(response)
    }
    .instrument(span)
    .await
}

/// Dispatch one request.
pub async fn route(gateway: &SnapshotGateway, method: &Method, path: &str) -> Response<Full<Bytes>> {
    match (method, path) {
        (&Method::GET, "/healthz") => text_response(StatusCode::OK, "ok"),
        (&Method::OPTIONS, _) => preflight_response(),
        (&Method::POST, "/regenerate") => snapshot_response(gateway.regenerate().await, false),
        (&Method::GET, _) => snapshot_response(gateway.serve().await, false),
        (&Method::HEAD, _) => snapshot_response(gateway.serve().await, true),
        _ => text_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"),
    }
}

fn snapshot_response(result: Result<Served, RosterError>, head: bool) -> Response<Full<Bytes>> {
    match result {
        Ok(served) => {
            let body = if head { Bytes::new() } else { served.body };
            let mut response = response(StatusCode::OK, SNAPSHOT_CONTENT_TYPE, body);
            response
                .headers_mut()
                .insert(CACHE_HEADER, HeaderValue::from_static(served.cache.as_str()));
            response
        }
        Err(e) => {
            error!("Snapshot unavailable: {}", e);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

fn text_response(status: StatusCode, body: &'static str) -> Response<Full<Bytes>> {
    response(status, "text/plain; charset=utf-8", Bytes::from_static(body.as_bytes()))
}

fn response(status: StatusCode, content_type: &'static str, body: Bytes) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// CORS preflight response
fn preflight_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, HEAD, POST, OPTIONS"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{MemoryBlobStore, StaticSnapshotSource};
    use http_body_util::BodyExt;

    fn gateway(store: MemoryBlobStore, source: StaticSnapshotSource) -> SnapshotGateway {
        SnapshotGateway::new(Arc::new(store), Arc::new(source), "snapshots", "committee.html")
    }

    async fn body_of(response: Response<Full<Bytes>>) -> Bytes {
        response.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_snapshot_route_sets_headers() {
        let gateway = gateway(MemoryBlobStore::new(), StaticSnapshotSource::ok("<p>roster</p>"));

        let response = route(&gateway, &Method::GET, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], SNAPSHOT_CONTENT_TYPE);
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[CACHE_HEADER], "miss");
        assert_eq!(body_of(response).await, Bytes::from_static(b"<p>roster</p>"));

        let response = route(&gateway, &Method::GET, "/committee").await;
        assert_eq!(response.headers()[CACHE_HEADER], "hit");
    }

    #[tokio::test]
    async fn test_failure_is_opaque_500() {
        let gateway = gateway(
            MemoryBlobStore::new(),
            StaticSnapshotSource::failing(RosterError::UnknownTeamLabel {
                team: "Board".into(),
            }),
        );

        let response = route(&gateway, &Method::GET, "/").await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(body_of(response).await, Bytes::from_static(b"Internal Server Error"));
    }

    #[tokio::test]
    async fn test_regenerate_and_auxiliary_routes() {
        let store = MemoryBlobStore::new();
        store.insert("snapshots", "committee.html", b"old");
        let gateway = gateway(store, StaticSnapshotSource::ok("new"));

        let response = route(&gateway, &Method::POST, "/regenerate").await;
        assert_eq!(response.headers()[CACHE_HEADER], "regenerated");
        assert_eq!(body_of(response).await, Bytes::from_static(b"new"));

        let response = route(&gateway, &Method::OPTIONS, "/").await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = route(&gateway, &Method::GET, "/healthz").await;
        assert_eq!(body_of(response).await, Bytes::from_static(b"ok"));

        let response = route(&gateway, &Method::DELETE, "/").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = route(&gateway, &Method::HEAD, "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_of(response).await.is_empty());
    }
}
