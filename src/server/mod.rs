pub mod routes;

use anyhow::{Context, Result};
use http_body_util::{BodyExt, Limited};
use hyper::{body::Incoming, server::conn::http1, service::service_fn, Request, StatusCode};
use hyper_util::rt::TokioIo;
use std::{convert::Infallible, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use crate::app::App;
use self::routes::{error_response, route, HttpResponse};

const MAX_BODY_BYTES: usize = 64 * 1024;

async fn handle(app: Arc<App>, timeout: Duration, req: Request<Incoming>) -> Result<HttpResponse, Infallible> {
    let (parts, body) = req.into_parts();
    let bytes = match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            return Ok(error_response(
                StatusCode::BAD_REQUEST,
                format!("Failed to read request body: {e}"),
            ))
        }
    };
    debug!("{} {}", parts.method, parts.uri.path());
    Ok(route(&app, timeout, &parts.method, parts.uri.path(), &bytes).await)
}

/// Serves the recommendation API until Ctrl-C.
pub async fn serve(app: Arc<App>, addr: &str, timeout: Duration) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!("Accept failed: {e}");
                        continue;
                    }
                };
                let app = app.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(app.clone(), timeout, req));
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await
                    {
                        debug!("Connection from {peer} ended with error: {e}");
                    }
                });
            }
            _ = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}
