//! HTTP front end: a tokio accept loop around one shared [`Playground`].
//!
//! Each request runs on the blocking pool while holding the playground lock,
//! so endpoints never interleave.

pub mod http;

pub use http::{read_request, Method, Request, Response, Route};

use crate::config::{PlaygroundConfig, ServerConfig};
use crate::error::Result;
use crate::service::{
    AddPointRequest, Playground, ResetRequest, TrainRequest, UpdateNoiseRequest,
};
use log::{debug, info, warn};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::{signal, task, time};

pub type SharedPlayground = Arc<Mutex<Playground>>;

/// Per-connection bounds on what a peer may send and how long it may take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConnectionLimits {
    pub max_body: usize,
    pub read_timeout: Duration,
}

impl From<&ServerConfig> for ConnectionLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            max_body: config.max_body_bytes,
            read_timeout: config.read_timeout,
        }
    }
}

impl Default for ConnectionLimits {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

/// Binds `config.bind_addr()` and serves until Ctrl-C.
pub async fn run(config: ServerConfig, playground_config: PlaygroundConfig) -> Result<()> {
    let playground_config = playground_config.with_train_timeout(Some(config.train_timeout));
    let playground = Arc::new(Mutex::new(Playground::from_seed(
        playground_config,
        config.seed,
    )));

    let listener = TcpListener::bind(config.bind_addr()).await?;
    info!("playground listening on {}", listener.local_addr()?);

    tokio::select! {
        res = serve(listener, playground, ConnectionLimits::from(&config)) => res,
        _ = signal::ctrl_c() => {
            info!("shutting down");
            Ok(())
        }
    }
}

/// Accepts connections forever, one task per connection.
pub async fn serve(
    listener: TcpListener,
    playground: SharedPlayground,
    limits: ConnectionLimits,
) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let playground = Arc::clone(&playground);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, playground, limits).await {
                warn!("connection from {peer} failed: {e}");
            }
        });
    }
}

async fn handle_connection(
    stream: TcpStream,
    playground: SharedPlayground,
    limits: ConnectionLimits,
) -> Result<()> {
    let mut stream = BufReader::new(stream);
    let read = time::timeout(
        limits.read_timeout,
        read_request(&mut stream, limits.max_body),
    )
    .await;
    let response = match read {
        Ok(Ok(Some(request))) => dispatch(playground, request).await,
        Ok(Ok(None)) => return Ok(()),
        Err(_) => {
            warn!("request not received within {:?}", limits.read_timeout);
            Response::request_timeout()
        }
        Ok(Err(e)) => {
            warn!("rejected request: {e}");
            Response::error(&e)
        }
    };
    response.write_to(stream.get_mut()).await?;
    Ok(())
}

/// Routes a parsed request and renders the outcome, errors included.
pub async fn dispatch(playground: SharedPlayground, request: Request) -> Response {
    let route = match Route::resolve(&request.method, &request.path) {
        Ok(Some(route)) => route,
        Ok(None) => {
            debug!("no route for {:?} {}", request.method, request.path);
            return Response::route_not_found(&request.path);
        }
        Err(e) => return Response::error(&e),
    };
    if route == Route::Preflight {
        return Response::no_content();
    }

    debug!("{:?} {}", request.method, request.path);
    let body = request.body;
    let outcome = task::spawn_blocking(move || {
        let mut playground = playground.lock();
        execute(&mut playground, route, &body)
    })
    .await;

    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(e)) => {
            warn!("{} failed: {e}", request.path);
            Response::error(&e)
        }
        Err(join) => {
            warn!("{} panicked: {join}", request.path);
            Response::error(&crate::error::PlaygroundError::Io(std::io::Error::other(
                join.to_string(),
            )))
        }
    }
}

fn execute(playground: &mut Playground, route: Route, body: &[u8]) -> Result<Response> {
    match route {
        Route::Points => Response::json(200, &playground.points()),
        Route::AddPoint => {
            let req: AddPointRequest = parse_body(body)?;
            Response::json(200, &playground.add_point(req))
        }
        Route::DeletePoint(id) => Response::json(200, &playground.delete_point(id)?),
        Route::DeleteLastPoint => Response::json(200, &playground.delete_last_point()),
        Route::ResetPoints => {
            let req: ResetRequest = parse_body(body)?;
            Response::json(200, &playground.reset_points(req)?)
        }
        Route::UpdateNoise => {
            let req: UpdateNoiseRequest = parse_body(body)?;
            Response::json(200, &playground.update_noise(req)?)
        }
        Route::TrainModel => {
            let req: TrainRequest = parse_body(body)?;
            Response::json(200, &playground.train_model(req)?)
        }
        Route::Preflight => Ok(Response::no_content()),
    }
}

/// An empty body reads as `{}`.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ErrorResponse;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn shared(points: usize) -> SharedPlayground {
        let config = PlaygroundConfig {
            initial_points: points,
            ..Default::default()
        };
        Arc::new(Mutex::new(Playground::new(config, StdRng::seed_from_u64(1))))
    }

    fn request(method: Method, path: &str, body: &str) -> Request {
        Request {
            method,
            path: path.to_string(),
            body: body.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_dispatch_add_and_list() {
        let pg = shared(0);
        let resp = dispatch(pg.clone(), request(Method::Post, "/add_point", r#"{"x":1,"y":2}"#)).await;
        assert_eq!(resp.status, 200);

        let resp = dispatch(pg.clone(), request(Method::Get, "/points", "")).await;
        let body: serde_json::Value = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(body["points"][0]["id"], 1);
        assert_eq!(body["points"][0]["y"], 2.0);
    }

    #[tokio::test]
    async fn test_dispatch_error_statuses() {
        let pg = shared(3);
        let resp = dispatch(pg.clone(), request(Method::Delete, "/delete_point/77", "")).await;
        assert_eq!(resp.status, 404);
        let err: ErrorResponse = serde_json::from_slice(&resp.body).unwrap();
        assert_eq!(err.error, "not_found");

        let resp = dispatch(pg.clone(), request(Method::Post, "/add_point", "{nope")).await;
        assert_eq!(resp.status, 400);

        let resp = dispatch(
            pg.clone(),
            request(Method::Post, "/train_model", r#"{"iterations": 0}"#),
        )
        .await;
        assert_eq!(resp.status, 400);

        let resp = dispatch(pg.clone(), request(Method::Get, "/nowhere", "")).await;
        assert_eq!(resp.status, 404);

        let resp = dispatch(pg, request(Method::Options, "/train_model", "")).await;
        assert_eq!(resp.status, 204);
    }

    #[tokio::test]
    async fn test_empty_body_uses_defaults() {
        let pg = shared(3);
        let resp = dispatch(pg.clone(), request(Method::Post, "/reset_points", "")).await;
        assert_eq!(resp.status, 200);
        assert_eq!(pg.lock().store().len(), 100);
    }
}
