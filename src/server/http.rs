use std::future::{Future, ready};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{ConnectInfo, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::cache::CacheStore;
use crate::foundation::error::ReelResult;
use crate::server::session::{SessionOpts, run_session};

/// Shared by every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Frames served to every session.
    pub store: Arc<CacheStore>,
    /// Settings applied to each new session.
    pub session: SessionOpts,
}

#[derive(Debug, serde::Serialize)]
struct Health {
    status: &'static str,
    frame_count: u64,
}

/// `/play` (websocket sessions), `/health`, and static files from `public_path` for anything else.
pub fn router(store: Arc<CacheStore>, public_path: Option<&Path>, session: SessionOpts) -> Router {
    let mut app = Router::new()
        .route("/play", get(play))
        .route("/health", get(health));
    if let Some(dir) = public_path {
        app = app.fallback_service(ServeDir::new(dir));
    }
    app.with_state(AppState { store, session })
}

/// Serve `app` on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> ReelResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "listening");
    }
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await?;
    Ok(())
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(Health {
        status: "ok",
        frame_count: state.store.size(),
    })
}

async fn play(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| play_session(state, peer, socket))
}

async fn play_session(state: AppState, peer: SocketAddr, socket: WebSocket) {
    tracing::info!(%peer, "session opened");
    let (sink, stream) = socket.split();

    let requests = stream
        .take_while(|msg| ready(!matches!(msg, Ok(Message::Close(_)))))
        .filter_map(|msg| {
            ready(match msg {
                Ok(Message::Text(text)) => Some(Ok(text.as_str().to_owned())),
                Ok(Message::Binary(bytes)) => {
                    Some(Ok(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Ok(_) => None,
                Err(e) => Some(Err(e)),
            })
        });
    let responses =
        sink.with(|text: String| ready(Ok::<_, axum::Error>(Message::Text(text.into()))));

    let stats = run_session(state.store, Box::pin(requests), responses, state.session).await;
    match stats.error {
        Some(error) => tracing::info!(
            %peer,
            requests = stats.requests,
            responses = stats.responses,
            %error,
            "session closed with error"
        ),
        None => tracing::info!(
            %peer,
            requests = stats.requests,
            responses = stats.responses,
            "session closed"
        ),
    }
}
