//! Axum web server with WebSocket streaming for trace playback.

use std::sync::Arc;

use algoviz_playback::PlaybackSnapshot;
use algoviz_trace::{presets, Algorithm, Step};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::error::Error;
use crate::session::{Control, SessionHandle, SessionState};

/// Shared application state.
pub struct AppState {
    session: SessionHandle,
}

/// Visualization server.
pub struct VisServer {
    state: Arc<AppState>,
}

impl VisServer {
    /// Create a server in front of a running session.
    pub fn new(session: SessionHandle) -> Self {
        Self {
            state: Arc::new(AppState { session }),
        }
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/api/status", get(status_handler))
            .route("/api/algorithms", get(algorithms_handler))
            .route("/api/trace", post(trace_handler))
            .route("/api/step", get(step_handler))
            // Playback
            .route("/api/playback", get(playback_status_handler))
            .route("/api/playback/play", post(play_handler))
            .route("/api/playback/pause", post(pause_handler))
            .route("/api/playback/reset", post(reset_handler))
            .route("/api/playback/step", post(step_playback_handler))
            .route("/api/playback/speed", post(speed_handler))
            .route("/api/playback/seek", post(seek_handler))
            // WebSocket for real-time updates
            .route("/ws", get(ws_handler))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Run the server on the given port.
    pub async fn serve(self, port: u16) -> Result<(), std::io::Error> {
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Visualization server running on http://localhost:{}", port);
        axum::serve(listener, self.router()).await
    }
}

/// Error body for every failed request.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Trace(algoviz_trace::Error::Validation(_) | algoviz_trace::Error::Json(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::Playback(algoviz_playback::Error::InvalidSpeed(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::Playback(algoviz_playback::Error::InvalidState { .. }) => StatusCode::CONFLICT,
            Error::Closed => StatusCode::SERVICE_UNAVAILABLE,
            Error::Trace(_) | Error::Playback(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        debug!(%status, error = %self.0, "Request failed");
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Server status response.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    algorithm: Algorithm,
    step_count: usize,
    generation: u64,
}

async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let current = state.session.state();
    Json(StatusResponse {
        status: "ok",
        algorithm: current.algorithm,
        step_count: current.status.len,
        generation: current.generation,
    })
}

#[derive(Serialize)]
struct AlgorithmInfo {
    name: Algorithm,
    title: &'static str,
}

async fn algorithms_handler() -> Json<Vec<AlgorithmInfo>> {
    Json(
        Algorithm::ALL
            .into_iter()
            .map(|name| AlgorithmInfo {
                name,
                title: name.title(),
            })
            .collect(),
    )
}

#[derive(Deserialize)]
struct TraceRequest {
    algorithm: Algorithm,
    /// Problem instance; the built-in demo when absent.
    #[serde(default)]
    input: Option<serde_json::Value>,
}

async fn trace_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TraceRequest>,
) -> ApiResult<SessionState> {
    Ok(Json(load(&state, req.algorithm, req.input).await?))
}

async fn load(
    state: &AppState,
    algorithm: Algorithm,
    input: Option<serde_json::Value>,
) -> Result<SessionState, Error> {
    match input {
        Some(input) => state.session.load_json(algorithm, input).await,
        None => state.session.load(presets::demo(algorithm)).await,
    }
}

async fn step_handler(State(state): State<Arc<AppState>>) -> Json<Step> {
    Json(state.session.state().step)
}

/// Playback state with derived progress.
#[derive(Serialize)]
struct PlaybackResponse {
    #[serde(flatten)]
    snapshot: PlaybackSnapshot,
    progress: f64,
}

impl From<PlaybackSnapshot> for PlaybackResponse {
    fn from(snapshot: PlaybackSnapshot) -> Self {
        Self {
            progress: snapshot.progress(),
            snapshot,
        }
    }
}

async fn control(state: &AppState, control: Control) -> ApiResult<PlaybackResponse> {
    let snapshot = state.session.control(control).await?;
    Ok(Json(snapshot.into()))
}

async fn playback_status_handler(State(state): State<Arc<AppState>>) -> Json<PlaybackResponse> {
    Json(state.session.state().status.into())
}

async fn play_handler(State(state): State<Arc<AppState>>) -> ApiResult<PlaybackResponse> {
    control(&state, Control::Play).await
}

async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult<PlaybackResponse> {
    control(&state, Control::Pause).await
}

async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult<PlaybackResponse> {
    control(&state, Control::Reset).await
}

#[derive(Deserialize)]
#[serde(rename_all = "lowercase")]
enum Direction {
    Forward,
    Backward,
}

#[derive(Deserialize)]
struct StepRequest {
    direction: Direction,
}

async fn step_playback_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StepRequest>,
) -> ApiResult<PlaybackResponse> {
    let command = match req.direction {
        Direction::Forward => Control::StepForward,
        Direction::Backward => Control::StepBackward,
    };
    control(&state, command).await
}

#[derive(Deserialize)]
struct SpeedRequest {
    speed_ms: u64,
}

async fn speed_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SpeedRequest>,
) -> ApiResult<PlaybackResponse> {
    control(&state, Control::Speed { speed_ms: req.speed_ms }).await
}

#[derive(Deserialize)]
struct SeekRequest {
    index: usize,
}

async fn seek_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SeekRequest>,
) -> ApiResult<PlaybackResponse> {
    control(&state, Control::Seek { index: req.index }).await
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
    let mut updates = state.session.subscribe();

    // Send the current state before streaming changes
    let current = updates.borrow_and_update().clone();
    if send(&mut socket, &WsResponse::State(current)).await.is_err() {
        return;
    }

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = updates.borrow_and_update().clone();
                if send(&mut socket, &WsResponse::State(current)).await.is_err() {
                    break;
                }
            }
            msg = socket.recv() => match msg {
                Some(Ok(Message::Text(text))) => {
                    let response = match serde_json::from_str::<WsCommand>(text.as_str()) {
                        Ok(cmd) => handle_ws_command(&state, cmd).await,
                        Err(err) => WsResponse::Error { message: err.to_string() },
                    };
                    if send(&mut socket, &response).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            }
        }
    }
}

async fn send(socket: &mut WebSocket, response: &WsResponse) -> Result<(), axum::Error> {
    match serde_json::to_string(response) {
        Ok(json) => socket.send(Message::Text(json.into())).await,
        Err(err) => {
            debug!(error = %err, "Failed to encode WebSocket response");
            Ok(())
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetState,
    Load {
        algorithm: Algorithm,
        #[serde(default)]
        input: Option<serde_json::Value>,
    },
    Play,
    Pause,
    Reset,
    StepForward,
    StepBackward,
    Speed { speed_ms: u64 },
    Seek { index: usize },
}

impl WsCommand {
    /// The playback command this maps to, if any.
    fn control(&self) -> Option<Control> {
        match *self {
            WsCommand::GetState | WsCommand::Load { .. } => None,
            WsCommand::Play => Some(Control::Play),
            WsCommand::Pause => Some(Control::Pause),
            WsCommand::Reset => Some(Control::Reset),
            WsCommand::StepForward => Some(Control::StepForward),
            WsCommand::StepBackward => Some(Control::StepBackward),
            WsCommand::Speed { speed_ms } => Some(Control::Speed { speed_ms }),
            WsCommand::Seek { index } => Some(Control::Seek { index }),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsResponse {
    State(SessionState),
    Playback(PlaybackResponse),
    Error { message: String },
}

async fn handle_ws_command(state: &AppState, cmd: WsCommand) -> WsResponse {
    let result = match (cmd.control(), cmd) {
        (Some(control), _) => state
            .session
            .control(control)
            .await
            .map(|snapshot| WsResponse::Playback(snapshot.into())),
        (None, WsCommand::Load { algorithm, input }) => {
            load(state, algorithm, input).await.map(WsResponse::State)
        }
        (None, _) => Ok(WsResponse::State(state.session.state())),
    };
    result.unwrap_or_else(|err| WsResponse::Error {
        message: err.to_string(),
    })
}
