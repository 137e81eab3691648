use axum::extract::rejection::QueryRejection;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::auth;
use crate::error::ApiError;
use crate::filters::TodoFilters;
use crate::serializers::TodoOut;
use crate::AppState;

/// Change notification fanned out to `/socket/todos/` subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TodoEvent {
    Created { todo: TodoOut },
    Updated { todo: TodoOut },
    Deleted { id: i64, user: String },
}

impl TodoEvent {
    pub fn owner(&self) -> &str {
        match self {
            TodoEvent::Created { todo } | TodoEvent::Updated { todo } => &todo.user,
            TodoEvent::Deleted { user, .. } => user,
        }
    }

    /// Whether a subscriber holding `filters` should see this event.
    /// Deletions always pass: the subscriber may hold the row.
    fn visible_with(&self, filters: &TodoFilters) -> bool {
        match self {
            TodoEvent::Deleted { .. } => true,
            TodoEvent::Created { todo } | TodoEvent::Updated { todo } => {
                filters.matches(&todo.title, &todo.description, todo.is_completed)
            }
        }
    }
}

/// Subscribes the caller to change events for their own todos, optionally
/// narrowed by the same filters the list endpoint accepts.
pub async fn subscribe(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<TodoFilters>, QueryRejection>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let user = auth::authenticate(&headers)?;
    let Query(filters) = query.map_err(|err| ApiError::MalformedQuery(err.body_text()))?;
    let rx = state.events.subscribe();
    Ok(ws.on_upgrade(move |socket| forward_events(socket, rx, user, filters)))
}

async fn forward_events(
    mut socket: WebSocket,
    mut rx: broadcast::Receiver<TodoEvent>,
    user: String,
    filters: TodoFilters,
) {
    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    if event.owner() != user || !event.visible_with(&filters) {
                        continue;
                    }
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(err) => {
                            tracing::error!(error = %err, "encoding todo event");
                            continue;
                        }
                    };
                    if socket.send(Message::Text(payload)).await.is_err() {
                        return;
                    }
                }
                // slow subscribers skip missed events instead of buffering forever
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, user = %user, "websocket subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return,
            },
            message = socket.recv() => match message {
                Some(Ok(_)) => {} // inbound frames are ignored
                _ => return,      // client went away
            },
        }
    }
}
