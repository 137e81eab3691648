use std::path::PathBuf;

use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;

pub mod auth;
pub mod db;
pub mod error;
pub mod filters;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod serializers;

use notify::TodoEvent;

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct AppState {
    pub db_path: PathBuf,
    pub events: broadcast::Sender<TodoEvent>,
}

pub fn app(db_path: PathBuf) -> Router {
    let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
    let state = AppState { db_path, events };

    Router::new()
        .route(
            "/todo_api/",
            get(handlers::list_todos).post(handlers::create_todo),
        )
        .route(
            "/todo_api/:id/",
            get(handlers::retrieve_todo)
                .put(handlers::update_todo)
                .delete(handlers::delete_todo),
        )
        .route("/socket/todos/", get(notify::subscribe))
        .with_state(state)
}
