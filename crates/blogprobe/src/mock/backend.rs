//! HTTP backend for the mock application.
//!
//! Serves the testing API the seed client talks to:
//!
//! | Method | Path                  | Status        |
//! |--------|-----------------------|---------------|
//! | POST   | `/api/testing/reset`  | 204           |
//! | POST   | `/api/users`          | 201 / 400     |
//! | GET    | `/api/users`          | 200           |
//! | GET    | `/api/blogs`          | 200           |

use super::store::{Blog, BlogStore, SharedStore, StoreError, User};
use crate::result::ProbeResult;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Running mock backend, stopped on drop
#[derive(Debug)]
pub struct MockBackend {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral localhost port and serve `store`
    ///
    /// # Errors
    ///
    /// Returns error if the port cannot be bound
    pub async fn spawn(store: SharedStore) -> ProbeResult<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let (shutdown, stopped) = oneshot::channel::<()>();
        let app = router(store);
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = stopped.await;
            });
            if let Err(e) = server.await {
                tracing::warn!(error = %e, "mock backend stopped with error");
            }
        });
        tracing::debug!(%addr, "mock backend listening");
        Ok(Self {
            addr,
            shutdown: Some(shutdown),
            task,
        })
    }

    /// Base URL, e.g. `http://127.0.0.1:40123`
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task.abort();
    }
}

/// Router over a shared store
pub fn router(store: SharedStore) -> Router {
    Router::new()
        .route("/api/testing/reset", post(reset))
        .route("/api/users", post(create_user).get(list_users))
        .route("/api/blogs", get(list_blogs))
        .with_state(store)
}

#[derive(Debug, Deserialize)]
struct UserPayload {
    #[serde(default)]
    username: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    password: String,
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Poisoned => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::BlogNotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingField(_) | Self::TooShort { .. } | Self::DuplicateUsername => {
                StatusCode::BAD_REQUEST
            }
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

async fn reset(State(store): State<SharedStore>) -> Result<StatusCode, StoreError> {
    BlogStore::lock(&store)?.reset();
    tracing::debug!("mock backend reset");
    Ok(StatusCode::NO_CONTENT)
}

async fn create_user(
    State(store): State<SharedStore>,
    Json(payload): Json<UserPayload>,
) -> Result<(StatusCode, Json<User>), StoreError> {
    let mut store = BlogStore::lock(&store)?;
    let user = store
        .create_user(User::new(payload.username, payload.name, payload.password))?
        .clone();
    Ok((StatusCode::CREATED, Json(user)))
}

async fn list_users(State(store): State<SharedStore>) -> Result<Json<Vec<User>>, StoreError> {
    Ok(Json(BlogStore::lock(&store)?.users().to_vec()))
}

async fn list_blogs(State(store): State<SharedStore>) -> Result<Json<Vec<Blog>>, StoreError> {
    Ok(Json(BlogStore::lock(&store)?.blogs_by_likes()))
}
