use axum::{
    Router,
    extract::{
        FromRef, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use json::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, warn};
use voices_common::model::{Id, ValidationError, post::PostMarker};
use voices_store::{
    content::{ContentError, catalogue::Catalogue},
    preferences::{Persisted, PreferenceStore},
    presentation::DocumentClasses,
    storage::FileStorage,
};

mod json;
mod routes;

pub type ServerRouter = Router<ServerState>;

pub type SessionPreferences = PreferenceStore<FileStorage, DocumentClasses>;

/// The preference store and the topic stores of the session. Each lock is
/// held for one whole operation.
#[derive(Clone, Debug, FromRef)]
pub struct ServerState {
    pub preferences: Arc<Mutex<SessionPreferences>>,
    pub content: Arc<Mutex<Catalogue>>,
}

impl ServerState {
    #[must_use]
    pub fn new(preferences: SessionPreferences, content: Catalogue) -> Self {
        Self {
            preferences: Arc::new(Mutex::new(preferences)),
            content: Arc::new(Mutex::new(content)),
        }
    }

    pub async fn flush_preferences(&self) {
        if let Persisted::Degraded(warning) = self.preferences.lock().await.flush() {
            warn!(%warning, "Preferences were not flushed on shutdown");
        }
    }
}

pub fn routes() -> ServerRouter {
    routes::routes().fallback(fallback)
}

pub async fn fallback(request: Request) -> ServerError {
    ServerError::UnknownRoute(request.into_parts().0.uri)
}

pub type Result<T, E = ServerError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Unknown route requested: {0}")]
    UnknownRoute(Uri),
    #[error("Path rejected: {0}")]
    PathRejection(#[from] PathRejection),
    #[error("Incoming JSON rejected: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("JSON response could not be serialized: {0}")]
    JsonResponse(#[from] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("Post with id {0} was not found.")]
    PostByIdNotFound(Id<PostMarker>),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::UnknownRoute(_)
            | ServerError::PathRejection(_)
            | ServerError::PostByIdNotFound(_)
            | ServerError::Content(
                ContentError::PostNotFound(_) | ContentError::TopicNotFound(_),
            ) => StatusCode::NOT_FOUND,
            ServerError::JsonRejection(_)
            | ServerError::Validation(_)
            | ServerError::Content(ContentError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServerError::Content(ContentError::Unauthorized(_)) => StatusCode::FORBIDDEN,
            ServerError::Content(ContentError::NotEditing(_)) => StatusCode::CONFLICT,
            ServerError::JsonResponse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
struct ErrorResponse {
    status: u16,
    message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();

        error!(error = %self, %status, "Replying with error");

        let error_response = ErrorResponse {
            status: status.as_u16(),
            message: self.to_string(),
        };
        (status, Json(error_response)).into_response()
    }
}
