use crate::server::ServerRouter;
use axum::Router;

mod posts;
mod preferences;
mod topics;

pub fn routes() -> ServerRouter {
    Router::new()
        .merge(topics::routes())
        .merge(posts::routes())
        .merge(preferences::routes())
}
