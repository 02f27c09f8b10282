use crate::server::{Result, ServerError, ServerRouter, json::Json};
use axum::{Router, extract::State};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use voices_common::model::topic::{Topic, TopicId};
use voices_store::content::{ContentStore, catalogue::Catalogue};

type SharedContent = State<Arc<Mutex<Catalogue>>>;

pub fn routes() -> ServerRouter {
    Router::new().typed_get(list_topics).typed_get(get_topic)
}

#[derive(TypedPath)]
#[typed_path("/topics")]
struct TopicsPath;

#[derive(TypedPath, Deserialize)]
#[typed_path("/topics/{topic}", rejection(ServerError))]
struct TopicPath {
    topic: TopicId,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
struct TopicView {
    #[serde(flatten)]
    topic: Topic,
    post_count: usize,
}

impl TopicView {
    fn new(store: &ContentStore) -> Self {
        Self {
            topic: store.topic().clone(),
            post_count: store.list_posts().len(),
        }
    }
}

async fn list_topics(_: TopicsPath, State(content): SharedContent) -> Json<Vec<TopicView>> {
    let content = content.lock().await;

    Json(content.stores().map(TopicView::new).collect())
}

async fn get_topic(
    TopicPath { topic }: TopicPath,
    State(content): SharedContent,
) -> Result<Json<TopicView>> {
    let content = content.lock().await;

    Ok(Json(TopicView::new(content.store(topic)?)))
}
