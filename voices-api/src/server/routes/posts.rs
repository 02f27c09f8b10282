use crate::server::{
    Result, ServerError, ServerRouter,
    json::{Created, Json},
};
use axum::{Router, extract::State, http::StatusCode};
use axum_extra::routing::{RouterExt, TypedPath};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use time::UtcDateTime;
use tokio::sync::Mutex;
use voices_common::{
    model::{
        Id, ValidationError,
        post::{Comment, Post, PostMarker},
        share::{ShareAction, ShareData, ShareTarget},
        topic::TopicId,
    },
    util::relative_label,
};
use voices_store::content::catalogue::Catalogue;

type SharedContent = State<Arc<Mutex<Catalogue>>>;

pub fn routes() -> ServerRouter {
    Router::new()
        .typed_get(list_posts)
        .typed_post(create_post)
        .typed_get(get_post)
        .typed_delete(delete_post)
        .typed_post(begin_edit)
        .typed_put(commit_edit)
        .typed_delete(cancel_edit)
        .typed_post(like_post)
        .typed_post(add_comment)
        .typed_get(share_post)
        .typed_get(share_post_to)
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/topics/{topic}/posts", rejection(ServerError))]
struct PostsPath {
    topic: TopicId,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/topics/{topic}/posts/{id}", rejection(ServerError))]
struct PostPath {
    topic: TopicId,
    id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/topics/{topic}/posts/{id}/edit", rejection(ServerError))]
struct PostEditPath {
    topic: TopicId,
    id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/topics/{topic}/posts/{id}/likes", rejection(ServerError))]
struct PostLikesPath {
    topic: TopicId,
    id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/topics/{topic}/posts/{id}/comments", rejection(ServerError))]
struct PostCommentsPath {
    topic: TopicId,
    id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/topics/{topic}/posts/{id}/share", rejection(ServerError))]
struct PostSharePath {
    topic: TopicId,
    id: Id<PostMarker>,
}

#[derive(TypedPath, Deserialize)]
#[typed_path("/topics/{topic}/posts/{id}/share/{target}", rejection(ServerError))]
struct PostShareTargetPath {
    topic: TopicId,
    id: Id<PostMarker>,
    target: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct ContentBody {
    content: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostView {
    #[serde(flatten)]
    post: Post,
    author_initial: Option<char>,
    created_label: String,
    comment_count: usize,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
struct LikesView {
    like_count: u64,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
struct DraftView {
    draft: String,
}

impl PostView {
    fn new(post: &Post, now: UtcDateTime) -> Self {
        Self {
            post: post.clone(),
            author_initial: post.author.initial(),
            created_label: relative_label(post.created_at, now),
            comment_count: post.comment_count(),
        }
    }
}

async fn list_posts(
    PostsPath { topic }: PostsPath,
    State(content): SharedContent,
) -> Result<Json<Vec<PostView>>> {
    let now = UtcDateTime::now();
    let content = content.lock().await;

    Ok(Json(
        content
            .store(topic)?
            .list_posts()
            .iter()
            .map(|post| PostView::new(post, now))
            .collect(),
    ))
}

async fn create_post(
    PostsPath { topic }: PostsPath,
    State(content): SharedContent,
    Json(ContentBody { content: text }): Json<ContentBody>,
) -> Result<Created<PostView>> {
    let mut content = content.lock().await;
    let post = content.store_mut(topic)?.create_post(text)?;

    Ok(Created(PostView::new(post, UtcDateTime::now())))
}

async fn get_post(
    PostPath { topic, id }: PostPath,
    State(content): SharedContent,
) -> Result<Json<PostView>> {
    let content = content.lock().await;
    let post = content
        .store(topic)?
        .post(id)
        .ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(PostView::new(post, UtcDateTime::now())))
}

async fn delete_post(
    PostPath { topic, id }: PostPath,
    State(content): SharedContent,
) -> Result<StatusCode> {
    content.lock().await.store_mut(topic)?.delete_post(id)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn begin_edit(
    PostEditPath { topic, id }: PostEditPath,
    State(content): SharedContent,
) -> Result<Json<DraftView>> {
    let mut content = content.lock().await;
    let draft = content.store_mut(topic)?.begin_edit(id)?.to_owned();

    Ok(Json(DraftView { draft }))
}

async fn commit_edit(
    PostEditPath { topic, id }: PostEditPath,
    State(content): SharedContent,
    Json(ContentBody { content: text }): Json<ContentBody>,
) -> Result<Json<PostView>> {
    let mut content = content.lock().await;
    let post = content.store_mut(topic)?.commit_edit(id, text)?;

    Ok(Json(PostView::new(post, UtcDateTime::now())))
}

async fn cancel_edit(
    PostEditPath { topic, id }: PostEditPath,
    State(content): SharedContent,
) -> Result<StatusCode> {
    content.lock().await.store_mut(topic)?.cancel_edit(id)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn like_post(
    PostLikesPath { topic, id }: PostLikesPath,
    State(content): SharedContent,
) -> Result<Json<LikesView>> {
    let like_count = content.lock().await.store_mut(topic)?.like_post(id)?;

    Ok(Json(LikesView { like_count }))
}

async fn add_comment(
    PostCommentsPath { topic, id }: PostCommentsPath,
    State(content): SharedContent,
    Json(ContentBody { content: text }): Json<ContentBody>,
) -> Result<Created<Comment>> {
    let mut content = content.lock().await;
    let comment = content.store_mut(topic)?.add_comment(id, text)?.clone();

    Ok(Created(comment))
}

async fn share_post(
    PostSharePath { topic, id }: PostSharePath,
    State(content): SharedContent,
) -> Result<Json<ShareData>> {
    let content = content.lock().await;
    let store = content.store(topic)?;
    let post = store.post(id).ok_or(ServerError::PostByIdNotFound(id))?;

    Ok(Json(store.compose_share_text(post)))
}

async fn share_post_to(
    PostShareTargetPath { topic, id, target }: PostShareTargetPath,
    State(content): SharedContent,
) -> Result<Json<ShareAction>> {
    let target = target
        .parse::<ShareTarget>()
        .map_err(ValidationError::from)?;

    let content = content.lock().await;
    let store = content.store(topic)?;
    let post = store.post(id).ok_or(ServerError::PostByIdNotFound(id))?;
    let share_data = store.compose_share_text(post);

    Ok(Json(target.action(&share_data)))
}
