//! Posts and comments held for the current session, one store per topic.
//!
//! Posts are kept newest first. Only posts owned by the current user can be
//! edited or deleted; liking and commenting are open to every post.

pub mod catalogue;
mod sample;

use std::collections::HashMap;
use thiserror::Error;
use time::UtcDateTime;
use tracing::debug;
use voices_common::model::{
    Id, ValidationError, VoicesSnowflakeGenerator,
    post::{Comment, CommentContent, Post, PostContent, PostMarker},
    share::ShareData,
    topic::{Topic, TopicId},
    user::AuthorName,
};

pub const SHARE_SNIPPET_LEN: usize = 100;
pub const SHARE_ELLIPSIS: &str = "...";

pub type Result<T, E = ContentError> = std::result::Result<T, E>;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ContentError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Post with id {0} does not exist or is not owned by the current user.")]
    Unauthorized(Id<PostMarker>),
    #[error("Post with id {0} was not found.")]
    PostNotFound(Id<PostMarker>),
    #[error("Post with id {0} is not being edited.")]
    NotEditing(Id<PostMarker>),
    #[error("Topic with id {0} does not exist.")]
    TopicNotFound(TopicId),
}

#[derive(Clone, Debug)]
pub struct ContentStore {
    topic: Topic,
    share_base_url: String,
    posts: Vec<Post>,
    drafts: HashMap<Id<PostMarker>, String>,
    snowflake_generator: VoicesSnowflakeGenerator,
}

impl ContentStore {
    #[must_use]
    pub fn new(topic: Topic, share_base_url: impl Into<String>) -> Self {
        Self {
            topic,
            share_base_url: share_base_url.into(),
            posts: Vec::new(),
            drafts: HashMap::new(),
            snowflake_generator: VoicesSnowflakeGenerator::new(),
        }
    }

    /// A store seeded with the community stories shown to a fresh session.
    #[must_use]
    pub fn with_sample_posts(topic: Topic, share_base_url: impl Into<String>) -> Self {
        let mut store = Self::new(topic, share_base_url);
        store.posts = sample::posts(&mut store.snowflake_generator, UtcDateTime::now());
        store
    }

    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Newest first, as of this call.
    #[must_use]
    pub fn list_posts(&self) -> &[Post] {
        &self.posts
    }

    #[must_use]
    pub fn post(&self, post_id: Id<PostMarker>) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == post_id)
    }

    pub fn create_post(&mut self, content: impl Into<String>) -> Result<&Post> {
        let content = PostContent::new(content.into()).map_err(ValidationError::from)?;

        let created_at = UtcDateTime::now();
        let post = Post {
            id: self.snowflake_generator.generate_at(created_at).into(),
            author: AuthorName::current_user(),
            content,
            created_at,
            like_count: 0,
            comments: Vec::new(),
            is_owned_by_current_user: true,
        };
        debug!(post_id = %post.id, "Created post");

        self.posts.insert(0, post);
        Ok(&self.posts[0])
    }

    /// Removes an owned post together with its comments and any pending edit.
    pub fn delete_post(&mut self, post_id: Id<PostMarker>) -> Result<Post> {
        let index = self.owned_index(post_id)?;
        self.drafts.remove(&post_id);

        let post = self.posts.remove(index);
        debug!(%post_id, comments = post.comments.len(), "Deleted post");
        Ok(post)
    }

    /// Stages the current content as the draft and returns it.
    pub fn begin_edit(&mut self, post_id: Id<PostMarker>) -> Result<&str> {
        let index = self.owned_index(post_id)?;
        let content = self.posts[index].content.get().to_owned();
        debug!(%post_id, "Began editing post");

        Ok(self
            .drafts
            .entry(post_id)
            .insert_entry(content)
            .into_mut()
            .as_str())
    }

    /// Replaces the content of a post being edited.
    ///
    /// The new content is taken as is. Emptiness and length are only checked
    /// when a post is created.
    pub fn commit_edit(
        &mut self,
        post_id: Id<PostMarker>,
        new_content: impl Into<String>,
    ) -> Result<&Post> {
        let index = self.owned_index(post_id)?;
        if self.drafts.remove(&post_id).is_none() {
            return Err(ContentError::NotEditing(post_id));
        }

        let post = &mut self.posts[index];
        post.content = PostContent::new_unvalidated(new_content.into());
        debug!(%post_id, "Committed post edit");
        Ok(&*post)
    }

    pub fn cancel_edit(&mut self, post_id: Id<PostMarker>) -> Result<()> {
        if self.drafts.remove(&post_id).is_none() {
            return Err(ContentError::NotEditing(post_id));
        }

        debug!(%post_id, "Cancelled post edit");
        Ok(())
    }

    #[must_use]
    pub fn draft(&self, post_id: Id<PostMarker>) -> Option<&str> {
        self.drafts.get(&post_id).map(String::as_str)
    }

    #[must_use]
    pub fn is_editing(&self, post_id: Id<PostMarker>) -> bool {
        self.drafts.contains_key(&post_id)
    }

    /// Adds one like. Repeated calls keep counting.
    pub fn like_post(&mut self, post_id: Id<PostMarker>) -> Result<u64> {
        let post = self
            .posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or(ContentError::PostNotFound(post_id))?;

        post.like_count = post.like_count.saturating_add(1);
        debug!(%post_id, like_count = post.like_count, "Liked post");
        Ok(post.like_count)
    }

    pub fn add_comment(
        &mut self,
        post_id: Id<PostMarker>,
        content: impl Into<String>,
    ) -> Result<&Comment> {
        let content = CommentContent::new(content.into()).map_err(ValidationError::from)?;
        let post = self
            .posts
            .iter_mut()
            .find(|post| post.id == post_id)
            .ok_or(ContentError::PostNotFound(post_id))?;

        let created_at = UtcDateTime::now();
        let comment = Comment {
            id: self.snowflake_generator.generate_at(created_at).into(),
            author: AuthorName::current_user(),
            content,
            created_at,
        };
        debug!(%post_id, comment_id = %comment.id, "Added comment");

        let index = post.comments.len();
        post.comments.push(comment);
        Ok(&post.comments[index])
    }

    /// Title, snippet and link for handing a post to a sharing surface.
    #[must_use]
    pub fn compose_share_text(&self, post: &Post) -> ShareData {
        ShareData {
            title: format!("Story from {}", self.topic.title),
            text: format!(
                "{}{SHARE_ELLIPSIS}",
                post.content.prefix(SHARE_SNIPPET_LEN)
            ),
            url: self.post_url(post.id),
        }
    }

    #[must_use]
    pub fn post_url(&self, post_id: Id<PostMarker>) -> String {
        format!(
            "{}/topics/{}/posts/{post_id}",
            self.share_base_url.trim_end_matches('/'),
            self.topic.id
        )
    }

    fn owned_index(&self, post_id: Id<PostMarker>) -> Result<usize> {
        self.posts
            .iter()
            .position(|post| post.id == post_id && post.is_owned_by_current_user)
            .ok_or(ContentError::Unauthorized(post_id))
    }
}

#[cfg(test)]
mod tests {
    use crate::content::{ContentError, ContentStore, SHARE_SNIPPET_LEN};
    use voices_common::model::{
        Id, ValidationError,
        post::{InvalidContentError, POST_CONTENT_MAX_LEN, PostMarker},
        topic::{Topic, TopicId},
    };

    fn topic() -> Topic {
        Topic {
            id: TopicId::new(3),
            title: "Workplace Harassment".to_owned(),
            description: "Stories from the office.".to_owned(),
            category: "Work".to_owned(),
        }
    }

    fn store() -> ContentStore {
        ContentStore::new(topic(), "https://voices.example/")
    }

    fn sample_store() -> ContentStore {
        ContentStore::with_sample_posts(topic(), "https://voices.example")
    }

    fn foreign_post(store: &ContentStore) -> Id<PostMarker> {
        store
            .list_posts()
            .iter()
            .find(|post| !post.is_owned_by_current_user)
            .unwrap()
            .id
    }

    const EMPTY: ContentError =
        ContentError::Validation(ValidationError::Content(InvalidContentError::Empty));

    #[test]
    fn create_post_rejects_blank_content() {
        let mut store = store();

        assert_eq!(store.create_post("").unwrap_err(), EMPTY);
        assert_eq!(store.create_post("   ").unwrap_err(), EMPTY);
        assert!(store.list_posts().is_empty());
    }

    #[test]
    fn create_post_rejects_overlong_content() {
        let mut store = store();

        assert!(matches!(
            store.create_post("a".repeat(POST_CONTENT_MAX_LEN + 1)),
            Err(ContentError::Validation(ValidationError::Content(
                InvalidContentError::TooLong { .. }
            )))
        ));
        assert!(store.list_posts().is_empty());
    }

    #[test]
    fn create_post_prepends_owned_post() {
        let mut store = sample_store();
        let before = store.list_posts().len();

        let post = store.create_post("hello").unwrap().clone();

        assert_eq!(store.list_posts().len(), before + 1);
        assert_eq!(store.list_posts()[0], post);
        assert_eq!(post.content.get(), "hello");
        assert_eq!(post.author.get(), "You");
        assert_eq!(post.like_count, 0);
        assert!(post.comments.is_empty());
        assert!(post.is_owned_by_current_user);
    }

    #[test]
    fn newest_post_comes_first() {
        let mut store = store();
        let first = store.create_post("first").unwrap().id;
        let second = store.create_post("second").unwrap().id;

        let ids: Vec<_> = store.list_posts().iter().map(|post| post.id).collect();
        assert_eq!(ids, [second, first]);
        assert_ne!(first, second);
    }

    #[test]
    fn delete_foreign_post_is_unauthorized() {
        let mut store = sample_store();
        let before = store.list_posts().to_vec();
        let post_id = foreign_post(&store);

        assert_eq!(
            store.delete_post(post_id),
            Err(ContentError::Unauthorized(post_id))
        );
        assert_eq!(store.list_posts(), before.as_slice());
    }

    #[test]
    fn delete_missing_post_is_unauthorized() {
        let mut store = store();
        let post_id = Id::from(42);

        assert_eq!(
            store.delete_post(post_id),
            Err(ContentError::Unauthorized(post_id))
        );
    }

    #[test]
    fn delete_owned_post_removes_only_it() {
        let mut store = sample_store();
        let post_id = store.create_post("mine").unwrap().id;
        let others = store.list_posts()[1..].to_vec();

        assert_eq!(store.delete_post(post_id).unwrap().id, post_id);
        assert_eq!(store.list_posts(), others.as_slice());
        assert!(store.post(post_id).is_none());
    }

    #[test]
    fn like_post_counts_every_call() {
        let mut store = sample_store();
        let post_id = foreign_post(&store);
        let before = store.post(post_id).unwrap().like_count;

        for _ in 0..5 {
            store.like_post(post_id).unwrap();
        }

        assert_eq!(store.post(post_id).unwrap().like_count, before + 5);
        assert_eq!(
            store.like_post(Id::from(1)),
            Err(ContentError::PostNotFound(Id::from(1)))
        );
    }

    #[test]
    fn add_comment() {
        let mut store = store();
        let post_id = store.create_post("story").unwrap().id;

        assert_eq!(store.add_comment(post_id, "").unwrap_err(), EMPTY);
        assert!(store.post(post_id).unwrap().comments.is_empty());

        store.add_comment(post_id, "nice").unwrap();
        store.add_comment(post_id, "stay strong").unwrap();

        let comments = &store.post(post_id).unwrap().comments;
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].content.get(), "nice");
        assert_eq!(comments[0].author.get(), "You");
        assert_eq!(comments[1].content.get(), "stay strong");
        assert_ne!(comments[0].id, comments[1].id);
    }

    #[test]
    fn add_comment_to_missing_post() {
        let mut store = store();
        let post_id = Id::from(7);

        assert_eq!(
            store.add_comment(post_id, "hello"),
            Err(ContentError::PostNotFound(post_id))
        );
    }

    #[test]
    fn edit_lifecycle() {
        let mut store = store();
        let post_id = store.create_post("original").unwrap().id;

        assert_eq!(store.begin_edit(post_id).unwrap(), "original");
        assert!(store.is_editing(post_id));
        assert_eq!(store.draft(post_id), Some("original"));

        store.cancel_edit(post_id).unwrap();
        assert!(!store.is_editing(post_id));
        assert_eq!(store.post(post_id).unwrap().content.get(), "original");

        store.begin_edit(post_id).unwrap();
        let post = store.commit_edit(post_id, "revised").unwrap();
        assert_eq!(post.content.get(), "revised");
        assert!(!store.is_editing(post_id));
    }

    #[test]
    fn edit_requires_begin() {
        let mut store = store();
        let post_id = store.create_post("original").unwrap().id;

        assert_eq!(
            store.commit_edit(post_id, "revised"),
            Err(ContentError::NotEditing(post_id))
        );
        assert_eq!(
            store.cancel_edit(post_id),
            Err(ContentError::NotEditing(post_id))
        );
        assert_eq!(store.post(post_id).unwrap().content.get(), "original");
    }

    #[test]
    fn edit_foreign_post_is_unauthorized() {
        let mut store = sample_store();
        let post_id = foreign_post(&store);

        assert_eq!(
            store.begin_edit(post_id),
            Err(ContentError::Unauthorized(post_id))
        );
        assert_eq!(
            store.commit_edit(post_id, "hijacked"),
            Err(ContentError::Unauthorized(post_id))
        );
    }

    #[test]
    fn commit_edit_accepts_blank_content() {
        let mut store = store();
        let post_id = store.create_post("original").unwrap().id;

        store.begin_edit(post_id).unwrap();
        assert_eq!(store.commit_edit(post_id, "  ").unwrap().content.get(), "  ");
    }

    #[test]
    fn deleting_post_discards_its_draft() {
        let mut store = store();
        let post_id = store.create_post("original").unwrap().id;

        store.begin_edit(post_id).unwrap();
        store.delete_post(post_id).unwrap();

        assert!(!store.is_editing(post_id));
    }

    #[test]
    fn compose_share_text() {
        let mut store = store();
        let long = "x".repeat(150);
        let post = store.create_post(long).unwrap().clone();

        let share = store.compose_share_text(&post);

        assert_eq!(share.title, "Story from Workplace Harassment");
        assert_eq!(share.text, format!("{}...", "x".repeat(SHARE_SNIPPET_LEN)));
        assert_eq!(
            share.url,
            format!("https://voices.example/topics/3/posts/{}", post.id)
        );

        let short = store.create_post("short story").unwrap().clone();
        assert_eq!(store.compose_share_text(&short).text, "short story...");
        assert_eq!(store.list_posts().len(), 2);
    }

    #[test]
    fn sample_posts() {
        let store = sample_store();
        let posts = store.list_posts();

        assert_eq!(posts.len(), 3);
        assert_eq!(
            posts
                .iter()
                .filter(|post| post.is_owned_by_current_user)
                .count(),
            1
        );
        assert!(posts.windows(2).all(|pair| pair[0].created_at >= pair[1].created_at));
        assert_eq!(posts[0].comments.len(), 2);
    }

    #[test]
    fn deleted_post_leaves_nothing_behind() {
        let mut store = store();

        let post_id = store.create_post("A").unwrap().id;
        store.like_post(post_id).unwrap();
        store.like_post(post_id).unwrap();
        store.add_comment(post_id, "B").unwrap();
        store.delete_post(post_id).unwrap();

        assert!(store.list_posts().is_empty());
        assert!(store.post(post_id).is_none());
        assert_eq!(
            store.like_post(post_id),
            Err(ContentError::PostNotFound(post_id))
        );
    }
}
