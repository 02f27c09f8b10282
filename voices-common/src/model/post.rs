use crate::{
    model::{Id, user::AuthorName},
    util::serialize_rfc3339,
};
use serde::Serialize;
use std::fmt::{Display, Formatter};
use thiserror::Error;
use time::UtcDateTime;

pub const POST_CONTENT_MAX_LEN: usize = 1000;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct PostMarker;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct CommentMarker;

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Id<PostMarker>,
    pub author: AuthorName,
    pub content: PostContent,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub created_at: UtcDateTime,
    pub like_count: u64,
    pub comments: Vec<Comment>,
    pub is_owned_by_current_user: bool,
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Id<CommentMarker>,
    pub author: AuthorName,
    pub content: CommentContent,
    #[serde(serialize_with = "serialize_rfc3339")]
    pub created_at: UtcDateTime,
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum InvalidContentError {
    #[error("Content is empty")]
    Empty,
    #[error("Content is {len} characters long, at most {max} are allowed")]
    TooLong { len: usize, max: usize },
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct PostContent(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(transparent)]
pub struct CommentContent(String);

fn check_not_blank(content: &str) -> Result<(), InvalidContentError> {
    if content.trim().is_empty() {
        Err(InvalidContentError::Empty)
    } else {
        Ok(())
    }
}

impl PostContent {
    /// Accepts 1 to [`POST_CONTENT_MAX_LEN`] characters that are not all whitespace.
    /// The text is kept as entered, untrimmed.
    pub fn new(content: String) -> Result<Self, InvalidContentError> {
        check_not_blank(&content)?;

        let len = content.chars().count();
        if len > POST_CONTENT_MAX_LEN {
            return Err(InvalidContentError::TooLong {
                len,
                max: POST_CONTENT_MAX_LEN,
            });
        }

        Ok(Self(content))
    }

    /// Skips validation. Edits replace content this way.
    #[must_use]
    pub fn new_unvalidated(content: String) -> Self {
        Self(content)
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }

    /// The first `max_chars` characters, never splitting a character.
    #[must_use]
    pub fn prefix(&self, max_chars: usize) -> &str {
        match self.0.char_indices().nth(max_chars) {
            Some((byte_index, _)) => &self.0[..byte_index],
            None => &self.0,
        }
    }
}

impl CommentContent {
    pub fn new(content: String) -> Result<Self, InvalidContentError> {
        check_not_blank(&content)?;
        Ok(Self(content))
    }

    #[must_use]
    pub fn new_unchecked(content: String) -> Self {
        Self::new(content).expect("Comment content was blank.")
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Display for PostContent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Display for CommentContent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Post {
    #[must_use]
    pub fn comment_count(&self) -> usize {
        self.comments.len()
    }
}
