use time::{Duration, UtcDateTime};
use voices_common::model::{
    VoicesSnowflakeGenerator,
    post::{Comment, CommentContent, Post, PostContent},
    user::AuthorName,
};

struct SamplePost {
    author: &'static str,
    content: &'static str,
    age: Duration,
    like_count: u64,
    comments: &'static [SampleComment],
    owned: bool,
}

struct SampleComment {
    author: &'static str,
    content: &'static str,
    age: Duration,
}

const SAMPLE_POSTS: [SamplePost; 3] = [
    SamplePost {
        author: "Sarah_K",
        content: "I've been dealing with this issue for months. It's so isolating, but finding \
            this community has given me hope. Thank you all for sharing your stories.",
        age: Duration::hours(2),
        like_count: 15,
        comments: &[
            SampleComment {
                author: "Maya_R",
                content: "You're so brave for sharing this. We're here for you! 💜",
                age: Duration::hours(1),
            },
            SampleComment {
                author: "Lisa_M",
                content: "Your story resonates with me so much. Stay strong!",
                age: Duration::minutes(45),
            },
        ],
        owned: false,
    },
    SamplePost {
        author: "Anonymous_User",
        content: "This platform has been a lifeline for me. I never thought I'd find the courage \
            to speak up, but seeing others share their experiences gave me strength.",
        age: Duration::hours(5),
        like_count: 23,
        comments: &[],
        owned: true,
    },
    SamplePost {
        author: "Maria_C",
        content: "To anyone reading this who's going through something similar - you are not \
            alone. There are resources available and people who care. Please reach out.",
        age: Duration::days(1),
        like_count: 42,
        comments: &[SampleComment {
            author: "Priya_S",
            content: "Thank you for this reminder. Sometimes we forget we're not alone.",
            age: Duration::hours(12),
        }],
        owned: false,
    },
];

/// Newest first, dated relative to `now`.
pub(super) fn posts(generator: &mut VoicesSnowflakeGenerator, now: UtcDateTime) -> Vec<Post> {
    SAMPLE_POSTS
        .iter()
        .map(|sample| {
            let created_at = now - sample.age;
            let comments = sample
                .comments
                .iter()
                .map(|comment| {
                    let created_at = now - comment.age;
                    Comment {
                        id: generator.generate_at(created_at).into(),
                        author: AuthorName::new_unchecked(comment.author.to_owned()),
                        content: CommentContent::new_unchecked(comment.content.to_owned()),
                        created_at,
                    }
                })
                .collect();

            Post {
                id: generator.generate_at(created_at).into(),
                author: AuthorName::new_unchecked(sample.author.to_owned()),
                content: PostContent::new_unvalidated(sample.content.to_owned()),
                created_at,
                like_count: sample.like_count,
                comments,
                is_owned_by_current_user: sample.owned,
            }
        })
        .collect()
}
