use crate::content::{ContentError, ContentStore, Result};
use std::collections::BTreeMap;
use tracing::info;
use voices_common::model::topic::{Topic, TopicId};

/// The content stores of every topic, keyed by topic id.
#[derive(Clone, Debug, Default)]
pub struct Catalogue {
    stores: BTreeMap<TopicId, ContentStore>,
}

impl Catalogue {
    pub fn new(
        topics: impl IntoIterator<Item = Topic>,
        share_base_url: &str,
        seed_sample_posts: bool,
    ) -> Self {
        let stores: BTreeMap<_, _> = topics
            .into_iter()
            .map(|topic| {
                let id = topic.id;
                let store = if seed_sample_posts {
                    ContentStore::with_sample_posts(topic, share_base_url)
                } else {
                    ContentStore::new(topic, share_base_url)
                };
                (id, store)
            })
            .collect();
        info!(topics = stores.len(), seed_sample_posts, "Opened topic stores");

        Self { stores }
    }

    /// In topic id order.
    pub fn stores(&self) -> impl Iterator<Item = &ContentStore> {
        self.stores.values()
    }

    pub fn store(&self, topic_id: TopicId) -> Result<&ContentStore> {
        self.stores
            .get(&topic_id)
            .ok_or(ContentError::TopicNotFound(topic_id))
    }

    pub fn store_mut(&mut self, topic_id: TopicId) -> Result<&mut ContentStore> {
        self.stores
            .get_mut(&topic_id)
            .ok_or(ContentError::TopicNotFound(topic_id))
    }
}
