//! The social problems stories are filed under.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TopicId(u32);

impl TopicId {
    #[must_use]
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl Display for TopicId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub description: String,
    pub category: String,
}

struct CatalogueEntry {
    title: &'static str,
    description: &'static str,
    category: &'static str,
}

const CATALOGUE: [CatalogueEntry; 9] = [
    CatalogueEntry {
        title: "Your Story",
        description: "Share your unique journey, experiences, and insights. Every story matters \
            and can inspire others on their path to empowerment.",
        category: "Personal Journey",
    },
    CatalogueEntry {
        title: "Domestic Violence",
        description: "Support and resources for survivors of domestic violence. Share your \
            story, find strength, and help others on their healing journey.",
        category: "Safety & Support",
    },
    CatalogueEntry {
        title: "Workplace Discrimination",
        description: "Addressing gender inequality, pay gaps, and discrimination in \
            professional environments. Together we can create change.",
        category: "Professional Rights",
    },
    CatalogueEntry {
        title: "Harassment",
        description: "Creating safe spaces to discuss experiences with harassment and finding \
            ways to protect and support each other.",
        category: "Safety & Support",
    },
    CatalogueEntry {
        title: "Education Inequality",
        description: "Breaking barriers to education and supporting women's access to learning \
            opportunities at all levels.",
        category: "Education & Growth",
    },
    CatalogueEntry {
        title: "Period Poverty",
        description: "Addressing the lack of access to menstrual products and breaking the \
            stigma around menstruation.",
        category: "Health & Wellness",
    },
    CatalogueEntry {
        title: "Child Marriage",
        description: "Advocating against child marriage and supporting those affected by this \
            harmful practice.",
        category: "Rights & Protection",
    },
    CatalogueEntry {
        title: "Lack of Legal Support",
        description: "Navigating legal challenges and finding accessible legal resources for \
            women's rights issues.",
        category: "Legal & Rights",
    },
    CatalogueEntry {
        title: "Mental Health",
        description: "Supporting women's mental health and breaking stigmas around seeking help \
            and healing.",
        category: "Health & Wellness",
    },
];

/// Every topic a story can be filed under, numbered from 0 in display order.
#[must_use]
pub fn catalogue() -> Vec<Topic> {
    (0..)
        .zip(&CATALOGUE)
        .map(|(id, entry)| Topic {
            id: TopicId(id),
            title: entry.title.to_owned(),
            description: entry.description.to_owned(),
            category: entry.category.to_owned(),
        })
        .collect()
}
