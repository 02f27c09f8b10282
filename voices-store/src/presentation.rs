use serde::Serialize;
use std::collections::BTreeSet;
use voices_common::model::preferences::{EffectiveTheme, FontSize, Preferences};

/// The classes the preferences ask the document root to carry.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationClasses {
    pub theme: EffectiveTheme,
    pub font_size: FontSize,
}

impl PresentationClasses {
    #[must_use]
    pub fn for_preferences(preferences: &Preferences, system_prefers_dark: bool) -> Self {
        Self {
            theme: preferences.theme.resolve(system_prefers_dark),
            font_size: preferences.font_size,
        }
    }

    #[must_use]
    pub fn theme_class(self) -> &'static str {
        self.theme.class()
    }

    #[must_use]
    pub fn font_class(self) -> &'static str {
        self.font_size.class()
    }
}

/// Receives presentation side effects from the preference store.
pub trait Presentation {
    fn apply(&mut self, classes: PresentationClasses);
}

/// A class list like a document root's. Applying classes swaps out the
/// mutually exclusive theme and font classes and leaves any others alone.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct DocumentClasses {
    classes: BTreeSet<String>,
}

impl DocumentClasses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, class: impl Into<String>) {
        self.classes.insert(class.into());
    }

    #[must_use]
    pub fn contains(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }
}

impl Presentation for DocumentClasses {
    fn apply(&mut self, classes: PresentationClasses) {
        for theme in EffectiveTheme::ALL {
            self.classes.remove(theme.class());
        }
        for font_size in FontSize::ALL {
            self.classes.remove(font_size.class());
        }

        self.add(classes.theme_class());
        self.add(classes.font_class());
    }
}
