//! Durable user preferences.
//!
//! The store is built with [`PreferenceStore::load`] before anything reads it.
//! Loading never fails: whatever cannot be read back falls back to its default,
//! field by field. Every mutation re-serializes the whole record. Writes are
//! best effort, and the in-memory record stays authoritative for the session
//! when storage refuses them.

use crate::{
    presentation::{Presentation, PresentationClasses},
    storage::{KeyValueStorage, StorageError},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};
use voices_common::model::preferences::{
    EffectiveTheme, FontSize, Language, NotificationSettings, NotificationsUpdate, Preferences,
    PrivacySettings, PrivacyUpdate, Theme,
};

pub const PREFERENCES_KEY: &str = "voicesOfChangeSettings";

#[derive(Debug, Error)]
pub enum PersistenceWarning {
    #[error("Preferences could not be serialized: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of writing the record after a mutation.
#[derive(Debug)]
#[must_use]
pub enum Persisted {
    Stored,
    /// The mutation took effect in memory only.
    Degraded(PersistenceWarning),
}

impl Persisted {
    #[must_use]
    pub fn is_stored(&self) -> bool {
        matches!(self, Persisted::Stored)
    }
}

impl From<Result<(), PersistenceWarning>> for Persisted {
    fn from(value: Result<(), PersistenceWarning>) -> Self {
        match value {
            Ok(()) => Persisted::Stored,
            Err(warning) => {
                warn!(%warning, "Persisting preferences failed, keeping them in memory");
                Persisted::Degraded(warning)
            }
        }
    }
}

#[derive(Debug)]
pub struct PreferenceStore<S, P> {
    storage: S,
    presentation: P,
    preferences: Preferences,
    system_prefers_dark: bool,
}

impl<S: KeyValueStorage, P: Presentation> PreferenceStore<S, P> {
    /// Reads the stored record and applies its presentation classes.
    pub fn load(storage: S, presentation: P, system_prefers_dark: bool) -> Self {
        let preferences = read_preferences(&storage);
        info!(?preferences, "Loaded preferences");

        let mut store = Self {
            storage,
            presentation,
            preferences,
            system_prefers_dark,
        };
        store.apply_presentation();
        store
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    #[must_use]
    pub fn system_prefers_dark(&self) -> bool {
        self.system_prefers_dark
    }

    #[must_use]
    pub fn effective_theme(&self) -> EffectiveTheme {
        self.preferences.theme.resolve(self.system_prefers_dark)
    }

    #[must_use]
    pub fn classes(&self) -> PresentationClasses {
        PresentationClasses::for_preferences(&self.preferences, self.system_prefers_dark)
    }

    #[must_use]
    pub fn presentation(&self) -> &P {
        &self.presentation
    }

    pub fn set_theme(&mut self, theme: Theme) -> Persisted {
        debug!(%theme, "Setting theme");
        self.preferences.theme = theme;
        self.apply_presentation();
        self.persist()
    }

    pub fn set_font_size(&mut self, font_size: FontSize) -> Persisted {
        debug!(%font_size, "Setting font size");
        self.preferences.font_size = font_size;
        self.apply_presentation();
        self.persist()
    }

    pub fn set_language(&mut self, language: Language) -> Persisted {
        debug!(%language, "Setting language");
        self.preferences.language = language;
        self.persist()
    }

    pub fn update_notifications(&mut self, update: NotificationsUpdate) -> Persisted {
        debug!(?update, "Updating notification settings");
        self.preferences.notifications.merge(update);
        self.persist()
    }

    pub fn update_privacy(&mut self, update: PrivacyUpdate) -> Persisted {
        debug!(?update, "Updating privacy settings");
        self.preferences.privacy.merge(update);
        self.persist()
    }

    /// Restores every default and clears the stored record.
    pub fn reset(&mut self) -> Persisted {
        info!("Resetting preferences to defaults");
        self.preferences = Preferences::default();
        self.apply_presentation();
        self.storage
            .remove(PREFERENCES_KEY)
            .map_err(PersistenceWarning::from)
            .into()
    }

    /// New ambient signal. Only the theme side effect changes; nothing is stored.
    pub fn set_system_prefers_dark(&mut self, system_prefers_dark: bool) {
        debug!(system_prefers_dark, "Ambient theme signal changed");
        self.system_prefers_dark = system_prefers_dark;
        self.apply_presentation();
    }

    /// Writes the current record again, for use before exit.
    pub fn flush(&mut self) -> Persisted {
        self.persist()
    }

    pub fn into_parts(self) -> (S, P) {
        (self.storage, self.presentation)
    }

    fn apply_presentation(&mut self) {
        let classes = self.classes();
        self.presentation.apply(classes);
    }

    fn persist(&mut self) -> Persisted {
        let result = serde_json::to_string(&self.preferences)
            .map_err(PersistenceWarning::from)
            .and_then(|record| {
                self.storage
                    .set(PREFERENCES_KEY, &record)
                    .map_err(PersistenceWarning::from)
            });
        result.into()
    }
}

fn read_preferences(storage: &impl KeyValueStorage) -> Preferences {
    let raw = match storage.get(PREFERENCES_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No stored preferences, using defaults");
            return Preferences::default();
        }
        Err(error) => {
            warn!(%error, "Reading stored preferences failed, using defaults");
            return Preferences::default();
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(record)) => decode_record(&record),
        Ok(_) => {
            warn!("Stored preferences are not an object, using defaults");
            Preferences::default()
        }
        Err(error) => {
            warn!(%error, "Stored preferences are corrupt, using defaults");
            Preferences::default()
        }
    }
}

fn decode_record(record: &Map<String, Value>) -> Preferences {
    let defaults = Preferences::default();

    Preferences {
        theme: field(record, "theme", defaults.theme),
        font_size: field(record, "fontSize", defaults.font_size),
        language: field(record, "language", defaults.language),
        notifications: decode_notifications(sub_record(record, "notifications")),
        privacy: decode_privacy(sub_record(record, "privacy")),
    }
}

fn decode_notifications(record: Option<&Map<String, Value>>) -> NotificationSettings {
    let defaults = NotificationSettings::default();
    let Some(record) = record else {
        return defaults;
    };

    NotificationSettings {
        posts: field(record, "posts", defaults.posts),
        comments: field(record, "comments", defaults.comments),
        mentions: field(record, "mentions", defaults.mentions),
    }
}

fn decode_privacy(record: Option<&Map<String, Value>>) -> PrivacySettings {
    let defaults = PrivacySettings::default();
    let Some(record) = record else {
        return defaults;
    };

    PrivacySettings {
        show_profile: field(record, "showProfile", defaults.show_profile),
        allow_messages: field(record, "allowMessages", defaults.allow_messages),
        show_activity: field(record, "showActivity", defaults.show_activity),
    }
}

fn sub_record<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    match record.get(key)? {
        Value::Object(sub_record) => Some(sub_record),
        _ => {
            warn!(key, "Ignoring stored preference group that is not an object");
            None
        }
    }
}

fn field<T: DeserializeOwned>(record: &Map<String, Value>, key: &str, default: T) -> T {
    let Some(value) = record.get(key) else {
        debug!(key, "Stored preference missing, using default");
        return default;
    };

    T::deserialize(value).unwrap_or_else(|error| {
        warn!(key, %error, "Ignoring invalid stored preference");
        default
    })
}
