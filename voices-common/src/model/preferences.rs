use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
#[error("Unknown {kind}: {value:?}")]
pub struct UnknownOptionError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! preference_option {
    ($(#[$meta:meta])* $name:ident: $kind:literal {
        $($(#[$variant_meta:meta])* $variant:ident = $value:literal, $label:literal;)+
    }) => {
        $(#[$meta])*
        #[derive(
            Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
        )]
        pub enum $name {
            $($(#[$variant_meta])* #[serde(rename = $value)] $variant,)+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownOptionError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(UnknownOptionError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

preference_option!(
    Theme: "theme" {
        Light = "light", "Light";
        Dark = "dark", "Dark";
        #[default]
        System = "system", "System";
    }
);

preference_option!(
    FontSize: "font size" {
        Small = "small", "Small";
        #[default]
        Medium = "medium", "Medium (Recommended)";
        Large = "large", "Large";
    }
);

preference_option!(
    /// Interface language. Labels are the native language names.
    Language: "language" {
        #[default]
        En = "en", "English";
        Es = "es", "Español";
        Fr = "fr", "Français";
        Ar = "ar", "العربية";
    }
);

/// The theme actually rendered once [`Theme::System`] is resolved.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectiveTheme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn resolve(self, system_prefers_dark: bool) -> EffectiveTheme {
        match self {
            Theme::Dark => EffectiveTheme::Dark,
            Theme::System if system_prefers_dark => EffectiveTheme::Dark,
            Theme::Light | Theme::System => EffectiveTheme::Light,
        }
    }
}

impl EffectiveTheme {
    pub const ALL: [Self; 2] = [Self::Light, Self::Dark];

    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            EffectiveTheme::Light => "light",
            EffectiveTheme::Dark => "dark",
        }
    }
}

impl FontSize {
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            FontSize::Small => "text-sm",
            FontSize::Medium => "text-base",
            FontSize::Large => "text-lg",
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    pub posts: bool,
    pub comments: bool,
    pub mentions: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacySettings {
    pub show_profile: bool,
    pub allow_messages: bool,
    pub show_activity: bool,
}

/// Partial notification change; `None` leaves a flag as it is.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mentions: Option<bool>,
}

/// Partial privacy change; `None` leaves a flag as it is.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_profile: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_messages: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_activity: Option<bool>,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub font_size: FontSize,
    pub language: Language,
    pub notifications: NotificationSettings,
    pub privacy: PrivacySettings,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            posts: true,
            comments: true,
            mentions: true,
        }
    }
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            show_profile: true,
            allow_messages: true,
            show_activity: false,
        }
    }
}

impl NotificationSettings {
    pub fn merge(&mut self, update: NotificationsUpdate) {
        let NotificationsUpdate {
            posts,
            comments,
            mentions,
        } = update;

        if let Some(posts) = posts {
            self.posts = posts;
        }
        if let Some(comments) = comments {
            self.comments = comments;
        }
        if let Some(mentions) = mentions {
            self.mentions = mentions;
        }
    }
}

impl PrivacySettings {
    pub fn merge(&mut self, update: PrivacyUpdate) {
        let PrivacyUpdate {
            show_profile,
            allow_messages,
            show_activity,
        } = update;

        if let Some(show_profile) = show_profile {
            self.show_profile = show_profile;
        }
        if let Some(allow_messages) = allow_messages {
            self.allow_messages = allow_messages;
        }
        if let Some(show_activity) = show_activity {
            self.show_activity = show_activity;
        }
    }
}
