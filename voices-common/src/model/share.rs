//! Hand-off data for external sharing surfaces.
//!
//! The stores only build [`ShareData`]. Which [`ShareTarget`] is tried first is
//! decided by the caller, typically with [`ShareTarget::preferred`].

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, PercentEncode, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

/// Characters left alone by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const TWITTER_HASHTAGS: &str = "VoicesOfChange,WomenEmpowerment";
const EMAIL_SIGNATURE: &str = "Shared from Voices of Change Unite";

#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize, Deserialize)]
pub struct ShareData {
    pub title: String,
    pub text: String,
    pub url: String,
}

#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ShareTarget {
    #[serde(rename = "native")]
    NativeDevice,
    Facebook,
    Twitter,
    LinkedIn,
    WhatsApp,
    Telegram,
    Email,
    #[serde(rename = "clipboard")]
    ClipboardCopy,
}

/// What the sharing collaborator should do for a target.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum ShareAction {
    Native(ShareData),
    OpenUrl(String),
    CopyToClipboard(String),
}

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
#[error("Unknown share target: {0:?}")]
pub struct UnknownShareTargetError(String);

fn encode(value: &str) -> PercentEncode<'_> {
    utf8_percent_encode(value, URI_COMPONENT)
}

impl ShareTarget {
    pub const ALL: [Self; 8] = [
        Self::NativeDevice,
        Self::Facebook,
        Self::Twitter,
        Self::LinkedIn,
        Self::WhatsApp,
        Self::Telegram,
        Self::Email,
        Self::ClipboardCopy,
    ];

    /// First target to try: the device's own share sheet when there is one,
    /// otherwise copying the link.
    #[must_use]
    pub fn preferred(native_available: bool) -> Self {
        if native_available {
            Self::NativeDevice
        } else {
            Self::ClipboardCopy
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ShareTarget::NativeDevice => "native",
            ShareTarget::Facebook => "facebook",
            ShareTarget::Twitter => "twitter",
            ShareTarget::LinkedIn => "linkedin",
            ShareTarget::WhatsApp => "whatsapp",
            ShareTarget::Telegram => "telegram",
            ShareTarget::Email => "email",
            ShareTarget::ClipboardCopy => "clipboard",
        }
    }

    /// Endpoint for the platforms reached through a link, `None` for the others.
    #[must_use]
    pub fn link(self, data: &ShareData) -> Option<String> {
        let ShareData { title, text, url } = data;

        let link = match self {
            ShareTarget::NativeDevice | ShareTarget::ClipboardCopy => return None,
            ShareTarget::Facebook => format!(
                "https://www.facebook.com/sharer/sharer.php?u={}&quote={}",
                encode(url),
                encode(text),
            ),
            ShareTarget::Twitter => format!(
                "https://twitter.com/intent/tweet?text={}&url={}&hashtags={TWITTER_HASHTAGS}",
                encode(text),
                encode(url),
            ),
            ShareTarget::LinkedIn => format!(
                "https://www.linkedin.com/sharing/share-offsite/?url={}&title={}&summary={}",
                encode(url),
                encode(title),
                encode(text),
            ),
            ShareTarget::WhatsApp => format!(
                "https://wa.me/?text={}",
                encode(&format!("{title}\n\n{text}\n\n{url}")),
            ),
            ShareTarget::Telegram => format!(
                "https://t.me/share/url?url={}&text={}",
                encode(url),
                encode(&format!("{title}\n\n{text}")),
            ),
            ShareTarget::Email => {
                let subject = format!("Important story: {title}");
                let body = format!(
                    "I wanted to share this important story with you:\n\n{text}\n\n\
                    Read more: {url}\n\n{EMAIL_SIGNATURE}"
                );
                format!("mailto:?subject={}&body={}", encode(&subject), encode(&body))
            }
        };

        Some(link)
    }

    #[must_use]
    pub fn action(self, data: &ShareData) -> ShareAction {
        match self {
            ShareTarget::NativeDevice => ShareAction::Native(data.clone()),
            ShareTarget::ClipboardCopy => ShareAction::CopyToClipboard(data.url.clone()),
            _ => ShareAction::OpenUrl(self.link(data).unwrap_or_default()),
        }
    }
}

impl Display for ShareTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareTarget {
    type Err = UnknownShareTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|target| target.as_str() == s)
            .ok_or_else(|| UnknownShareTargetError(s.to_owned()))
    }
}
