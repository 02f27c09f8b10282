use serde::{
    Deserialize, Deserializer, Serialize,
    de::{Error, Unexpected},
};
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const AUTHOR_NAME_MAX_LEN: usize = 50;

/// Display name used for everything the current session authors.
pub const CURRENT_USER_NAME: &str = "You";

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Serialize)]
#[serde(transparent)]
pub struct AuthorName(String);

#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Error)]
#[error("The author name is invalid: {0:?}")]
pub struct InvalidAuthorNameError(String);

impl AuthorName {
    pub fn new(name: String) -> Result<Self, InvalidAuthorNameError> {
        let len = name.trim().chars().count();
        if (1..=AUTHOR_NAME_MAX_LEN).contains(&len) {
            Ok(AuthorName(name))
        } else {
            Err(InvalidAuthorNameError(name))
        }
    }

    #[must_use]
    pub fn new_unchecked(name: String) -> Self {
        Self::new(name).expect("Invalid author name.")
    }

    #[must_use]
    pub fn current_user() -> Self {
        AuthorName(CURRENT_USER_NAME.to_owned())
    }

    /// First letter, uppercased, as shown in avatar fallbacks.
    #[must_use]
    pub fn initial(&self) -> Option<char> {
        self.0.chars().next().and_then(|c| c.to_uppercase().next())
    }

    #[must_use]
    pub fn get(&self) -> &str {
        &self.0
    }
}

impl Display for AuthorName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for AuthorName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let inner = String::deserialize(deserializer)?;
        AuthorName::new(inner)
            .map_err(|err| Error::invalid_value(Unexpected::Str(&err.0), &"AuthorName"))
    }
}

#[cfg(test)]
mod tests {
    use crate::model::user::{AUTHOR_NAME_MAX_LEN, AuthorName};

    #[test]
    fn author_name_bounds() {
        assert!(AuthorName::new("Sarah_K".to_owned()).is_ok());
        assert!(AuthorName::new("a".repeat(AUTHOR_NAME_MAX_LEN)).is_ok());
        assert!(AuthorName::new("a".repeat(AUTHOR_NAME_MAX_LEN + 1)).is_err());
        assert!(AuthorName::new("   ".to_owned()).is_err());
    }

    #[test]
    fn current_user() {
        let you = AuthorName::current_user();
        assert_eq!(you.get(), "You");
    }

    #[test]
    fn initial() {
        assert_eq!(AuthorName::new("maya".to_owned()).unwrap().initial(), Some('M'));
    }

    #[test]
    fn deserialize_rejects_invalid() {
        assert!(serde_json::from_str::<AuthorName>("\"Lisa_M\"").is_ok());
        assert!(serde_json::from_str::<AuthorName>("\"\"").is_err());
    }
}
