pub mod post;
pub mod preferences;
pub mod share;
pub mod topic;
pub mod user;

use crate::{
    model::{
        post::InvalidContentError, preferences::UnknownOptionError,
        share::UnknownShareTargetError, user::InvalidAuthorNameError,
    },
    snowflake::{Epoch, Snowflake, SnowflakeGenerator},
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, marker::PhantomData};
use thiserror::Error;
use time::{UtcDateTime, macros::utc_datetime};

/// Input rejected at the boundary. The rejected operation has no effect.
#[derive(Clone, Eq, PartialEq, Debug, Hash, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Content(#[from] InvalidContentError),
    #[error(transparent)]
    UnknownOption(#[from] UnknownOptionError),
    #[error(transparent)]
    UnknownShareTarget(#[from] UnknownShareTargetError),
    #[error(transparent)]
    AuthorName(#[from] InvalidAuthorNameError),
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct VoicesEpoch;
impl Epoch for VoicesEpoch {
    const EPOCH_TIME: UtcDateTime = utc_datetime!(2025-01-01 00:00);
}

pub type VoicesSnowflake = Snowflake<VoicesEpoch>;
pub type VoicesSnowflakeGenerator = SnowflakeGenerator<VoicesEpoch>;

/// A typed snowflake. Serializes as a decimal string, like [`Snowflake`].
#[derive(
    Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Id<Marker>(VoicesSnowflake, #[serde(skip)] PhantomData<Marker>);

impl<Marker> Id<Marker> {
    #[must_use]
    pub fn new(snowflake: VoicesSnowflake) -> Self {
        Self(snowflake, PhantomData)
    }

    #[must_use]
    pub fn snowflake(self) -> VoicesSnowflake {
        self.0
    }
}

impl<Marker> Display for Id<Marker> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<Marker> From<VoicesSnowflake> for Id<Marker> {
    fn from(value: VoicesSnowflake) -> Self {
        Self::new(value)
    }
}

impl<Marker> From<u64> for Id<Marker> {
    fn from(value: u64) -> Self {
        Id::new(VoicesSnowflake::new(value))
    }
}

impl<Marker> From<Id<Marker>> for u64 {
    fn from(value: Id<Marker>) -> Self {
        value.snowflake().get()
    }
}
