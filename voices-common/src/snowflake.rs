//! Snowflake ids for content created during a session.
//!
//! A snowflake packs a millisecond timestamp (relative to an [`Epoch`]) into the
//! upper 42 bits and a per-generator increment into the lower 22 bits, so ids
//! order by creation time.
//!
//! Snowflakes serialize as decimal strings. Their values lie far above 2^53,
//! where JSON numbers stop being exact for most consumers. Both strings and
//! plain integers are accepted when deserializing.

use derive_where::derive_where;
use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{self, Visitor},
};
use std::{
    fmt::{Debug, Display, Formatter},
    marker::PhantomData,
};
use thiserror::Error;
use time::{Duration, UtcDateTime};

pub const TIMESTAMP_OFFSET: u64 = 22;
pub const TIMESTAMP_LENGTH: u64 = 42;
pub const TIMESTAMP_BITMASK: u64 = ((1 << TIMESTAMP_LENGTH) - 1) << TIMESTAMP_OFFSET;

pub const INCREMENT_OFFSET: u64 = 0;
pub const INCREMENT_LENGTH: u64 = 22;
pub const INCREMENT_BITMASK: u64 = ((1 << INCREMENT_LENGTH) - 1) << INCREMENT_OFFSET;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Hash, Error)]
pub enum SnowflakeTimestampFromDateTimeError {
    #[error("Specified time was before the snowflake epoch.")]
    TimeBeforeEpoch,
    #[error("Resulting timestamp uses too many bits.")]
    TimestampTooLarge,
}

pub trait Epoch {
    const EPOCH_TIME: UtcDateTime;
}

#[derive_where(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct SnowflakeTimestamp<SnowflakeEpoch>(u64, PhantomData<SnowflakeEpoch>);

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Debug, Default, Hash)]
pub struct SnowflakeIncrement(u32);

#[derive_where(
    Copy,
    Clone,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    Debug,
    Default,
    Hash
)]
pub struct Snowflake<SnowflakeEpoch>(u64, PhantomData<SnowflakeEpoch>);

impl<SnowflakeEpoch> SnowflakeTimestamp<SnowflakeEpoch> {
    pub const MAX: u64 = (1 << TIMESTAMP_LENGTH) - 1;

    #[must_use]
    pub fn new(millis: u64) -> Option<Self> {
        (millis <= Self::MAX).then_some(Self(millis, PhantomData))
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    fn saturating_next(self) -> Self {
        Self(self.0.saturating_add(1).min(Self::MAX), PhantomData)
    }
}

impl<SnowflakeEpoch: Epoch> SnowflakeTimestamp<SnowflakeEpoch> {
    /// Clamps times outside the representable range to the nearest end of it.
    #[must_use]
    pub fn saturating_from(time: UtcDateTime) -> Self {
        match Self::try_from(time) {
            Ok(timestamp) => timestamp,
            Err(SnowflakeTimestampFromDateTimeError::TimeBeforeEpoch) => Self(0, PhantomData),
            Err(SnowflakeTimestampFromDateTimeError::TimestampTooLarge) => {
                Self(Self::MAX, PhantomData)
            }
        }
    }

}

impl<SnowflakeEpoch: Epoch> TryFrom<UtcDateTime> for SnowflakeTimestamp<SnowflakeEpoch> {
    type Error = SnowflakeTimestampFromDateTimeError;

    fn try_from(value: UtcDateTime) -> Result<Self, Self::Error> {
        let millis = (value - SnowflakeEpoch::EPOCH_TIME).whole_milliseconds();
        if millis < 0 {
            return Err(Self::Error::TimeBeforeEpoch);
        }
        let millis_u64 = u64::try_from(millis).map_err(|_| Self::Error::TimestampTooLarge)?;
        Self::new(millis_u64).ok_or(Self::Error::TimestampTooLarge)
    }
}

impl<SnowflakeEpoch: Epoch> From<SnowflakeTimestamp<SnowflakeEpoch>> for UtcDateTime {
    fn from(value: SnowflakeTimestamp<SnowflakeEpoch>) -> Self {
        // 42 bits always fit into an i64.
        SnowflakeEpoch::EPOCH_TIME + Duration::milliseconds(value.0.cast_signed())
    }
}

impl SnowflakeIncrement {
    pub const MAX: u32 = (1 << INCREMENT_LENGTH) - 1;

    #[must_use]
    pub fn new(increment: u32) -> Option<Self> {
        (increment <= Self::MAX).then_some(Self(increment))
    }

    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn next(self) -> Self {
        Self((self.0 + 1) & Self::MAX)
    }

    pub fn increment(&mut self) {
        *self = self.next();
    }
}

impl<SnowflakeEpoch> Snowflake<SnowflakeEpoch> {
    #[must_use]
    pub fn new(inner: u64) -> Self {
        Self(inner, PhantomData)
    }

    #[must_use]
    pub fn from_parts(
        timestamp: SnowflakeTimestamp<SnowflakeEpoch>,
        increment: SnowflakeIncrement,
    ) -> Self {
        let snowflake = timestamp.get() << TIMESTAMP_OFFSET
            | u64::from(increment.get()) << INCREMENT_OFFSET;

        Self(snowflake, PhantomData)
    }

    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn timestamp(self) -> SnowflakeTimestamp<SnowflakeEpoch> {
        SnowflakeTimestamp((self.0 & TIMESTAMP_BITMASK) >> TIMESTAMP_OFFSET, PhantomData)
    }

    #[must_use]
    pub fn increment(self) -> SnowflakeIncrement {
        #[allow(clippy::cast_possible_truncation)]
        SnowflakeIncrement(((self.0 & INCREMENT_BITMASK) >> INCREMENT_OFFSET) as u32)
    }

    #[must_use]
    pub fn into_parts(self) -> (SnowflakeTimestamp<SnowflakeEpoch>, SnowflakeIncrement) {
        (self.timestamp(), self.increment())
    }
}

impl<SnowflakeEpoch> Display for Snowflake<SnowflakeEpoch> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl<SnowflakeEpoch> From<u64> for Snowflake<SnowflakeEpoch> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<SnowflakeEpoch> From<Snowflake<SnowflakeEpoch>> for u64 {
    fn from(value: Snowflake<SnowflakeEpoch>) -> Self {
        value.get()
    }
}

impl<SnowflakeEpoch> Serialize for Snowflake<SnowflakeEpoch> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

struct SnowflakeVisitor;

impl Visitor<'_> for SnowflakeVisitor {
    type Value = u64;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("a snowflake as a decimal string or an unsigned integer")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        u64::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de, SnowflakeEpoch> Deserialize<'de> for Snowflake<SnowflakeEpoch> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_any(SnowflakeVisitor)
            .map(Self::new)
    }
}

/// Hands out strictly increasing snowflakes for a single writer.
#[derive_where(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub struct SnowflakeGenerator<SnowflakeEpoch> {
    last_timestamp: SnowflakeTimestamp<SnowflakeEpoch>,
    next_increment: SnowflakeIncrement,
}

impl<SnowflakeEpoch> SnowflakeGenerator<SnowflakeEpoch> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<SnowflakeEpoch: Epoch> SnowflakeGenerator<SnowflakeEpoch> {
    /// The timestamp part never moves backwards, even if `time` does.
    pub fn generate_at(&mut self, time: UtcDateTime) -> Snowflake<SnowflakeEpoch> {
        let timestamp = SnowflakeTimestamp::saturating_from(time);
        if timestamp > self.last_timestamp {
            self.last_timestamp = timestamp;
            self.next_increment = SnowflakeIncrement::default();
        }

        let snowflake = Snowflake::from_parts(self.last_timestamp, self.next_increment);

        self.next_increment.increment();
        if self.next_increment == SnowflakeIncrement::default() {
            // Increments for this millisecond are used up.
            self.last_timestamp = self.last_timestamp.saturating_next();
        }

        snowflake
    }
}

#[cfg(test)]
mod tests {
    use crate::snowflake::{
        Epoch, Snowflake, SnowflakeGenerator, SnowflakeIncrement, SnowflakeTimestamp,
        SnowflakeTimestampFromDateTimeError,
    };
    use time::{Duration, UtcDateTime, macros::utc_datetime};

    struct MillennialEpoch;
    impl Epoch for MillennialEpoch {
        const EPOCH_TIME: UtcDateTime = utc_datetime!(2000-1-1 00:00);
    }

    #[test]
    fn legal_values() {
        let legal_timestamps = [0, 0xFFFF, 0x03FF_FFFF_FFFF];
        let illegal_timestamps = [0x0400_0000_0000, 0x08F0_0000_0000_0000, u64::MAX];

        for legal_timestamp in legal_timestamps {
            assert!(SnowflakeTimestamp::<MillennialEpoch>::new(legal_timestamp).is_some());
        }
        for illegal_timestamp in illegal_timestamps {
            assert!(SnowflakeTimestamp::<MillennialEpoch>::new(illegal_timestamp).is_none());
        }

        let legal_increments = [0, 0xFFF, 0x3F_FFFF];
        let illegal_increments = [0x40_0000, 0xFF00_0000, u32::MAX];

        for legal_increment in legal_increments {
            assert!(SnowflakeIncrement::new(legal_increment).is_some());
        }
        for illegal_increment in illegal_increments {
            assert!(SnowflakeIncrement::new(illegal_increment).is_none());
        }
    }

    #[test]
    fn snowflake_timestamp() {
        let legal_date_times = [
            MillennialEpoch::EPOCH_TIME,
            utc_datetime!(2025-10-24 10:00),
            MillennialEpoch::EPOCH_TIME + Duration::milliseconds(0x03FF_FFFF_FFFF),
        ];

        for legal_date_time in legal_date_times {
            let timestamp =
                SnowflakeTimestamp::<MillennialEpoch>::try_from(legal_date_time).unwrap();
            assert_eq!(UtcDateTime::from(timestamp), legal_date_time);
        }

        assert_eq!(
            SnowflakeTimestamp::<MillennialEpoch>::try_from(
                MillennialEpoch::EPOCH_TIME - Duration::milliseconds(1)
            ),
            Err(SnowflakeTimestampFromDateTimeError::TimeBeforeEpoch)
        );

        assert_eq!(
            SnowflakeTimestamp::<MillennialEpoch>::try_from(
                MillennialEpoch::EPOCH_TIME + Duration::milliseconds(0x0400_0000_0000)
            ),
            Err(SnowflakeTimestampFromDateTimeError::TimestampTooLarge)
        );

        assert_eq!(
            SnowflakeTimestamp::<MillennialEpoch>::saturating_from(utc_datetime!(1999-12-31 23:00))
                .get(),
            0
        );
    }

    #[test]
    fn snowflake_increment() {
        assert_eq!(
            SnowflakeIncrement::new(0).unwrap().next(),
            SnowflakeIncrement::new(1).unwrap()
        );
        assert_eq!(
            SnowflakeIncrement::new(SnowflakeIncrement::MAX).unwrap().next(),
            SnowflakeIncrement::new(0).unwrap()
        );

        let mut snowflake_increment = SnowflakeIncrement::new(0x3F_FFFE).unwrap();
        snowflake_increment.increment();
        assert_eq!(snowflake_increment.get(), 0x3F_FFFF);
        snowflake_increment.increment();
        assert_eq!(snowflake_increment.get(), 0);
    }

    #[test]
    fn snowflake_from_into_parts() {
        let timestamp = SnowflakeTimestamp::new(1000).unwrap();
        let increment = SnowflakeIncrement::new(5).unwrap();

        let snowflake = Snowflake::<MillennialEpoch>::from_parts(timestamp, increment);

        assert_eq!(snowflake.get(), 4_194_304_005);
        assert_eq!(snowflake.into_parts(), (timestamp, increment));
    }

    #[test]
    fn snowflake_serializes_as_string() {
        let snowflake = Snowflake::<MillennialEpoch>::new(235_972_279_266_181_120);

        let json = serde_json::to_string(&snowflake).unwrap();
        assert_eq!(json, r#""235972279266181120""#);

        let from_string: Snowflake<MillennialEpoch> = serde_json::from_str(&json).unwrap();
        let from_number: Snowflake<MillennialEpoch> =
            serde_json::from_str("235972279266181120").unwrap();
        assert_eq!(from_string, snowflake);
        assert_eq!(from_number, snowflake);

        assert!(serde_json::from_str::<Snowflake<MillennialEpoch>>(r#""12a""#).is_err());
        assert!(serde_json::from_str::<Snowflake<MillennialEpoch>>("-1").is_err());
    }

    #[test]
    fn snowflake_generator() {
        let time = utc_datetime!(2025-10-24 10:55);
        let mut generator = SnowflakeGenerator::<MillennialEpoch>::new();

        let first = generator.generate_at(time);
        let second = generator.generate_at(time);

        assert_eq!(
            first,
            Snowflake::from_parts(
                SnowflakeTimestamp::saturating_from(time),
                SnowflakeIncrement::new(0).unwrap()
            )
        );
        assert_eq!(second.timestamp(), first.timestamp());
        assert_eq!(second.increment().get(), 1);

        let later = generator.generate_at(time + Duration::seconds(1));
        assert!(later > second);
        assert_eq!(later.increment().get(), 0);
    }

    #[test]
    fn snowflake_generator_survives_clock_regression() {
        let time = utc_datetime!(2025-10-24 10:55);
        let mut generator = SnowflakeGenerator::<MillennialEpoch>::new();

        let first = generator.generate_at(time);
        let second = generator.generate_at(time - Duration::minutes(5));

        assert!(second > first);
        assert_eq!(second.timestamp(), first.timestamp());
    }
}
