use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Earliest instant a wire timestamp may carry: 0001-01-01T00:00:00Z.
const MIN_SECONDS: i64 = -62_135_596_800;
/// Latest instant a wire timestamp may carry: 9999-12-31T23:59:59Z.
const MAX_SECONDS: i64 = 253_402_300_799;

/// Wire representation of a point in time: seconds since the Unix epoch plus
/// a non-negative nanosecond offset, normalized to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Timestamp {
    /// Whole seconds since 1970-01-01T00:00:00Z
    pub seconds: i64,
    /// Nanoseconds within the second, in `[0, 999_999_999]`
    pub nanos: i32,
}

/// Error type for wire timestamp conversions.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    /// The nanosecond offset falls outside `[0, 999_999_999]`.
    #[error("nanos value {0} is outside the range [0, 999999999]")]
    NanosOutOfRange(i32),
    /// The instant falls outside the representable range of years 0001-9999.
    #[error("seconds value {0} is outside the range of representable timestamps")]
    SecondsOutOfRange(i64),
}

impl Timestamp {
    /// Converts the wire pair into a native UTC time value.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `DateTime<Utc>` if the pair is valid, or a
    /// `TimestampError` describing the offending field otherwise.
    pub fn to_utc(self) -> Result<DateTime<Utc>, TimestampError> {
        if !(0..1_000_000_000).contains(&self.nanos) {
            return Err(TimestampError::NanosOutOfRange(self.nanos));
        }
        if !(MIN_SECONDS..=MAX_SECONDS).contains(&self.seconds) {
            return Err(TimestampError::SecondsOutOfRange(self.seconds));
        }
        DateTime::from_timestamp(self.seconds, self.nanos as u32)
            .ok_or(TimestampError::SecondsOutOfRange(self.seconds))
    }

    /// Converts a native UTC time value into the wire pair.
    ///
    /// Fails with `TimestampError::SecondsOutOfRange` when the instant falls
    /// outside the window accepted by [`Timestamp::to_utc`], keeping the
    /// conversion pair symmetric.
    pub fn from_utc(instant: DateTime<Utc>) -> Result<Self, TimestampError> {
        let seconds = instant.timestamp();
        if !(MIN_SECONDS..=MAX_SECONDS).contains(&seconds) {
            return Err(TimestampError::SecondsOutOfRange(seconds));
        }
        Ok(Self {
            seconds,
            nanos: instant.timestamp_subsec_nanos() as i32,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_round_trip_nanosecond_precision() {
        let wire = Timestamp {
            seconds: 1_753_999_200,
            nanos: 123_456_789,
        };
        let native = wire.to_utc().expect("valid timestamp");
        let round_tripped = Timestamp::from_utc(native).expect("valid instant");
        assert_eq!(round_tripped, wire);
    }

    #[test]
    fn can_round_trip_epoch() {
        let wire = Timestamp {
            seconds: 0,
            nanos: 0,
        };
        let native = wire.to_utc().expect("valid timestamp");
        assert_eq!(native, DateTime::UNIX_EPOCH);
        assert_eq!(Timestamp::from_utc(native), Ok(wire));
    }

    #[test]
    fn can_round_trip_pre_epoch_instant() {
        let wire = Timestamp {
            seconds: -86_400,
            nanos: 500_000_000,
        };
        let native = wire.to_utc().expect("valid timestamp");
        assert_eq!(Timestamp::from_utc(native), Ok(wire));
    }

    #[test]
    fn rejects_negative_nanos() {
        let wire = Timestamp {
            seconds: 0,
            nanos: -1,
        };
        assert_eq!(wire.to_utc(), Err(TimestampError::NanosOutOfRange(-1)));
    }

    #[test]
    fn rejects_nanos_of_a_full_second_or_more() {
        let wire = Timestamp {
            seconds: 0,
            nanos: 1_000_000_000,
        };
        assert_eq!(
            wire.to_utc(),
            Err(TimestampError::NanosOutOfRange(1_000_000_000))
        );
    }

    #[test]
    fn rejects_seconds_before_year_one() {
        let wire = Timestamp {
            seconds: MIN_SECONDS - 1,
            nanos: 0,
        };
        assert_eq!(
            wire.to_utc(),
            Err(TimestampError::SecondsOutOfRange(MIN_SECONDS - 1))
        );
    }

    #[test]
    fn rejects_seconds_after_year_9999() {
        let wire = Timestamp {
            seconds: MAX_SECONDS + 1,
            nanos: 0,
        };
        assert_eq!(
            wire.to_utc(),
            Err(TimestampError::SecondsOutOfRange(MAX_SECONDS + 1))
        );
    }

    #[test]
    fn accepts_the_range_boundaries() {
        for seconds in [MIN_SECONDS, MAX_SECONDS] {
            let wire = Timestamp { seconds, nanos: 0 };
            let native = wire.to_utc().expect("boundary timestamp is valid");
            assert_eq!(Timestamp::from_utc(native), Ok(wire));
        }
    }
}
