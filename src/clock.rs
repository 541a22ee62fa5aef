use time::{OffsetDateTime, UtcOffset};
use tracing::warn;

/// Source of the device-local "now".
pub trait Clock: Send + Sync {
    /// Current instant, expressed in the device's local offset.
    fn now(&self) -> OffsetDateTime;

    /// Re-express `instant` in the local offset in effect at that instant.
    fn localize(&self, instant: OffsetDateTime) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_local().unwrap_or_else(|e| {
            warn!(error = %e, "local offset unavailable; using UTC");
            OffsetDateTime::now_utc()
        })
    }

    fn localize(&self, instant: OffsetDateTime) -> OffsetDateTime {
        match UtcOffset::local_offset_at(instant) {
            Ok(offset) => instant.to_offset(offset),
            Err(e) => {
                warn!(error = %e, "local offset unavailable; keeping instant offset");
                instant
            }
        }
    }
}

/// Clock pinned to a single instant. Offsets never change under it.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }

    fn localize(&self, instant: OffsetDateTime) -> OffsetDateTime {
        instant.to_offset(self.0.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn fixed_clock_keeps_its_offset() {
        let clock = FixedClock(datetime!(2024-03-10 08:30 -5));
        let utc = datetime!(2024-03-10 02:00 UTC);
        let local = clock.localize(utc);
        assert_eq!(local.offset(), clock.now().offset());
        assert_eq!(local.date(), time::macros::date!(2024-03-09));
    }
}
