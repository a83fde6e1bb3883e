//! Shared fixtures and doubles for unit tests.

mod bus;
mod clinic;

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

pub use bus::RecordingBus;
pub use clinic::{appointment_at, doctor, patient, schedule_for, timestamp};

/// Clock that always reads the same instant unless moved.
pub struct FixedClock(Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn at_fixture_instant() -> Self {
        Self::new(
            Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0)
                .single()
                .expect("valid fixture instant"),
        )
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().expect("clock mutex") = now;
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex")
    }
}
