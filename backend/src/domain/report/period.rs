//! Validated report date range.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::appointment::AppointmentWindow;
use crate::domain::error::PipelineError;

const LABEL_FORMAT: &str = "%d.%m.%Y";

/// Inclusive calendar-day range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportPeriod {
    start: NaiveDate,
    end: NaiveDate,
    window: AppointmentWindow,
}

impl ReportPeriod {
    /// Validate raw request bounds.
    ///
    /// # Errors
    /// `InvalidRange` when either bound is absent, is the zero date
    /// `0001-01-01`, or when `start` falls after `end`.
    ///
    /// # Examples
    /// ```
    /// use chrono::NaiveDate;
    /// use clinic_notify::domain::report::ReportPeriod;
    ///
    /// let period = ReportPeriod::new(
    ///     NaiveDate::from_ymd_opt(2024, 1, 1),
    ///     NaiveDate::from_ymd_opt(2024, 1, 31),
    /// )
    /// .expect("ordered range");
    /// assert_eq!(period.label(), "01.01.2024 - 31.01.2024");
    /// ```
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, PipelineError> {
        let start = require_date(start, "start")?;
        let end = require_date(end, "end")?;
        let inverted =
            || PipelineError::invalid_range(format!("start date {start} is after end date {end}"));
        if start > end {
            return Err(inverted());
        }
        let from = start.and_time(NaiveTime::MIN);
        let until = end
            .succ_opt()
            .map_or(NaiveDateTime::MAX, |next| next.and_time(NaiveTime::MIN));
        let window = AppointmentWindow::new(from, until).ok_or_else(inverted)?;
        Ok(Self { start, end, window })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// `dd.MM.yyyy - dd.MM.yyyy`.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format(LABEL_FORMAT),
            self.end.format(LABEL_FORMAT)
        )
    }

    /// Timestamp window covering every instant of every day in the period.
    #[must_use]
    pub const fn window(&self) -> AppointmentWindow {
        self.window
    }
}

/// Upstream forms send `0001-01-01` for an unset date.
fn is_zero_date(date: NaiveDate) -> bool {
    date.year() == 1 && date.ordinal() == 1
}

fn require_date(date: Option<NaiveDate>, which: &str) -> Result<NaiveDate, PipelineError> {
    match date {
        Some(date) if !is_zero_date(date) => Ok(date),
        _ => Err(PipelineError::invalid_range(format!("{which} date is missing"))),
    }
}
