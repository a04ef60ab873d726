use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Availability tag for a calendar day once it has been resolved. A day
/// without a tag has simply not been checked yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayAvailability {
    Available,
    Unavailable,
}

/// Per-day decoration supplied by the caller when a grid is built. The
/// engine itself never computes these.
#[derive(Debug, Clone, Default)]
pub struct DayAnnotation {
    pub appointment_count: usize,
    pub type_summary: Vec<String>,
    pub availability: Option<DayAvailability>,
}

#[derive(Debug, Clone)]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_selected: bool,
    pub annotation: DayAnnotation,
}

/// A reference month. Navigation keeps `month` in 1..=12.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthCursor {
    pub year: i32,
    pub month: u32,
}

impl MonthCursor {
    pub fn of(date: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn step(self, step: MonthStep) -> Self {
        match step {
            MonthStep::Back => {
                if self.month == 1 {
                    Self {
                        year: self.year - 1,
                        month: 12,
                    }
                } else {
                    Self {
                        year: self.year,
                        month: self.month - 1,
                    }
                }
            }
            MonthStep::Forward => {
                if self.month == 12 {
                    Self {
                        year: self.year + 1,
                        month: 1,
                    }
                } else {
                    Self {
                        year: self.year,
                        month: self.month + 1,
                    }
                }
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        date.year() == self.year && date.month() == self.month
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthStep {
    Back,
    Forward,
}
