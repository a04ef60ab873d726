use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use crate::models::{DayAnnotation, DayCell, MonthCursor, MonthStep};

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Length of a Gregorian calendar month. Returns 0 for an out-of-range
/// month number.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 0,
    }
}

/// Leading blank cells before day 1, with week columns starting on Sunday.
pub fn first_weekday_offset(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_sunday())
        .unwrap_or(0)
}

/// Month view state: the reference month plus an optional selected day.
/// The selection is month-scoped and never carries across navigation.
#[derive(Debug, Clone)]
pub struct CalendarState {
    cursor: MonthCursor,
    selected: Option<NaiveDate>,
}

impl CalendarState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            cursor: MonthCursor::of(today),
            selected: None,
        }
    }

    pub fn cursor(&self) -> MonthCursor {
        self.cursor
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// Advance or retreat one month. Always clears the selection.
    pub fn navigate(&mut self, step: MonthStep) {
        self.cursor = self.cursor.step(step);
        self.selected = None;
    }

    /// Select a day in the current month. Returns false when the date is
    /// outside the reference month or already selected (re-selection is a
    /// no-op beyond the caller re-filtering its lists).
    pub fn select(&mut self, date: NaiveDate) -> bool {
        if !self.cursor.contains(date) || self.selected == Some(date) {
            return false;
        }
        self.selected = Some(date);
        true
    }

    pub fn grid(
        &self,
        today: NaiveDate,
        annotations: &HashMap<NaiveDate, DayAnnotation>,
    ) -> Vec<Option<DayCell>> {
        month_grid(self.cursor, today, self.selected, annotations)
    }
}

/// Lay out a month as a flat cell list: `None` for each leading blank so
/// day-of-week columns align, then one `DayCell` per day.
pub fn month_grid(
    cursor: MonthCursor,
    today: NaiveDate,
    selected: Option<NaiveDate>,
    annotations: &HashMap<NaiveDate, DayAnnotation>,
) -> Vec<Option<DayCell>> {
    let blanks = first_weekday_offset(cursor.year, cursor.month);
    let days = days_in_month(cursor.year, cursor.month);

    let mut cells: Vec<Option<DayCell>> = Vec::with_capacity((blanks + days) as usize);
    for _ in 0..blanks {
        cells.push(None);
    }
    for day in 1..=days {
        let Some(date) = NaiveDate::from_ymd_opt(cursor.year, cursor.month, day) else {
            continue;
        };
        cells.push(Some(DayCell {
            day,
            date,
            is_today: date == today,
            is_selected: selected == Some(date),
            annotation: annotations.get(&date).cloned().unwrap_or_default(),
        }));
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_in_month_matches_gregorian_calendar() {
        for year in [1900, 1999, 2000, 2023, 2024, 2100] {
            for month in 1..=12u32 {
                let expected = {
                    // Independent oracle: distance to the first of the next month.
                    let first = date(year, month, 1);
                    let next = if month == 12 {
                        date(year + 1, 1, 1)
                    } else {
                        date(year, month + 1, 1)
                    };
                    (next - first).num_days() as u32
                };
                assert_eq!(
                    days_in_month(year, month),
                    expected,
                    "{}-{}",
                    year,
                    month
                );
            }
        }
    }

    #[test]
    fn test_february_29_only_on_leap_years() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2023, 2), 28);
    }

    #[test]
    fn test_leading_blanks_equal_weekday_of_the_first() {
        for (year, month) in [(2025, 6), (2026, 8), (2024, 2), (1999, 12)] {
            let offset = first_weekday_offset(year, month);
            assert_eq!(
                offset,
                date(year, month, 1).weekday().num_days_from_sunday()
            );

            let grid = month_grid(
                MonthCursor { year, month },
                date(year, month, 15),
                None,
                &HashMap::new(),
            );
            let blanks = grid.iter().take_while(|c| c.is_none()).count();
            assert_eq!(blanks as u32, offset);
            assert_eq!(grid.len() as u32, offset + days_in_month(year, month));
        }
    }

    #[test]
    fn test_navigation_clears_selection() {
        let mut state = CalendarState::new(date(2026, 8, 7));
        assert!(state.select(date(2026, 8, 12)));
        state.navigate(MonthStep::Forward);
        assert_eq!(state.cursor(), MonthCursor { year: 2026, month: 9 });
        assert_eq!(state.selected(), None);

        state.navigate(MonthStep::Back);
        assert_eq!(state.cursor(), MonthCursor { year: 2026, month: 8 });
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_navigation_wraps_year_boundaries() {
        let mut state = CalendarState::new(date(2026, 1, 10));
        state.navigate(MonthStep::Back);
        assert_eq!(state.cursor(), MonthCursor { year: 2025, month: 12 });
        state.navigate(MonthStep::Forward);
        assert_eq!(state.cursor(), MonthCursor { year: 2026, month: 1 });
    }

    #[test]
    fn test_reselecting_same_day_is_a_no_op() {
        let mut state = CalendarState::new(date(2026, 8, 7));
        assert!(state.select(date(2026, 8, 5)));
        assert!(!state.select(date(2026, 8, 5)));
        assert_eq!(state.selected(), Some(date(2026, 8, 5)));
    }

    #[test]
    fn test_selection_changes_between_days_in_the_same_month() {
        let mut state = CalendarState::new(date(2026, 8, 7));
        assert!(state.select(date(2026, 8, 5)));
        assert!(state.select(date(2026, 8, 12)));
        assert_eq!(state.selected(), Some(date(2026, 8, 12)));
    }

    #[test]
    fn test_selection_outside_reference_month_is_rejected() {
        let mut state = CalendarState::new(date(2026, 8, 7));
        assert!(!state.select(date(2026, 9, 1)));
        assert_eq!(state.selected(), None);
    }

    #[test]
    fn test_grid_marks_today_and_selected() {
        let mut state = CalendarState::new(date(2026, 8, 7));
        state.select(date(2026, 8, 12));
        let grid = state.grid(date(2026, 8, 7), &HashMap::new());

        let cells: Vec<&DayCell> = grid.iter().flatten().collect();
        assert!(cells.iter().any(|c| c.is_today && c.day == 7));
        assert!(cells.iter().any(|c| c.is_selected && c.day == 12));
        assert_eq!(cells.iter().filter(|c| c.is_selected).count(), 1);
    }

    #[test]
    fn test_grid_carries_annotations() {
        let mut annotations = HashMap::new();
        annotations.insert(
            date(2026, 8, 12),
            DayAnnotation {
                appointment_count: 2,
                type_summary: vec!["lab_test".to_string(), "general".to_string()],
                availability: Some(crate::models::DayAvailability::Available),
            },
        );
        let grid = month_grid(
            MonthCursor { year: 2026, month: 8 },
            date(2026, 8, 7),
            None,
            &annotations,
        );
        let cell = grid
            .iter()
            .flatten()
            .find(|c| c.day == 12)
            .expect("day 12 present");
        assert_eq!(cell.annotation.appointment_count, 2);
        assert_eq!(
            cell.annotation.availability,
            Some(crate::models::DayAvailability::Available)
        );
    }
}
