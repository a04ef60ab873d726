pub mod models;
pub mod services;

pub use models::{DayAnnotation, DayAvailability, DayCell, MonthCursor, MonthStep};
pub use services::grid::{days_in_month, first_weekday_offset, month_grid, CalendarState};
