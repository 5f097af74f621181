pub mod completion;
pub mod day;
pub mod error;
pub mod frequency;
pub mod status;
pub mod task;
pub mod view;
pub mod window;

pub use crate::completion::{toggle, CompletedDates, ToggleOutcome, Toggled};
pub use crate::day::AsCalendarDay;
pub use crate::error::RoutineError;
pub use crate::frequency::{frequency_label, resolve_interval_days, Frequency, FrequencyUnit};
pub use crate::status::{classify, DayStatus};
pub use crate::task::{Task, TaskId};
pub use crate::view::{date_label, DateLabel, DayCell, TaskView};
pub use crate::window::{generate_window, DateWindow};
