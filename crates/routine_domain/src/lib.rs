pub mod notifications;
pub mod service;
pub mod store;

pub use crate::notifications::{RecordingScheduler, ReminderRequest, ReminderScheduler};
pub use crate::service::{RoutineService, RoutineServiceBuilder, TASKS_KEY};
pub use crate::store::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};
