pub mod clock;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod normalize;
pub mod schedule;
pub mod series;
pub mod settings;
pub mod storage;
pub mod task_reminder;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dispatch::{NotificationDispatchGateway, NotificationPayload};
pub use error::{InvalidStep, ScheduleError, WindowError};
pub use event::{Event, EventId, ReminderOffset, StoredReminders, TaskId};
pub use schedule::{PruneOutcome, ReminderScheduleController, SCHEDULE_CAP, SeriesOutcome};
pub use series::{SeriesStep, StepUnit};
pub use settings::EngineSettings;
pub use storage::OffsetStore;
pub use task_reminder::TaskReminderStore;
