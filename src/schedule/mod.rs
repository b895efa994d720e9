mod controller;

pub use controller::{
    PruneOutcome, ReminderScheduleController, SCHEDULE_CAP, SeriesOutcome,
};
