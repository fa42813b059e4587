pub mod events;
pub mod recorder;

pub use events::{OverflowEvent, OverflowStats, SystemOverview};
pub use recorder::{AnalyticsRecorder, AnalyticsSink, JsonlFileSink};
