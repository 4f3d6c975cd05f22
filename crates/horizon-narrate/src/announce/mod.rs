//! Spoken output: formatting and sinks.

mod formatter;
mod sink;

pub use formatter::{AnnouncementFormatter, ItemDescription, SearchContext};
pub use sink::{
    FeedbackCue, FeedbackSink, Outputs, Priority, RecordingSink, SpeechSink, TracingSink,
};
