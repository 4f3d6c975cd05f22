//! Output channels: speech and audio feedback.
//!
//! Both are fire-and-forget. The engine never waits on a sink and never
//! learns whether the text was actually spoken.

use std::fmt;
use std::sync::Arc;

use horizon_narrate_core::logging::targets;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Speech priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// May be dropped or queued behind other speech.
    Low,
    /// Regular navigation output.
    #[default]
    Normal,
    /// Interrupts whatever is being spoken.
    High,
}

/// Short non-speech audio cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackCue {
    /// An item was activated.
    Click,
    /// An action was refused.
    Reject,
    /// A minor state change, such as clearing a search.
    Tick,
    /// A node was expanded.
    ExpandOpen,
    /// A node was collapsed.
    ExpandClose,
}

/// Receives text to speak.
pub trait SpeechSink: Send + Sync {
    /// Speak `text` at the given priority.
    fn announce(&self, text: &str, priority: Priority);
}

/// Receives audio cues.
pub trait FeedbackSink: Send + Sync {
    /// Play a cue.
    fn play_feedback(&self, cue: FeedbackCue);
}

impl<T: SpeechSink + ?Sized> SpeechSink for Arc<T> {
    fn announce(&self, text: &str, priority: Priority) {
        (**self).announce(text, priority);
    }
}

impl<T: FeedbackSink + ?Sized> FeedbackSink for Arc<T> {
    fn play_feedback(&self, cue: FeedbackCue) {
        (**self).play_feedback(cue);
    }
}

/// The pair of sinks a session writes to.
#[derive(Clone)]
pub struct Outputs {
    speech: Arc<dyn SpeechSink>,
    feedback: Arc<dyn FeedbackSink>,
}

impl Outputs {
    /// Creates an output pair.
    pub fn new(speech: Arc<dyn SpeechSink>, feedback: Arc<dyn FeedbackSink>) -> Self {
        Self { speech, feedback }
    }

    /// Uses one sink for both channels.
    pub fn shared<S>(sink: Arc<S>) -> Self
    where
        S: SpeechSink + FeedbackSink + 'static,
    {
        Self {
            speech: sink.clone(),
            feedback: sink,
        }
    }

    pub(crate) fn speak(&self, text: &str, priority: Priority) {
        tracing::debug!(target: targets::ANNOUNCE, ?priority, "{text}");
        self.speech.announce(text, priority);
    }

    pub(crate) fn cue(&self, cue: FeedbackCue) {
        self.feedback.play_feedback(cue);
    }
}

impl fmt::Debug for Outputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outputs").finish_non_exhaustive()
    }
}

/// Logs speech and cues instead of producing sound.
///
/// Useful for headless hosts and for following a session in the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl SpeechSink for TracingSink {
    fn announce(&self, text: &str, priority: Priority) {
        tracing::info!(target: targets::ANNOUNCE, ?priority, text, "speak");
    }
}

impl FeedbackSink for TracingSink {
    fn play_feedback(&self, cue: FeedbackCue) {
        tracing::info!(target: targets::ANNOUNCE, ?cue, "cue");
    }
}

/// Records everything it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    speech: Mutex<Vec<(String, Priority)>>,
    cues: Mutex<Vec<FeedbackCue>>,
}

impl RecordingSink {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// All spoken texts, oldest first.
    pub fn announcements(&self) -> Vec<String> {
        self.speech.lock().iter().map(|(text, _)| text.clone()).collect()
    }

    /// The most recent spoken text and its priority.
    pub fn last(&self) -> Option<(String, Priority)> {
        self.speech.lock().last().cloned()
    }

    /// The most recent spoken text.
    pub fn last_announcement(&self) -> Option<String> {
        self.last().map(|(text, _)| text)
    }

    /// All cues, oldest first.
    pub fn cues(&self) -> Vec<FeedbackCue> {
        self.cues.lock().clone()
    }

    /// Forgets everything recorded so far.
    pub fn clear(&self) {
        self.speech.lock().clear();
        self.cues.lock().clear();
    }
}

impl SpeechSink for RecordingSink {
    fn announce(&self, text: &str, priority: Priority) {
        self.speech.lock().push((text.to_string(), priority));
    }
}

impl FeedbackSink for RecordingSink {
    fn play_feedback(&self, cue: FeedbackCue) {
        self.cues.lock().push(cue);
    }
}

static_assertions::assert_impl_all!(RecordingSink: Send, Sync);
static_assertions::assert_impl_all!(Outputs: Send, Sync);
