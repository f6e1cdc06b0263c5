use crate::coordinator::VerseCompletion;
use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Frame(NaiveDateTime),
    VersesResolved(VerseCompletion),
    Shutdown,
}
