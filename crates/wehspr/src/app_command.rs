/// Commands sent from the shortcut router to the main application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Begin a new recording session.
    StartRecording,
    /// Stop the in-flight recording and transcribe it.
    StopRecording,
    /// Deliver the cached transcript to the active application.
    Paste,
    /// Request application shutdown.
    Shutdown,
}
