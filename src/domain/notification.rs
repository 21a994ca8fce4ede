// Client directives returned by user-facing actions
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientAction {
    DisplayNotification {
        message: String,
        level: NotificationLevel,
        sticky: bool,
    },
    /// Ask the client to reload the current view
    Reload,
}

impl ClientAction {
    pub fn notify(message: impl Into<String>, level: NotificationLevel) -> Self {
        ClientAction::DisplayNotification {
            message: message.into(),
            level,
            sticky: false,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::notify(message, NotificationLevel::Warning)
    }
}
