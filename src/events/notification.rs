use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Категория события, на которую может сработать уведомление
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Complete,
    Error,
    Permission,
    Question,
}

// Статическая карта имён событий: канонические имена и имена событий хоста
static EVENT_NAMES: Lazy<HashMap<&'static str, EventKind>> = Lazy::new(|| {
    let mut map = HashMap::new();

    // Канонические имена
    map.insert("complete", EventKind::Complete);
    map.insert("error", EventKind::Error);
    map.insert("permission", EventKind::Permission);
    map.insert("question", EventKind::Question);

    // События хоста
    map.insert("idle", EventKind::Complete);
    map.insert("session.idle", EventKind::Complete);
    map.insert("session.error", EventKind::Error);
    map.insert("permission.updated", EventKind::Permission);
    map.insert("permission.asked", EventKind::Permission);
    map.insert("permission.request", EventKind::Permission);
    map.insert("question.asked", EventKind::Question);

    map
});

impl EventKind {
    #[allow(dead_code)]
    pub const ALL: [EventKind; 4] = [
        EventKind::Complete,
        EventKind::Error,
        EventKind::Permission,
        EventKind::Question,
    ];

    /// Найти категорию по имени события (регистронезависимо)
    pub fn from_name(name: &str) -> Option<Self> {
        EVENT_NAMES.get(name.trim().to_lowercase().as_str()).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Complete => "complete",
            EventKind::Error => "error",
            EventKind::Permission => "permission",
            EventKind::Question => "question",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Необязательные поля, из которых собирается текст уведомления.
/// Живёт ровно один вызов гейта.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventContext {
    pub error: Option<String>,
    pub permission: Option<String>,
    pub pattern: Option<String>,
    pub question: Option<String>,
    pub header: Option<String>,
}

impl EventContext {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[allow(dead_code)]
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    #[allow(dead_code)]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    #[allow(dead_code)]
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    #[allow(dead_code)]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Собрать тело уведомления. `message` — текст по умолчанию для категории.
    /// Пустые поля считаются отсутствующими.
    pub fn compose_body(&self, kind: EventKind, message: &str) -> String {
        let error = non_empty(&self.error);
        let permission = non_empty(&self.permission);
        let pattern = non_empty(&self.pattern);
        let question = non_empty(&self.question);
        let header = non_empty(&self.header);

        match kind {
            EventKind::Complete => message.to_string(),
            EventKind::Error => match error {
                Some(error) => format!("{}: {}", message, error),
                None => message.to_string(),
            },
            EventKind::Permission => {
                let mut body = match permission {
                    Some(permission) => format!("{}: {}", message, permission),
                    None => message.to_string(),
                };
                if let Some(pattern) = pattern {
                    body.push_str(&format!(" ({})", pattern));
                }
                body
            }
            EventKind::Question => match (header, question) {
                (Some(header), Some(question)) => format!("{}: {}", header, question),
                (None, Some(question)) => question.to_string(),
                _ => message.to_string(),
            },
        }
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Одна строка входного потока событий: `{"event": "...", ...поля контекста}`
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingEvent {
    pub event: String,
    #[serde(flatten)]
    pub context: EventContext,
}

impl IncomingEvent {
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_name(&self.event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert_eq!(EventKind::from_name("complete"), Some(EventKind::Complete));
        assert_eq!(EventKind::from_name("Session.Idle"), Some(EventKind::Complete));
        assert_eq!(EventKind::from_name("session.error"), Some(EventKind::Error));
        assert_eq!(EventKind::from_name("permission.asked"), Some(EventKind::Permission));
        assert_eq!(EventKind::from_name(" question.asked "), Some(EventKind::Question));
        assert_eq!(EventKind::from_name("file.edited"), None);
        assert_eq!(EventKind::from_name(""), None);
    }

    #[test]
    fn test_canonical_names_round_trip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_name(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_compose_error_body() {
        let ctx = EventContext::new().with_error("disk full");
        assert_eq!(ctx.compose_body(EventKind::Error, "Error"), "Error: disk full");
        assert_eq!(EventContext::new().compose_body(EventKind::Error, "Error"), "Error");
    }

    #[test]
    fn test_compose_permission_body() {
        let ctx = EventContext::new().with_permission("bash").with_pattern("rm *");
        assert_eq!(
            ctx.compose_body(EventKind::Permission, "Permission needed"),
            "Permission needed: bash (rm *)"
        );
    }

    #[test]
    fn test_compose_question_body() {
        let ctx = EventContext::new().with_question("Proceed?").with_header("Deploy");
        assert_eq!(ctx.compose_body(EventKind::Question, "Question"), "Deploy: Proceed?");

        let ctx = EventContext::new().with_question("Proceed?");
        assert_eq!(ctx.compose_body(EventKind::Question, "Question"), "Proceed?");

        let ctx = EventContext::new().with_header("Deploy");
        assert_eq!(ctx.compose_body(EventKind::Question, "Question"), "Question");
    }

    #[test]
    fn test_blank_fields_are_ignored() {
        let ctx = EventContext::new().with_error("   ");
        assert_eq!(ctx.compose_body(EventKind::Error, "Error"), "Error");
    }

    #[test]
    fn test_parse_incoming_event() {
        let event: IncomingEvent =
            serde_json::from_str(r#"{"event":"permission.asked","permission":"edit","pattern":"src/*"}"#)
                .unwrap();
        assert_eq!(event.kind(), Some(EventKind::Permission));
        assert_eq!(event.context.permission.as_deref(), Some("edit"));
        assert_eq!(event.context.pattern.as_deref(), Some("src/*"));
        assert_eq!(event.context.error, None);
    }
}
