use std::env;

pub const SESSION_TYPE_VAR: &str = "XDG_SESSION_TYPE";
pub const DISPLAY_VAR: &str = "DISPLAY";
pub const MULTIPLEXER_PANE_VAR: &str = "TMUX_PANE";

/// Переменные окружения, от которых зависит выбор детектора.
/// Снимаются один раз при старте; пустое значение считается отсутствующим.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentSnapshot {
    pub session_type: Option<String>,
    pub display: Option<String>,
    pub multiplexer_pane: Option<String>,
}

impl EnvironmentSnapshot {
    pub fn new(
        session_type: Option<String>,
        display: Option<String>,
        multiplexer_pane: Option<String>,
    ) -> Self {
        Self {
            session_type: non_empty(session_type),
            display: non_empty(display),
            multiplexer_pane: non_empty(multiplexer_pane),
        }
    }

    pub fn capture() -> Self {
        Self::new(
            env::var(SESSION_TYPE_VAR).ok(),
            env::var(DISPLAY_VAR).ok(),
            env::var(MULTIPLEXER_PANE_VAR).ok(),
        )
    }

    /// X-сессия или хотя бы доступный X-дисплей (в том числе XWayland)
    pub fn has_x11(&self) -> bool {
        let x11_session = self
            .session_type
            .as_deref()
            .is_some_and(|session| session.eq_ignore_ascii_case("x11"));
        x11_session || self.display.is_some()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
