use super::r#trait::{DetectorKind, FocusDetector, TerminalIdentity};

/// Заглушка-идентификатор: нужна, чтобы гейт не отличал "нет детектора" от запасного
const PLACEHOLDER_IDENTITY: &str = "always-notify";

/// Запасной детектор для сред без сигнала фокуса (Wayland, tty, неизвестные сессии).
/// Терминал никогда не считается в фокусе.
#[derive(Debug, Default)]
pub struct AlwaysNotifyDetector;

impl AlwaysNotifyDetector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl FocusDetector for AlwaysNotifyDetector {
    async fn init(&self) -> Option<TerminalIdentity> {
        Some(TerminalIdentity::new(PLACEHOLDER_IDENTITY))
    }

    async fn is_focused(&self, _identity: &TerminalIdentity) -> bool {
        false
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::AlwaysNotify
    }
}
