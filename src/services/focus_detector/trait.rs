use super::{AlwaysNotifyDetector, EnvironmentSnapshot, TmuxDetector, XdotoolDetector};
use crate::services::probe::CommandProbe;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Непрозрачный идентификатор окна терминала.
///
/// Осмыслен только для детектора, который его выдал. Сравнивается строго
/// посимвольно с результатом повторного запроса.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TerminalIdentity(String);

impl TerminalIdentity {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TerminalIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Композиция детекторов, для логов и диагностики
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectorKind {
    X11,
    AlwaysNotify,
    Multiplexer(Box<DetectorKind>),
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorKind::X11 => f.write_str("x11"),
            DetectorKind::AlwaysNotify => f.write_str("always-notify"),
            DetectorKind::Multiplexer(inner) => write!(f, "tmux({})", inner),
        }
    }
}

/// Trait for focus detectors
#[async_trait::async_trait]
pub trait FocusDetector: Send + Sync {
    /// Capture the identity of the terminal window. `None` means detection is
    /// unsupported here and the caller should always notify.
    async fn init(&self) -> Option<TerminalIdentity>;

    /// Re-query and compare against `identity`. Never fails, any probe
    /// failure reads as "not focused".
    async fn is_focused(&self, identity: &TerminalIdentity) -> bool;

    fn kind(&self) -> DetectorKind;
}

/// Factory function to build the detector for the captured environment.
///
/// The display-server detector is chosen first; tmux always wraps it from the
/// outside, never the other way round.
pub fn create_focus_detector(
    env: &EnvironmentSnapshot,
    probe: Arc<dyn CommandProbe>,
) -> Box<dyn FocusDetector> {
    let base: Box<dyn FocusDetector> = if env.has_x11() {
        Box::new(XdotoolDetector::new(probe.clone()))
    } else {
        Box::new(AlwaysNotifyDetector::new())
    };

    let detector: Box<dyn FocusDetector> = match env.multiplexer_pane.as_deref() {
        Some(pane) => Box::new(TmuxDetector::new(base, pane, probe)),
        None => base,
    };

    info!("Выбран детектор фокуса: {}", detector.kind());
    detector
}
