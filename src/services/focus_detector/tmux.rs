use super::r#trait::{DetectorKind, FocusDetector, TerminalIdentity};
use crate::services::probe::CommandProbe;
use std::sync::Arc;
use tracing::debug;

const TMUX: &str = "tmux";
const SESSION_ATTACHED: &str = "#{session_attached}";
const WINDOW_ACTIVE: &str = "#{window_active}";

/// Декоратор для процессов внутри tmux.
///
/// Идентификатор целиком берётся у внутреннего детектора: tmux добавляет
/// только условие, а не новый уровень идентичности. Терминал в фокусе, только
/// если в фокусе внешнее окно, сессия панели подключена к клиенту и окно
/// панели активно в этой сессии.
pub struct TmuxDetector {
    inner: Box<dyn FocusDetector>,
    pane: String,
    probe: Arc<dyn CommandProbe>,
}

impl TmuxDetector {
    pub fn new(inner: Box<dyn FocusDetector>, pane: impl Into<String>, probe: Arc<dyn CommandProbe>) -> Self {
        Self {
            inner,
            pane: pane.into(),
            probe,
        }
    }

    /// Флаг формата tmux для нашей панели. Всё, кроме ровно "1", — ложь.
    async fn pane_flag(&self, format: &str) -> bool {
        match self
            .probe
            .query(TMUX, &["display-message", "-p", "-t", self.pane.as_str(), format])
            .await
        {
            Ok(value) => value == "1",
            Err(e) => {
                debug!("tmux {} для панели {} недоступен: {}", format, self.pane, e);
                false
            }
        }
    }
}

#[async_trait::async_trait]
impl FocusDetector for TmuxDetector {
    async fn init(&self) -> Option<TerminalIdentity> {
        self.inner.init().await
    }

    async fn is_focused(&self, identity: &TerminalIdentity) -> bool {
        if !self.inner.is_focused(identity).await {
            return false;
        }

        if !self.pane_flag(SESSION_ATTACHED).await {
            debug!("Сессия панели {} не подключена", self.pane);
            return false;
        }

        self.pane_flag(WINDOW_ACTIVE).await
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::Multiplexer(Box::new(self.inner.kind()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::probe::testing::ScriptedProbe;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const PANE: &str = "%7";
    const ATTACHED: &str = "tmux display-message -p -t %7 #{session_attached}";
    const ACTIVE: &str = "tmux display-message -p -t %7 #{window_active}";

    /// Внутренний детектор с фиксированным ответом
    struct FakeDetector {
        focused: bool,
        init_calls: Arc<AtomicUsize>,
    }

    impl FakeDetector {
        fn boxed(focused: bool) -> Box<dyn FocusDetector> {
            Box::new(Self {
                focused,
                init_calls: Arc::new(AtomicUsize::new(0)),
            })
        }
    }

    #[async_trait::async_trait]
    impl FocusDetector for FakeDetector {
        async fn init(&self) -> Option<TerminalIdentity> {
            self.init_calls.fetch_add(1, Ordering::SeqCst);
            Some(TerminalIdentity::new("fake-window"))
        }

        async fn is_focused(&self, _identity: &TerminalIdentity) -> bool {
            self.focused
        }

        fn kind(&self) -> DetectorKind {
            DetectorKind::X11
        }
    }

    fn flag(value: bool) -> &'static str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    async fn check(inner: bool, attached: bool, active: bool) -> bool {
        let probe = Arc::new(
            ScriptedProbe::new()
                .respond(ATTACHED, flag(attached))
                .respond(ACTIVE, flag(active)),
        );
        let detector = TmuxDetector::new(FakeDetector::boxed(inner), PANE, probe);
        detector.is_focused(&TerminalIdentity::new("fake-window")).await
    }

    #[tokio::test]
    async fn test_truth_table() {
        for inner in [false, true] {
            for attached in [false, true] {
                for active in [false, true] {
                    let expected = inner && attached && active;
                    assert_eq!(
                        check(inner, attached, active).await,
                        expected,
                        "inner={} attached={} active={}",
                        inner,
                        attached,
                        active
                    );
                }
            }
        }
    }

    #[tokio::test]
    async fn test_unfocused_inner_skips_tmux() {
        // Ни одного ответа tmux: если бы детектор спросил, получил бы ошибку
        let probe = Arc::new(ScriptedProbe::new());
        let detector = TmuxDetector::new(FakeDetector::boxed(false), PANE, probe.clone());

        assert!(!detector.is_focused(&TerminalIdentity::new("fake-window")).await);
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn test_detached_session_skips_window_query() {
        let probe = Arc::new(ScriptedProbe::new().respond(ATTACHED, "0").respond(ACTIVE, "1"));
        let detector = TmuxDetector::new(FakeDetector::boxed(true), PANE, probe.clone());

        assert!(!detector.is_focused(&TerminalIdentity::new("fake-window")).await);
        assert_eq!(probe.calls(), vec![ATTACHED]);
    }

    #[tokio::test]
    async fn test_unexpected_output_is_false() {
        // Несколько клиентов или мусор в выводе — не "1"
        let probe = Arc::new(ScriptedProbe::new().respond(ATTACHED, "2").respond(ACTIVE, "1"));
        let detector = TmuxDetector::new(FakeDetector::boxed(true), PANE, probe);
        assert!(!detector.is_focused(&TerminalIdentity::new("fake-window")).await);
    }

    #[tokio::test]
    async fn test_unexpected_window_output_is_false() {
        for output in ["2", "yes", ""] {
            let probe = Arc::new(ScriptedProbe::new().respond(ATTACHED, "1").respond(ACTIVE, output));
            let detector = TmuxDetector::new(FakeDetector::boxed(true), PANE, probe.clone());
            assert!(
                !detector.is_focused(&TerminalIdentity::new("fake-window")).await,
                "window_active = '{}'",
                output
            );
            assert_eq!(probe.calls(), vec![ATTACHED, ACTIVE]);
        }
    }

    #[tokio::test]
    async fn test_tmux_failure_is_false() {
        let probe = Arc::new(ScriptedProbe::new().respond(ATTACHED, "1").fail(ACTIVE));
        let detector = TmuxDetector::new(FakeDetector::boxed(true), PANE, probe);
        assert!(!detector.is_focused(&TerminalIdentity::new("fake-window")).await);
    }

    #[tokio::test]
    async fn test_init_delegates_to_inner() {
        let init_calls = Arc::new(AtomicUsize::new(0));
        let inner = Box::new(FakeDetector {
            focused: true,
            init_calls: init_calls.clone(),
        });
        let probe = Arc::new(ScriptedProbe::new());
        let detector = TmuxDetector::new(inner, PANE, probe.clone());

        assert_eq!(detector.init().await, Some(TerminalIdentity::new("fake-window")));
        assert_eq!(init_calls.load(Ordering::SeqCst), 1);
        assert!(probe.calls().is_empty());
    }
}
