use crate::error::Result;
use crate::events::IncomingEvent;
use crate::services::notification_gate::{GateOutcome, NotificationGate};
use crate::trace_if_enabled;
use std::future::Future;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, info, warn};

/// Итог работы цикла событий
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopSummary {
    pub received: usize,
    pub ignored: usize,
    pub disabled: usize,
    pub focused: usize,
    pub dispatched: usize,
    pub failed: usize,
}

impl LoopSummary {
    fn record(&mut self, joined: std::result::Result<GateOutcome, JoinError>) {
        match joined {
            Ok(GateOutcome::Disabled) => self.disabled += 1,
            Ok(GateOutcome::Focused) => self.focused += 1,
            Ok(GateOutcome::Dispatched) => self.dispatched += 1,
            Err(e) => {
                warn!("Задача события упала: {}", e);
                self.failed += 1;
            }
        }
    }
}

/// Почему цикл перестал читать вход
enum Stop {
    Eof,
    Shutdown,
    ReadError(std::io::Error),
}

/// Читает события построчно (JSON на строку) и прогоняет их через гейт.
///
/// Каждое событие обрабатывается в отдельной задаче: проверки фокуса двух
/// быстрых событий могут идти параллельно. Битые строки (не JSON, не UTF-8) и
/// неизвестные события пропускаются. Чтение прекращается на EOF, ошибке чтения
/// или когда завершается `shutdown`; в любом случае уже принятые события
/// дообрабатываются до выхода.
pub async fn run_event_loop<R, S>(
    mut reader: R,
    gate: Arc<NotificationGate>,
    shutdown: S,
) -> Result<LoopSummary>
where
    R: AsyncBufRead + Unpin,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    let mut tasks = JoinSet::new();
    let mut summary = LoopSummary::default();
    let mut buf = Vec::new();

    let stop = loop {
        buf.clear();
        // Уже пришедшие строки читаем раньше сигнала завершения
        let read = tokio::select! {
            biased;
            read = reader.read_until(b'\n', &mut buf) => read,
            _ = &mut shutdown => break Stop::Shutdown,
        };
        match read {
            Ok(0) => break Stop::Eof,
            Ok(_) => {}
            Err(e) => break Stop::ReadError(e),
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!("Строка не в UTF-8 пропущена: {}", e);
                summary.received += 1;
                summary.ignored += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        trace_if_enabled!("Входная строка: {}", line);
        summary.received += 1;

        let event: IncomingEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Некорректное событие пропущено: {}", e);
                summary.ignored += 1;
                continue;
            }
        };

        let Some(kind) = event.kind() else {
            debug!("Неизвестное событие '{}' пропущено", event.event);
            summary.ignored += 1;
            continue;
        };

        let gate = gate.clone();
        tasks.spawn(async move { gate.handle(kind, &event.context).await });

        // Подбираем уже завершённые задачи, чтобы JoinSet не рос
        while let Some(joined) = tasks.try_join_next() {
            summary.record(joined);
        }
    };

    match &stop {
        Stop::Eof => info!("Поток событий закрыт"),
        Stop::Shutdown => info!("Завершение: дожидаемся {} событий в обработке", tasks.len()),
        Stop::ReadError(e) => error!("Ошибка чтения потока событий: {}", e),
    }

    while let Some(joined) = tasks.join_next().await {
        summary.record(joined);
    }

    info!(
        "Итог: получено {}, отправлено {}, в фокусе {}, выключено {}, пропущено {}, упало {}",
        summary.received,
        summary.dispatched,
        summary.focused,
        summary.disabled,
        summary.ignored,
        summary.failed
    );

    match stop {
        Stop::ReadError(e) => Err(e.into()),
        Stop::Eof | Stop::Shutdown => Ok(summary),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::events::EventKind;
    use crate::services::focus_detector::AlwaysNotifyDetector;
    use crate::services::notifier::DryRunNotifier;
    use std::future::{pending, ready};
    use tokio::io::{AsyncWriteExt, BufReader};

    async fn gate(config: Config) -> (Arc<NotificationGate>, Arc<DryRunNotifier>) {
        let notifier = Arc::new(DryRunNotifier::new());
        let gate = NotificationGate::initialize(
            Arc::new(config),
            Box::new(AlwaysNotifyDetector::new()),
            notifier.clone(),
        )
        .await;
        (Arc::new(gate), notifier)
    }

    #[tokio::test]
    async fn test_loop_dispatches_known_events() {
        let (gate, notifier) = gate(Config::default()).await;
        let input = concat!(
            "{\"event\":\"session.idle\"}\n",
            "\n",
            "{\"event\":\"permission.asked\",\"permission\":\"bash\",\"pattern\":\"git push\"}\n",
            "{\"event\":\"file.edited\"}\n",
            "not json at all\n",
            "{\"event\":\"question\",\"header\":\"Deploy\",\"question\":\"Ship it?\"}",
        );

        let summary = run_event_loop(input.as_bytes(), gate, pending()).await.unwrap();
        assert_eq!(
            summary,
            LoopSummary {
                received: 5,
                ignored: 2,
                disabled: 0,
                focused: 0,
                dispatched: 3,
                failed: 0,
            }
        );

        let mut bodies: Vec<(EventKind, String)> = notifier
            .delivered()
            .into_iter()
            .map(|n| (n.kind, n.body))
            .collect();
        bodies.sort_by_key(|(kind, _)| kind.as_str());
        assert_eq!(
            bodies,
            vec![
                (EventKind::Complete, "Session has finished".to_string()),
                (EventKind::Permission, "Session needs permission: bash (git push)".to_string()),
                (EventKind::Question, "Deploy: Ship it?".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_loop_respects_disabled_events() {
        let mut config = Config::default();
        config.events.error = false;
        let (gate, notifier) = gate(config).await;

        let input = "{\"event\":\"session.error\",\"error\":\"boom\"}\n".repeat(5);
        let summary = run_event_loop(input.as_bytes(), gate, pending()).await.unwrap();

        assert_eq!(summary.disabled, 5);
        assert_eq!(summary.dispatched, 0);
        assert!(notifier.delivered().is_empty());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let (gate, _) = gate(Config::default()).await;
        let summary = run_event_loop(&b""[..], gate, pending()).await.unwrap();
        assert_eq!(summary, LoopSummary::default());
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_is_skipped() {
        let (gate, notifier) = gate(Config::default()).await;
        let input: &[u8] = b"{\"event\":\"complete\"}\n\xff\xfe garbage\n{\"event\":\"error\"}\n";

        let summary = run_event_loop(input, gate, pending()).await.unwrap();
        assert_eq!(summary.received, 3);
        assert_eq!(summary.ignored, 1);
        assert_eq!(summary.dispatched, 2);
        assert_eq!(notifier.delivered().len(), 2);
    }

    #[tokio::test]
    async fn test_shutdown_drains_accepted_events() {
        let (gate, notifier) = gate(Config::default()).await;
        let (mut writer, server) = tokio::io::duplex(1024);
        writer
            .write_all(b"{\"event\":\"complete\"}\n{\"event\":\"question\"}\n")
            .await
            .unwrap();

        // Писатель жив, EOF не наступит: цикл выходит только по сигналу
        let summary = run_event_loop(BufReader::new(server), gate, ready(())).await.unwrap();
        assert_eq!(summary.received, 2);
        assert_eq!(summary.dispatched, 2);
        assert_eq!(notifier.delivered().len(), 2);
        drop(writer);
    }

    #[tokio::test]
    async fn test_shutdown_before_input() {
        let (gate, notifier) = gate(Config::default()).await;
        let (_client, server) = tokio::io::duplex(64);

        let summary = run_event_loop(BufReader::new(server), gate, ready(())).await.unwrap();
        assert_eq!(summary, LoopSummary::default());
        assert!(notifier.delivered().is_empty());
    }
}
