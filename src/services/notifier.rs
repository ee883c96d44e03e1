use crate::events::EventKind;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

const NOTIFY_SEND: &str = "notify-send";
const PAPLAY: &str = "paplay";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Normal,
    Critical,
}

impl Urgency {
    pub fn for_event(kind: EventKind) -> Self {
        match kind {
            EventKind::Error | EventKind::Permission => Urgency::Critical,
            EventKind::Complete | EventKind::Question => Urgency::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

/// Готовое к отправке уведомление
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: EventKind,
    pub app_name: String,
    pub title: String,
    pub body: String,
    pub icon: Option<String>,
    pub sound: Option<PathBuf>,
    pub urgency: Urgency,
    pub expire: Duration,
}

/// Доставка уведомлений. Best-effort: ошибки глотаются внутри и наружу не выходят.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, notification: Notification);
}

/// Factory function to create a notifier based on the dry_run flag
pub fn create_notifier(dry_run: bool) -> Arc<dyn Notifier> {
    if dry_run {
        Arc::new(DryRunNotifier::new())
    } else {
        Arc::new(DesktopNotifier::new())
    }
}

/// Уведомления через notify-send, звук через paplay
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }

    fn notify_send_args(notification: &Notification) -> Vec<String> {
        let mut args = vec![
            format!("--app-name={}", notification.app_name),
            format!("--urgency={}", notification.urgency.as_str()),
            format!("--expire-time={}", notification.expire.as_millis()),
        ];
        if let Some(icon) = &notification.icon {
            args.push(format!("--icon={}", icon));
        }
        args.push(notification.title.clone());
        args.push(notification.body.clone());
        args
    }

    /// Запустить процесс и не ждать его. Процесс дожидается фоновая задача.
    fn spawn_detached(program: &str, args: &[String]) {
        let spawned = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();

        match spawned {
            Ok(mut child) => {
                let program = program.to_string();
                tokio::spawn(async move {
                    match child.wait().await {
                        Ok(status) if !status.success() => {
                            debug!("{} завершился с {}", program, status);
                        }
                        Ok(_) => {}
                        Err(e) => debug!("Не удалось дождаться {}: {}", program, e),
                    }
                });
            }
            Err(e) => debug!("Не удалось запустить {}: {}", program, e),
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DesktopNotifier {
    async fn deliver(&self, notification: Notification) {
        debug!("Отправка уведомления [{}]: {}", notification.kind, notification.body);
        Self::spawn_detached(NOTIFY_SEND, &Self::notify_send_args(&notification));

        if let Some(sound) = &notification.sound {
            Self::spawn_detached(PAPLAY, &[sound.display().to_string()]);
        }
    }
}

/// Режим сухого запуска: уведомления только логируются и запоминаются
#[derive(Debug, Default)]
pub struct DryRunNotifier {
    delivered: Mutex<Vec<Notification>>,
}

impl DryRunNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn delivered(&self) -> Vec<Notification> {
        self.delivered.lock().clone()
    }
}

#[async_trait::async_trait]
impl Notifier for DryRunNotifier {
    async fn deliver(&self, notification: Notification) {
        info!(
            "Dry-run: уведомление [{}] \"{}\": {}",
            notification.kind, notification.title, notification.body
        );
        self.delivered.lock().push(notification);
    }
}
