use crate::config::Config;
use crate::events::{EventContext, EventKind};
use crate::services::focus_detector::{FocusDetector, TerminalIdentity};
use crate::services::notifier::{Notification, Notifier, Urgency};
use crate::utils::{collapse_whitespace, truncate_body};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Чем закончилась обработка одного события
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// Категория выключена в конфигурации
    Disabled,
    /// Пользователь смотрит на терминал
    Focused,
    Dispatched,
}

/// Решает для каждого события: отправлять уведомление или нет.
///
/// Порядок проверок фиксирован: включена ли категория, затем фокус, затем
/// доставка. Идентификатор терминала снимается один раз и больше не меняется,
/// поэтому гейт можно вызывать из нескольких задач одновременно.
pub struct NotificationGate {
    config: Arc<Config>,
    detector: Box<dyn FocusDetector>,
    notifier: Arc<dyn Notifier>,
    identity: Option<TerminalIdentity>,
}

impl NotificationGate {
    /// Создать гейт и снять идентификатор терминала через детектор
    pub async fn initialize(
        config: Arc<Config>,
        detector: Box<dyn FocusDetector>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let identity = detector.init().await;
        match &identity {
            Some(identity) => info!("Терминал {} ({})", identity, detector.kind()),
            None => info!("Фокус не определяется ({}), уведомляем всегда", detector.kind()),
        }
        Self::with_identity(config, detector, notifier, identity)
    }

    /// Гейт с заранее известным идентификатором (например, переданным из shell-хука)
    pub fn with_identity(
        config: Arc<Config>,
        detector: Box<dyn FocusDetector>,
        notifier: Arc<dyn Notifier>,
        identity: Option<TerminalIdentity>,
    ) -> Self {
        Self {
            config,
            detector,
            notifier,
            identity,
        }
    }

    pub fn identity(&self) -> Option<&TerminalIdentity> {
        self.identity.as_ref()
    }

    pub fn detector(&self) -> &dyn FocusDetector {
        self.detector.as_ref()
    }

    /// В фокусе ли терминал сейчас. Без идентификатора — никогда.
    pub async fn is_terminal_focused(&self) -> bool {
        match &self.identity {
            Some(identity) => self.detector.is_focused(identity).await,
            None => false,
        }
    }

    pub async fn handle(&self, kind: EventKind, context: &EventContext) -> GateOutcome {
        if !self.config.is_event_enabled(kind) {
            debug!("Событие {} выключено", kind);
            return GateOutcome::Disabled;
        }

        if self.is_terminal_focused().await {
            debug!("Терминал в фокусе, событие {} без уведомления", kind);
            return GateOutcome::Focused;
        }

        self.notifier.deliver(self.compose(kind, context)).await;
        GateOutcome::Dispatched
    }

    fn compose(&self, kind: EventKind, context: &EventContext) -> Notification {
        let notification = &self.config.notification;
        let body = context.compose_body(kind, self.config.message_for(kind));
        let body = truncate_body(&collapse_whitespace(&body), notification.body_max_length);

        Notification {
            kind,
            app_name: notification.app_name.clone(),
            title: notification.title.clone(),
            body,
            icon: notification.icon.clone(),
            sound: self.config.sound_for(kind).map(|path| path.to_path_buf()),
            urgency: Urgency::for_event(kind),
            expire: Duration::from_secs(notification.timeout_secs),
        }
    }
}
