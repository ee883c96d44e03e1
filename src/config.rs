use crate::events::EventKind;
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Префикс переменных окружения, перекрывающих файл конфигурации
pub const ENV_PREFIX: &str = "FOCUS_NOTIFY_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub notification: NotificationConfig,
    pub sound: SoundConfig,
    pub events: EventToggles,
    pub messages: EventMessages,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    pub app_name: String,
    pub title: String,
    pub icon: Option<String>,
    pub timeout_secs: u64,
    pub body_max_length: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SoundConfig {
    pub enabled: bool,
    pub complete: Option<PathBuf>,
    pub error: Option<PathBuf>,
    pub permission: Option<PathBuf>,
    pub question: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventToggles {
    pub complete: bool,
    pub error: bool,
    pub permission: bool,
    pub question: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EventMessages {
    pub complete: String,
    pub error: String,
    pub permission: String,
    pub question: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            app_name: "focus-notify".to_string(),
            title: "Terminal".to_string(),
            icon: None,
            timeout_secs: 5,
            body_max_length: 200,
        }
    }
}

impl Default for EventToggles {
    fn default() -> Self {
        Self {
            complete: true,
            error: true,
            permission: true,
            question: true,
        }
    }
}

impl Default for EventMessages {
    fn default() -> Self {
        Self {
            complete: "Session has finished".to_string(),
            error: "Session encountered an error".to_string(),
            permission: "Session needs permission".to_string(),
            question: "Session has a question".to_string(),
        }
    }
}

impl Config {
    /// Загрузить конфигурацию. Никогда не падает: при любой ошибке
    /// возвращаются значения по умолчанию.
    pub fn load<P: AsRef<Path>>(config_path: P) -> Self {
        match Self::try_load(config_path.as_ref()) {
            Ok(config) => config,
            Err(e) => {
                warn!("Конфигурация отклонена, используем значения по умолчанию: {:#}", e);
                Self::default()
            }
        }
    }

    /// Отсутствующий файл не ошибка: figment просто пропускает его.
    pub fn try_load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Json::file(config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    /// `<config_dir>/focus-notify/config.json`, либо файл в текущем каталоге
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("focus-notify").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("focus-notify.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.notification.title.trim().is_empty() {
            anyhow::bail!("notification.title не может быть пустым");
        }

        if self.notification.timeout_secs == 0 {
            anyhow::bail!("notification.timeout_secs должно быть больше 0");
        }

        if self.notification.body_max_length == 0 {
            anyhow::bail!("notification.body_max_length должно быть больше 0");
        }

        Ok(())
    }

    /// Включена ли категория. Глобальный выключатель имеет приоритет.
    pub fn is_event_enabled(&self, kind: EventKind) -> bool {
        if !self.notification.enabled {
            return false;
        }

        match kind {
            EventKind::Complete => self.events.complete,
            EventKind::Error => self.events.error,
            EventKind::Permission => self.events.permission,
            EventKind::Question => self.events.question,
        }
    }

    pub fn message_for(&self, kind: EventKind) -> &str {
        match kind {
            EventKind::Complete => &self.messages.complete,
            EventKind::Error => &self.messages.error,
            EventKind::Permission => &self.messages.permission,
            EventKind::Question => &self.messages.question,
        }
    }

    /// Звуковой файл для категории, если звук включён
    pub fn sound_for(&self, kind: EventKind) -> Option<&Path> {
        if !self.sound.enabled {
            return None;
        }

        let path = match kind {
            EventKind::Complete => &self.sound.complete,
            EventKind::Error => &self.sound.error,
            EventKind::Permission => &self.sound.permission,
            EventKind::Question => &self.sound.question,
        };
        path.as_deref()
    }
}
