use super::r#trait::{DetectorKind, FocusDetector, TerminalIdentity};
use crate::error::ProbeResult;
use crate::services::probe::CommandProbe;
use std::sync::Arc;
use tracing::{debug, info};

const XDOTOOL: &str = "xdotool";

/// Детектор для X11: идентификатор терминала — id активного окна на момент старта
pub struct XdotoolDetector {
    probe: Arc<dyn CommandProbe>,
}

impl XdotoolDetector {
    pub fn new(probe: Arc<dyn CommandProbe>) -> Self {
        Self { probe }
    }

    async fn get_active_window(&self) -> ProbeResult<String> {
        self.probe.query(XDOTOOL, &["getactivewindow"]).await
    }
}

#[async_trait::async_trait]
impl FocusDetector for XdotoolDetector {
    async fn init(&self) -> Option<TerminalIdentity> {
        if !self.probe.exists(XDOTOOL).await {
            info!("xdotool не найден, определение фокуса недоступно");
            return None;
        }

        match self.get_active_window().await {
            Ok(window_id) if !window_id.is_empty() => {
                debug!("xdotool: окно терминала '{}'", window_id);
                Some(TerminalIdentity::new(window_id))
            }
            Ok(_) => {
                info!("xdotool вернул пустой id окна, определение фокуса недоступно");
                None
            }
            Err(e) => {
                info!("Не удалось получить активное окно через xdotool: {}", e);
                None
            }
        }
    }

    async fn is_focused(&self, identity: &TerminalIdentity) -> bool {
        match self.get_active_window().await {
            Ok(window_id) => window_id == identity.as_str(),
            Err(e) => {
                debug!("xdotool не ответил, считаем окно не в фокусе: {}", e);
                false
            }
        }
    }

    fn kind(&self) -> DetectorKind {
        DetectorKind::X11
    }
}
