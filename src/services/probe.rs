//! Command probe: a read-only external query bounded by a timeout.
//!
//! Every external tool (window query, multiplexer client, notification binary)
//! is optional. The probe turns spawn errors, non-zero exits, timeouts and
//! missing binaries into a `ProbeError`, and callers only ever see "signal" or
//! "no signal". Nothing here panics or propagates past the detector.

use crate::debug_if_enabled;
use crate::error::{ProbeError, ProbeResult};
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Фиксированный таймаут одного запроса
pub const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Утилита поиска бинарников в PATH
pub const PATH_RESOLVER: &str = "which";

#[async_trait::async_trait]
pub trait CommandProbe: Send + Sync {
    /// Выполнить команду и вернуть обрезанный stdout
    async fn query(&self, program: &str, args: &[&str]) -> ProbeResult<String>;

    /// Есть ли `program` в PATH: непустой успешный вывод `which`
    async fn exists(&self, program: &str) -> bool {
        match self.query(PATH_RESOLVER, &[program]).await {
            Ok(path) => !path.is_empty(),
            Err(e) => {
                debug_if_enabled!("{} не найден: {}", program, e);
                false
            }
        }
    }
}

/// Запуск настоящих дочерних процессов через tokio
pub struct SystemProbe {
    timeout: Duration,
}

impl Default for SystemProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe {
    pub fn new() -> Self {
        Self::with_timeout(PROBE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait::async_trait]
impl CommandProbe for SystemProbe {
    async fn query(&self, program: &str, args: &[&str]) -> ProbeResult<String> {
        debug_if_enabled!("Запрос: {} {:?}", program, args);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            // Зависший процесс убивается, когда таймаут бросает future
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(ProbeError::Unavailable(program.to_string()));
            }
            Ok(Err(source)) => {
                return Err(ProbeError::Spawn {
                    program: program.to_string(),
                    source,
                });
            }
            Err(_) => {
                return Err(ProbeError::Timeout {
                    program: program.to_string(),
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            return Err(ProbeError::ExitStatus {
                program: program.to_string(),
                code: output.status.code(),
            });
        }

        let stdout =
            String::from_utf8(output.stdout).map_err(|_| ProbeError::InvalidUtf8(program.to_string()))?;
        let trimmed = stdout.trim().to_string();
        debug_if_enabled!("{} ответил: '{}'", program, trimmed);
        Ok(trimmed)
    }
}
