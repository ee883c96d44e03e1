use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FocusNotifyError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FocusNotifyError>;

/// Почему внешний запрос не дал сигнала.
///
/// Все варианты для детекторов равнозначны: "сигнала нет".
/// Различаются они только для логов.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("утилита {0} не найдена")]
    Unavailable(String),

    #[error("не удалось запустить {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} не ответил за {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("{program} завершился с кодом {code:?}")]
    ExitStatus { program: String, code: Option<i32> },

    #[error("{0} вывел не UTF-8")]
    InvalidUtf8(String),
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;

