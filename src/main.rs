use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::signal;
use tracing::{error, info, warn};
mod config;
mod error;
mod events;
mod services;
mod utils;

use config::Config;
use events::{EventContext, EventKind};
use services::focus_detector::TerminalIdentity;
use services::{
    create_focus_detector, create_notifier, run_event_loop, EnvironmentSnapshot, NotificationGate,
    SystemProbe,
};

#[derive(Parser, Debug)]
#[command(name = "focus-notify")]
#[command(about = "Десктопные уведомления, которые молчат, пока терминал в фокусе")]
struct Args {
    /// Путь к файлу конфигурации (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Режим сухого запуска (уведомления только логируются)
    #[arg(long)]
    dry_run: bool,

    /// Уровень логирования
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Читать события из stdin (JSON на строку) до EOF или Ctrl+C
    Listen,

    /// Напечатать идентификатор текущего окна терминала
    Identify,

    /// Обработать одно событие
    Notify {
        /// Имя события: complete, error, permission, question или событие хоста
        event: String,

        /// Идентификатор терминала, полученный ранее через `identify`
        #[arg(long)]
        identity: Option<String>,

        #[arg(long)]
        error: Option<String>,

        #[arg(long)]
        permission: Option<String>,

        #[arg(long)]
        pattern: Option<String>,

        #[arg(long)]
        question: Option<String>,

        #[arg(long)]
        header: Option<String>,
    },

    /// Показать выбранный детектор и текущее состояние фокуса
    Detect,
}

/// Сколько ждём фоновые задачи при выходе
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    let args = Args::parse();

    // Инициализация системы логирования
    init_tracing(&args.log_level)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(run(args));

    // Чтение stdin в tokio идёт в блокирующем потоке, который нельзя прервать:
    // без таймаута выход после Ctrl+C ждал бы следующей строки
    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    result
}

async fn run(args: Args) -> Result<()> {
    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    let config = Arc::new(Config::load(&config_path));
    info!("Конфигурация: {:?}", config_path);

    if args.dry_run {
        warn!("Режим сухого запуска - уведомления не отправляются");
    }

    let environment = EnvironmentSnapshot::capture();
    info!("Окружение: {:?}", environment);

    let probe = Arc::new(SystemProbe::new());
    let detector = create_focus_detector(&environment, probe);
    let notifier = create_notifier(args.dry_run);

    match args.command {
        Command::Listen => {
            let gate = Arc::new(NotificationGate::initialize(config, detector, notifier).await);
            let reader = BufReader::new(tokio::io::stdin());

            let shutdown = async {
                match signal::ctrl_c().await {
                    Ok(()) => info!("Получен сигнал завершения (Ctrl+C)"),
                    Err(err) => {
                        // Без обработчика сигнала читаем до EOF
                        error!("Ошибка при ожидании сигнала завершения: {}", err);
                        std::future::pending::<()>().await;
                    }
                }
            };
            run_event_loop(reader, gate, shutdown).await?;
        }
        Command::Identify => {
            if let Some(identity) = detector.init().await {
                println!("{}", identity);
            }
        }
        Command::Notify {
            event,
            identity,
            error,
            permission,
            pattern,
            question,
            header,
        } => {
            let Some(kind) = EventKind::from_name(&event) else {
                info!("Неизвестное событие '{}' пропущено", event);
                return Ok(());
            };

            let context = EventContext {
                error,
                permission,
                pattern,
                question,
                header,
            };
            let identity = identity
                .filter(|id| !id.is_empty())
                .map(TerminalIdentity::new);
            let gate = NotificationGate::with_identity(config, detector, notifier, identity);
            let outcome = gate.handle(kind, &context).await;
            info!("Событие {}: {:?}", kind, outcome);
        }
        Command::Detect => {
            let gate = NotificationGate::initialize(config, detector, notifier).await;
            println!("detector: {}", gate.detector().kind());
            match gate.identity() {
                Some(identity) => println!("identity: {}", identity),
                None => println!("identity: unsupported"),
            }
            println!("focused: {}", gate.is_terminal_focused().await);
        }
    }

    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))?;

    // stdout занят выводом identify/detect
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .init();

    Ok(())
}
