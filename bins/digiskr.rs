use std::process::ExitCode;

use configs::{ConfigStore, LoadError};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Exit status when validation fails.
const EXIT_INVALID: u8 = 1;
/// Exit status when no configuration could be loaded or the command line is wrong.
const EXIT_FATAL: u8 = 2;

fn init_logging() {
    // .env 需在日志初始化之前加载，RUST_LOG / LOG_FORMAT 才能生效
    dotenv().ok();
    common::utils::logging::init_logging_from_env();
    info!(service = "digiskr", event = "logger_init", "tracing subscriber initialized");
}

struct Args {
    store: bool,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut args = Args { store: false };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--store" => args.store = true,
            other => anyhow::bail!("unknown argument `{other}` (usage: digiskr [--store])"),
        }
    }
    Ok(args)
}

fn run(store: &ConfigStore, args: &Args) -> Result<ExitCode, LoadError> {
    let settings = store.get()?;
    info!(
        service = "digiskr",
        event = "config_loaded",
        path = %store.source().map(|p| p.display().to_string()).unwrap_or_default(),
        keys = settings.len(),
        "configuration ready"
    );

    if args.store {
        store.store()?;
    }

    let errors = store.validate_config()?;
    if errors.is_empty() {
        info!(service = "digiskr", event = "config_valid", "configuration is valid");
        return Ok(ExitCode::SUCCESS);
    }
    for e in &errors {
        error!(service = "digiskr", event = "config_invalid", key = %e.key, "{e}");
    }
    warn!(service = "digiskr", count = errors.len(), "refusing to start with an invalid configuration");
    Ok(ExitCode::from(EXIT_INVALID))
}

fn main() -> ExitCode {
    init_logging();

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new(move |info| {
        error!(
            service = "digiskr",
            event = "panic",
            %service_id,
            pid,
            message = %info,
            "unhandled panic occurred"
        );
    }));

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            error!(service = "digiskr", event = "bad_args", error = %e, "invalid command line");
            return ExitCode::from(EXIT_FATAL);
        }
    };

    info!(service = "digiskr", event = "start", %service_id, pid, version, "digiskr starting");

    // 启动时只构建一次，之后按引用传递给各子系统
    let store = ConfigStore::from_env();
    match run(&store, &args) {
        Ok(code) => code,
        Err(e) => {
            error!(
                service = "digiskr",
                event = "config_load_failed",
                candidates = ?store.candidates(),
                error = %e,
                "cannot continue without configuration"
            );
            ExitCode::from(EXIT_FATAL)
        }
    }
}
