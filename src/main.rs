use cinema::config::Config;
use cinema::db;
use cinema::server::{CinemaState, cinema_router};
use cinema::service::Catalog;
use mimalloc::MiMalloc;
use std::error::Error;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::str::FromStr;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// What the process does between connect and disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Operate,
    Install,
    Uninstall,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "operate" => Ok(Mode::Operate),
            "install" => Ok(Mode::Install),
            "uninstall" => Ok(Mode::Uninstall),
            other => Err(format!(
                "unknown command `{other}`; expected operate, install or uninstall"
            )),
        }
    }
}

fn parse_mode(args: &[String]) -> Result<Mode, String> {
    match args {
        [] => Ok(Mode::Operate),
        [cmd] => cmd.parse(),
        _ => Err("at most one command may be given".to_string()),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = match parse_mode(&args) {
        Ok(mode) => mode,
        Err(msg) => {
            eprintln!("Incorrect command line arguments: {msg}");
            return ExitCode::FAILURE;
        }
    };

    let cfg = match Config::load_default() {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("Unable to load configuration: {err}");
            return ExitCode::FAILURE;
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        mode = ?mode,
        database_type = %cfg.database.kind,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        loglevel = %cfg.basic.loglevel
    );

    match run(mode, &cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "cinema stopped with an error");
            ExitCode::FAILURE
        }
    }
}

/// Connects, runs `mode`, and disconnects exactly once whatever the outcome.
async fn run(mode: Mode, cfg: &Config) -> Result<(), Box<dyn Error>> {
    let mut backend = db::select(&cfg.database)?;
    backend.connect().await?;

    let outcome = match backend.handle() {
        Ok(handle) => run_mode(mode, cfg, Catalog::new(handle)).await,
        Err(err) => Err(err.into()),
    };

    if let Err(err) = backend.disconnect().await {
        warn!(error = %err, "failed to disconnect from the database");
    }
    outcome
}

async fn run_mode(mode: Mode, cfg: &Config, catalog: Catalog) -> Result<(), Box<dyn Error>> {
    match mode {
        Mode::Install => catalog.install_schema().await?,
        Mode::Uninstall => catalog.uninstall_schema().await?,
        Mode::Operate => {
            let app = cinema_router(CinemaState::new(catalog));
            let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
            let listener = TcpListener::bind(addr).await?;
            info!("HTTP server listening on {}", addr);
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            info!("Server has shut down gracefully.");
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl+C received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn no_argument_means_operate() {
        assert_eq!(parse_mode(&args(&[])), Ok(Mode::Operate));
        assert_eq!(parse_mode(&args(&["operate"])), Ok(Mode::Operate));
    }

    #[test]
    fn schema_commands_are_recognized() {
        assert_eq!(parse_mode(&args(&["install"])), Ok(Mode::Install));
        assert_eq!(parse_mode(&args(&["uninstall"])), Ok(Mode::Uninstall));
    }

    #[test]
    fn unknown_or_extra_arguments_are_rejected() {
        assert!(parse_mode(&args(&["migrate"])).is_err());
        assert!(parse_mode(&args(&["install", "now"])).is_err());
    }
}
