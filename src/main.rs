use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use wbest_receiver::{
    config::{Config, DEFAULT_DATA_PORT},
    server::{Server, Shutdown},
};

/// Receiver of a wireless bandwidth estimation probe sender.
#[derive(Debug, Parser)]
#[command(name = "wbest-rcv", version)]
struct Opt {
    /// UDP port probes are received on
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_DATA_PORT)]
    port: u16,
}

async fn run(opt: Opt) -> wbest_receiver::error::Result<Shutdown> {
    let config = Config {
        data_port: opt.port,
        ..Default::default()
    };
    let server = Server::bind(config).await?;
    server
        .serve(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for interrupt");
                std::future::pending::<()>().await;
            }
        })
        .await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let opt = Opt::parse();
    match run(opt).await {
        Ok(reason) => {
            info!(?reason, "Receiver is now off");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Receiver failed");
            ExitCode::FAILURE
        }
    }
}
