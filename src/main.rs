mod config;
mod metrics;
mod prober;

use config::{AppConfig, LogFormat};
use prober::Prober;

use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() != 2 {
        let program = args.first().map(String::as_str).unwrap_or("tcp-ping");
        println!("Usage: {} <IP>", program);
        return Ok(());
    }
    let target = &args[1];

    let config = AppConfig::load().await?;
    let log_level = config.tracing_level()?;

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("tcp_ping={}", log_level.as_str().to_lowercase()).parse()?);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    let prober = Prober::new(config.probe_config());
    tracing::debug!(
        "probing {} on {} ports, {:?} per attempt",
        target,
        prober.config().ports().len(),
        prober.config().timeout()
    );
    if prober.check_host(target).await {
        println!("{} is up!", target);
    } else {
        println!("{} is down!", target);
    }

    if config.print_metrics {
        eprint!("{}", metrics::render()?);
    }

    Ok(())
}
