mod cli;
mod config;
mod errors;
mod util;

use clap::Parser;
use cli::AppCli;
use config::AppConfig;
use rtmp_server::server::RtmpServer;
use stream_center::stream_center::StreamCenter;
use time::macros::format_description;
use tokio::signal;
use tracing::{self, Dispatch, Level};
use tracing_appender::rolling;
use tracing_subscriber::{self, EnvFilter, fmt::time::LocalTime};
use util::parse_log_level;

#[tokio::main]
async fn main() {
    let cli_args = AppCli::parse();
    let mut app_config = AppConfig::new(cli_args.config.as_ref().map(|p| p.display().to_string()))
        .expect("failed to load app config");
    app_config.apply(cli_args).expect("invalid cli override");
    app_config.validate().expect("invalid app config");

    let log_level = parse_log_level(&app_config.logger.level).unwrap_or(Level::INFO);
    let file_appender = rolling::daily(&app_config.logger.dir, "yam_server.log");
    let (non_blocking_appender, _guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_timer(LocalTime::new(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second] [unix_timestamp precision:nanosecond]"
        )))
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_thread_names(true)
        .with_target(true)
        .with_env_filter(EnvFilter::from_env("LOG_LEVEL"))
        .with_writer(non_blocking_appender)
        .finish();
    tracing::dispatcher::set_global_default(Dispatch::new(subscriber)).unwrap();

    tracing::debug!("running, config: {:?}", app_config.rtmp_server.config);

    let mut stream_center = StreamCenter::new();

    let mut rtmp_server = RtmpServer::new(
        &app_config.rtmp_server.config,
        stream_center.event_sender(),
    );

    tokio::spawn(async move { stream_center.run().await });

    let rtmp_task = tokio::spawn(async move {
        if let Err(err) = rtmp_server.run().await {
            tracing::error!("rtmp server stopped with error: {:?}", err);
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("received ctrl-c, shutting down");
        }
        _ = rtmp_task => {
            tracing::error!("rtmp server task exited unexpectedly");
        }
    }
}
