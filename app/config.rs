use std::{env, path::PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{
    AppCli,
    errors::{AppError, AppResult},
    util::parse_log_level,
};

#[derive(Debug, Deserialize)]
#[allow(unused)]
pub(crate) struct Logger {
    pub(crate) level: String,
    pub(crate) dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[allow(unused)]
pub(crate) struct RtmpServer {
    pub(crate) enable: bool,
    #[serde(flatten)]
    pub(crate) config: rtmp_server::config::RtmpServerConfig,
}

#[derive(Debug, Deserialize)]
#[allow(unused)]
pub(crate) struct AppConfig {
    pub(crate) logger: Logger,
    pub(crate) rtmp_server: RtmpServer,
}

impl AppConfig {
    pub(crate) fn new(config_path: Option<String>) -> AppResult<Self> {
        let config_path_composed = config_path
            .map(|v| v.to_owned())
            .or_else(|| env::var("YAM_CONFIG").ok());
        if config_path_composed.is_none() {
            return Err(AppError::ConfigError(ConfigError::NotFound(
                "no config file is provided".to_owned(),
            )));
        }
        let result = Config::builder()
            .add_source(File::with_name(config_path_composed.unwrap().as_str()))
            .add_source(Environment::with_prefix("yam"))
            .build()?;
        let config = result.try_deserialize()?;
        Ok(config)
    }

    pub(crate) fn apply(&mut self, cli_args: AppCli) -> AppResult<()> {
        if cli_args.log_level.is_some() {
            self.logger.level = cli_args.log_level.unwrap();
        }

        if let Some(port) = cli_args.rtmp_port {
            self.rtmp_server.config.port = port;
        }

        Ok(())
    }

    pub(crate) fn validate(&self) -> AppResult<()> {
        let _ = parse_log_level(&self.logger.level)?;

        if self.logger.dir.clone().into_os_string().is_empty() {
            return Err(AppError::ConfigError(ConfigError::Message(format!(
                "the log dir config is empty: {:?}",
                self.logger.dir.to_str()
            ))));
        }

        Ok(())
    }
}
