use rtmp_formats::{bandwidth::BandwidthCheckConfig, jitter::JitterAlgorithm};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RtmpServerConfig {
    pub addr: String,
    pub port: u16,

    #[serde(flatten)]
    pub session: RtmpSessionConfig,
}

impl Default for RtmpServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0".to_string(),
            port: 1935,
            session: RtmpSessionConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterAlgorithmConfig {
    Full,
    Zero,
    Off,
}

impl From<JitterAlgorithmConfig> for JitterAlgorithm {
    fn from(value: JitterAlgorithmConfig) -> Self {
        match value {
            JitterAlgorithmConfig::Full => JitterAlgorithm::Full,
            JitterAlgorithmConfig::Zero => JitterAlgorithm::Zero,
            JitterAlgorithmConfig::Off => JitterAlgorithm::Off,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RtmpSessionConfig {
    pub recv_timeout_ms: u64,
    pub send_timeout_ms: u64,

    pub in_chunk_size: u32,
    pub out_chunk_size: u32,

    pub max_message_size: u32,
    pub window_ack_size: u32,
    pub peer_bandwidth: u32,

    pub jitter_algorithm: JitterAlgorithmConfig,
    pub jitter_threshold_ms: u32,

    pub fmt3_extended_ts_peek: bool,
    pub bandwidth_check: bool,
    pub bandwidth_check_window_secs: u64,
}

impl Default for RtmpSessionConfig {
    fn default() -> Self {
        Self {
            recv_timeout_ms: 30_000,
            send_timeout_ms: 30_000,
            in_chunk_size: 60_000,
            out_chunk_size: 60_000,
            max_message_size: 16 * 1024 * 1024,
            window_ack_size: 2_500_000,
            peer_bandwidth: 2_500_000,
            jitter_algorithm: JitterAlgorithmConfig::Full,
            jitter_threshold_ms: 250,
            fmt3_extended_ts_peek: true,
            bandwidth_check: false,
            bandwidth_check_window_secs: 5,
        }
    }
}

impl RtmpSessionConfig {
    pub fn bandwidth_check_config(&self) -> BandwidthCheckConfig {
        BandwidthCheckConfig {
            enabled: self.bandwidth_check,
            window: std::time::Duration::from_secs(self.bandwidth_check_window_secs),
        }
    }
}
