use std::path::PathBuf;

use serde::Deserialize;

use lorasim_core::agent::Location;
use lorasim_core::bucket::TimeMS;
use lorasim_models::dist::DistParams;
use lorasim_models::net::propagation::PropagationSettings;
use lorasim_models::net::snr::SnrSettings;
use lorasim_output::logger::LogSettings;
use lorasim_output::result::OutputSettings;

#[derive(Deserialize, Debug, Clone)]
pub struct BaseConfig {
    pub simulation_settings: SimSettings,
    pub gateway: GatewaySettings,
    pub propagation: PropagationSettings,
    pub snr: SnrSettings,
    pub devices: Vec<DeviceGroupSettings>,
    pub log_settings: LogSettings,
    pub output_settings: OutputSettings,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SimSettings {
    pub scenario: String,
    pub duration: TimeMS,
    pub seed: u64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GatewaySettings {
    pub location: Location,
    /// Demodulation floor (dB) for SF7 to SF12, in that order.
    pub snr_thresholds: Option<Vec<f64>>,
}

/// End devices that share their radio settings and traffic pattern.
#[derive(Deserialize, Debug, Clone)]
pub struct DeviceGroupSettings {
    pub count: u32,
    /// Devices are spread uniformly over a disc of this radius (m) around the gateway.
    pub radius: f64,
    #[serde(default)]
    pub indoor_share: f64,
    pub radio: RadioSettings,
    /// Gap between the end of a transmission and the start of the next one (ms).
    pub interval: DistParams,
    pub max_transmissions: Option<u32>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RadioSettings {
    /// Uplink channels (kHz); one is picked at random for every frame.
    pub channels: Vec<f64>,
    pub bw: u32,
    pub sf: u8,
    pub tp: f64,
    pub cr: Option<u8>,
    pub payload_size: Option<u32>,
}

pub struct BaseConfigReader {
    file_path: PathBuf,
}

impl BaseConfigReader {
    pub fn new(file_name: &str) -> Self {
        let file_path = PathBuf::from(file_name);
        Self { file_path }
    }

    pub fn parse(&self) -> Result<BaseConfig, Box<dyn std::error::Error>> {
        let parsing_result = std::fs::read_to_string(&self.file_path)?;
        let config: BaseConfig = toml::from_str(&parsing_result)?;
        Ok(config)
    }
}
