use serde::Deserialize;

use lorasim_core::model::{BucketModel, ModelSettings, SnrModel};

/// Thermal noise density at room temperature (dBm/Hz).
const THERMAL_NOISE: f64 = -174.0;

#[serde_with::skip_serializing_none]
#[derive(Deserialize, Debug, Clone)]
pub struct SnrSettings {
    /// Receiver bandwidth (kHz).
    pub bandwidth: Option<u32>,
    /// Noise figure of the gateway front end (dB).
    pub noise_figure: Option<f64>,
}

impl ModelSettings for SnrSettings {}

/// SNR against the thermal noise floor of the receiver bandwidth plus the noise figure.
#[derive(Debug, Clone, Copy)]
pub struct NoiseFloorSnr {
    noise_floor: f64,
}

impl NoiseFloorSnr {
    pub const DEFAULT_BANDWIDTH: u32 = 125;
    pub const DEFAULT_NOISE_FIGURE: f64 = 6.0;

    pub fn new(bandwidth: u32, noise_figure: f64) -> Self {
        let noise_floor = THERMAL_NOISE + 10.0 * (bandwidth as f64 * 1000.0).log10() + noise_figure;
        Self { noise_floor }
    }

    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }
}

impl Default for NoiseFloorSnr {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BANDWIDTH, Self::DEFAULT_NOISE_FIGURE)
    }
}

impl BucketModel for NoiseFloorSnr {
    type Settings = SnrSettings;

    fn with_settings(settings: &Self::Settings) -> Self {
        Self::new(
            settings.bandwidth.unwrap_or(Self::DEFAULT_BANDWIDTH),
            settings.noise_figure.unwrap_or(Self::DEFAULT_NOISE_FIGURE),
        )
    }
}

impl SnrModel for NoiseFloorSnr {
    fn snr(&self, received_power: f64) -> f64 {
        received_power - self.noise_floor
    }
}
