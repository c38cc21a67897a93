use rand::Rng;
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64Mcg;
use serde::Deserialize;

use lorasim_core::model::{BucketModel, ModelSettings, PropagationModel};

#[serde_with::skip_serializing_none]
#[derive(Deserialize, Debug, Clone)]
pub struct PropagationSettings {
    pub variant: String,
    pub seed: Option<u64>,
    /// Reference distance (m).
    pub d0: Option<f64>,
    /// Path loss at the reference distance (dB).
    pub path_loss_d0: Option<f64>,
    /// Path loss exponent.
    pub gamma: Option<f64>,
    /// Standard deviation of the shadowing (dB).
    pub std_dev: Option<f64>,
    /// Building penetration losses (dB); one is drawn per indoor transmission.
    pub indoor_losses: Option<Vec<f64>>,
}

impl ModelSettings for PropagationSettings {}

#[derive(Debug, Clone)]
pub enum PropagationType {
    LogShadow(LogShadow),
}

impl BucketModel for PropagationType {
    type Settings = PropagationSettings;

    fn with_settings(settings: &Self::Settings) -> Self {
        match settings.variant.to_lowercase().as_str() {
            "log_shadow" => PropagationType::LogShadow(LogShadow::with_settings(settings)),
            _ => panic!("Unsupported propagation variant {}.", settings.variant),
        }
    }
}

impl PropagationModel for PropagationType {
    fn received_power(&mut self, indoor: bool, tx_power: f64, distance: f64) -> f64 {
        match self {
            Self::LogShadow(model) => model.received_power(indoor, tx_power, distance),
        }
    }
}

/// Log-distance path loss with log-normal shadowing. Defaults follow the measurements
/// commonly used for LoRa in urban areas (d0 = 40 m, PL(d0) = 127.41 dB, gamma = 2.08).
#[derive(Debug, Clone)]
pub struct LogShadow {
    d0: f64,
    path_loss_d0: f64,
    gamma: f64,
    shadowing: Option<Normal<f64>>,
    indoor_losses: Vec<f64>,
    rng: Pcg64Mcg,
}

impl LogShadow {
    pub const DEFAULT_D0: f64 = 40.0;
    pub const DEFAULT_PATH_LOSS_D0: f64 = 127.41;
    pub const DEFAULT_GAMMA: f64 = 2.08;
    pub const DEFAULT_STD_DEV: f64 = 3.57;
    pub const DEFAULT_INDOOR_LOSSES: [f64; 4] = [17.0, 27.0, 21.0, 30.0];

    pub fn new(d0: f64, path_loss_d0: f64, gamma: f64, std_dev: f64, seed: u64) -> Self {
        Self {
            d0,
            path_loss_d0,
            gamma,
            shadowing: Self::shadowing(std_dev),
            indoor_losses: Self::DEFAULT_INDOOR_LOSSES.to_vec(),
            rng: Pcg64Mcg::new(seed as u128),
        }
    }

    pub fn with_indoor_losses(mut self, indoor_losses: Vec<f64>) -> Self {
        self.indoor_losses = indoor_losses;
        self
    }

    fn shadowing(std_dev: f64) -> Option<Normal<f64>> {
        if std_dev <= 0.0 {
            return None;
        }
        Normal::new(0.0, std_dev).ok()
    }

    /// Path loss without the random terms.
    pub fn mean_path_loss(&self, distance: f64) -> f64 {
        self.path_loss_d0 + 10.0 * self.gamma * (distance / self.d0).log10()
    }

    fn indoor_loss(&mut self) -> f64 {
        if self.indoor_losses.is_empty() {
            return 0.0;
        }
        let idx = self.rng.gen_range(0..self.indoor_losses.len());
        self.indoor_losses[idx]
    }
}

impl BucketModel for LogShadow {
    type Settings = PropagationSettings;

    fn with_settings(settings: &Self::Settings) -> Self {
        let model = Self::new(
            settings.d0.unwrap_or(Self::DEFAULT_D0),
            settings.path_loss_d0.unwrap_or(Self::DEFAULT_PATH_LOSS_D0),
            settings.gamma.unwrap_or(Self::DEFAULT_GAMMA),
            settings.std_dev.unwrap_or(Self::DEFAULT_STD_DEV),
            settings.seed.unwrap_or(0),
        );
        match &settings.indoor_losses {
            Some(losses) => model.with_indoor_losses(losses.clone()),
            None => model,
        }
    }
}

impl PropagationModel for LogShadow {
    fn received_power(&mut self, indoor: bool, tx_power: f64, distance: f64) -> f64 {
        let mut path_loss = self.mean_path_loss(distance);
        if let Some(shadowing) = self.shadowing {
            path_loss += shadowing.sample(&mut self.rng);
        }
        if indoor {
            path_loss += self.indoor_loss();
        }
        if path_loss < 0.0 {
            path_loss = 0.0;
        }
        tx_power - path_loss
    }
}
