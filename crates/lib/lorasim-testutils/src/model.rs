use lorasim_core::model::{PropagationModel, SnrModel};

/// Received power is the transmit power minus a constant loss, whatever the distance.
#[derive(Debug, Clone, Copy)]
pub struct FixedLoss {
    pub loss: f64,
    pub indoor_loss: f64,
}

impl FixedLoss {
    pub fn new(loss: f64) -> Self {
        Self {
            loss,
            indoor_loss: 0.0,
        }
    }
}

impl PropagationModel for FixedLoss {
    fn received_power(&mut self, indoor: bool, tx_power: f64, _distance: f64) -> f64 {
        match indoor {
            true => tx_power - self.loss - self.indoor_loss,
            false => tx_power - self.loss,
        }
    }
}

/// SNR against a constant noise floor.
#[derive(Debug, Clone, Copy)]
pub struct FixedNoise {
    pub noise_floor: f64,
}

impl SnrModel for FixedNoise {
    fn snr(&self, received_power: f64) -> f64 {
        received_power - self.noise_floor
    }
}

pub fn fixed_models() -> (FixedLoss, FixedNoise) {
    (
        FixedLoss::new(100.0),
        FixedNoise {
            noise_floor: -120.0,
        },
    )
}
