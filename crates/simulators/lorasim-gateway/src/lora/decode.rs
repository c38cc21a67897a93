use log::warn;

const LOWEST_SF: u8 = 7;

/// Demodulation floor of the gateway per spreading factor. A frame that survived the
/// channel is decoded when its SNR reaches the floor of its spreading factor.
#[derive(Debug, Clone)]
pub struct Demodulator {
    snr_thresholds: [f64; 6],
}

impl Default for Demodulator {
    fn default() -> Self {
        Self {
            snr_thresholds: Self::DEFAULT_SNR_THRESHOLDS,
        }
    }
}

impl Demodulator {
    pub const DEFAULT_SNR_THRESHOLDS: [f64; 6] = [-7.5, -10.0, -12.5, -15.0, -17.5, -20.0];

    /// Missing or malformed thresholds fall back to the defaults.
    pub fn new(snr_thresholds: &Option<Vec<f64>>) -> Self {
        match snr_thresholds {
            Some(values) => match <[f64; 6]>::try_from(values.as_slice()) {
                Ok(snr_thresholds) => Self { snr_thresholds },
                Err(_) => {
                    warn!(
                        "Expected 6 SNR thresholds for SF7 to SF12, found {}. Using defaults.",
                        values.len()
                    );
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn threshold(&self, sf: u8) -> Option<f64> {
        let idx = sf.checked_sub(LOWEST_SF)? as usize;
        self.snr_thresholds.get(idx).copied()
    }

    pub fn can_decode(&self, sf: u8, snr: f64) -> bool {
        match self.threshold(sf) {
            Some(threshold) => snr >= threshold,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_sf_decodes_weaker_frames() {
        let demodulator = Demodulator::default();
        assert!(!demodulator.can_decode(7, -10.0));
        assert!(demodulator.can_decode(9, -10.0));
        assert!(demodulator.can_decode(12, -20.0));
        assert!(!demodulator.can_decode(12, -20.5));
    }

    #[test]
    fn unknown_sf_is_never_decoded() {
        let demodulator = Demodulator::default();
        assert_eq!(demodulator.threshold(6), None);
        assert!(!demodulator.can_decode(13, 30.0));
    }

    #[test]
    fn configured_thresholds_replace_defaults() {
        let demodulator = Demodulator::new(&Some(vec![0.0, -1.0, -2.0, -3.0, -4.0, -5.0]));
        assert_eq!(demodulator.threshold(7), Some(0.0));
        assert_eq!(demodulator.threshold(12), Some(-5.0));

        let fallback = Demodulator::new(&Some(vec![0.0]));
        assert_eq!(fallback.threshold(7), Some(-7.5));
    }
}
