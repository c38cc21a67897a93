use serde::Deserialize;
use typed_builder::TypedBuilder;

use crate::bucket::TimeMS;

/// Number of preamble symbols programmed on every end device.
pub const PREAMBLE_SYMBOLS: u32 = 8;

/// Bandwidth classes (kHz) for which the gateway has frequency guard thresholds.
pub const SUPPORTED_BANDWIDTHS: [u32; 3] = [125, 250, 500];

/// LoRa physical layer parameters of an uplink frame.
///
/// Frequencies and bandwidths are in kHz so that the symbol duration `2^sf / bw`
/// comes out in milliseconds. The coding rate is the `x` in `4/(4 + x)`.
/// Values are not validated; a zero bandwidth yields infinite durations.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, TypedBuilder)]
pub struct LoraParams {
    pub freq: f64,
    pub bw: u32,
    pub sf: u8,
    pub tp: f64,
    #[builder(default = 1)]
    #[serde(default = "default_coding_rate")]
    pub cr: u8,
}

fn default_coding_rate() -> u8 {
    1
}

impl LoraParams {
    pub fn symbol_duration(&self) -> f64 {
        2f64.powi(self.sf as i32) / self.bw as f64
    }

    /// Low data rate optimisation is mandated for long symbols.
    fn low_data_rate(&self) -> bool {
        self.bw == 125 && (self.sf == 11 || self.sf == 12)
    }

    /// Time on air of a frame with an explicit header and CRC enabled.
    pub fn time_on_air(&self, payload_size: u32) -> TimeMS {
        let sf = self.sf as f64;
        let de = if self.low_data_rate() { 1.0 } else { 0.0 };
        let t_sym = self.symbol_duration();
        let t_preamble = (PREAMBLE_SYMBOLS as f64 + 4.25) * t_sym;

        let numerator = 8.0 * payload_size as f64 - 4.0 * sf + 28.0 + 16.0;
        let denominator = 4.0 * (sf - 2.0 * de);
        let payload_symbols =
            8.0 + ((numerator / denominator).ceil() * (self.cr as f64 + 4.0)).max(0.0);
        TimeMS::from(t_preamble + payload_symbols * t_sym)
    }

    pub fn has_supported_bandwidth(&self) -> bool {
        SUPPORTED_BANDWIDTHS.contains(&self.bw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(sf: u8, bw: u32) -> LoraParams {
        LoraParams::builder()
            .freq(868_100.0)
            .bw(bw)
            .sf(sf)
            .tp(14.0)
            .build()
    }

    #[test]
    fn symbol_duration_sf7_bw125() {
        let duration = params(7, 125).symbol_duration();
        assert!((duration - 1.024).abs() < 1e-12);
    }

    #[test]
    fn time_on_air_known_values() {
        // 20 byte payload, CR 4/5.
        let sf7 = params(7, 125).time_on_air(20).as_f64();
        assert!((sf7 - 56.576).abs() < 1e-9);
        let sf12 = params(12, 125).time_on_air(20).as_f64();
        assert!((sf12 - 1318.912).abs() < 1e-9);
    }

    #[test]
    fn wider_bandwidth_is_faster() {
        let narrow = params(9, 125).time_on_air(10);
        let wide = params(9, 500).time_on_air(10);
        assert!(wide < narrow);
    }

    #[test]
    fn supported_bandwidths() {
        assert!(params(7, 250).has_supported_bandwidth());
        assert!(!params(7, 62).has_supported_bandwidth());
    }
}
