/// A trait that converts transmit power (dBm) and distance (m) into received power (dBm).
/// Models may carry their own random state (e.g. shadowing), hence the mutable receiver.
pub trait PropagationModel: Send {
    fn received_power(&mut self, indoor: bool, tx_power: f64, distance: f64) -> f64;
}

/// A trait that derives the signal-to-noise ratio (dB) from the received power (dBm).
pub trait SnrModel: Send {
    fn snr(&self, received_power: f64) -> f64;
}

/// Settings that can build a model instance.
pub trait ModelSettings {}

/// A trait for models configured from settings read from the configuration file.
pub trait BucketModel: Clone + Send {
    type Settings: ModelSettings;
    fn with_settings(settings: &Self::Settings) -> Self;
}
