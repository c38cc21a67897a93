pub mod propagation;
pub mod snr;
