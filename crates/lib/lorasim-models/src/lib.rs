pub mod air;
pub mod dist;
pub mod net;

pub use rand_pcg;
