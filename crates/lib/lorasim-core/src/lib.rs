#![forbid(unsafe_code)]

pub use hashbrown;

pub mod agent;
pub mod bucket;
pub mod message;
pub mod model;
pub mod radio;
pub mod scheduler;
