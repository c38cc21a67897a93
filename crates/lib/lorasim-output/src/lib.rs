pub mod logger;
pub mod result;
pub mod tables;
pub mod writer;

pub use arrow;
