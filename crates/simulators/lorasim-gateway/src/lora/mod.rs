pub mod bucket;
pub mod decode;
pub mod device;
