pub mod airtime;
pub mod measure;
pub mod reception;
