pub mod collision;
pub mod error;
pub mod interface;
pub mod measure;
pub mod observe;
pub mod registry;
