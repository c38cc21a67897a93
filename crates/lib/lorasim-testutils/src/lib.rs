pub mod agent;
pub mod bucket;
pub mod message;
pub mod model;
