pub mod downsample;
pub mod liveness;
pub mod query;
