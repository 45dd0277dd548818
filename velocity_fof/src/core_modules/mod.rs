pub mod cube;
pub mod error;
pub mod group_grower;
pub mod membership;
pub mod point;
pub mod point_cloud;
pub mod spatial_index;
pub mod statistics;
pub mod two_stage;
pub mod units;
