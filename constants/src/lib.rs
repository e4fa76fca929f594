//! Shared defaults for point cloud ingestion.

pub mod class;
pub mod coordinate_system;
pub mod store;
