//! Chunked in-memory storage for very large point clouds.
//!
//! [`ChunkedContainer`] keeps elements in fixed-capacity segments so that
//! importing millions of records never needs one large contiguous buffer.
//! [`PointCloud`] composes several containers into aligned point columns.

pub mod bounds;
pub mod chunked;
pub mod cloud;
pub mod config;
pub mod error;
pub mod iter;
pub mod yielder;

pub use bounds::PointCloudBounds;
pub use chunked::{ChunkedContainer, TailState};
pub use cloud::{PointBatch, PointCloud, PointMetadata, PointRecord};
pub use config::StoreConfig;
pub use error::{ConfigError, StoreError};
pub use iter::{Iter, YieldingIter};
pub use yielder::{CooperativeYield, NoYield};
