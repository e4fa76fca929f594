/// Point cloud held as aligned chunked columns.
use crate::bounds::PointCloudBounds;
use crate::chunked::ChunkedContainer;
use crate::config::StoreConfig;
use crate::error::Result;
use crate::yielder::{CooperativeYield, NoYield};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub type Position = [f64; 3];
pub type Colour = [u16; 3];

/// Per-point attributes besides position and colour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointMetadata {
    pub classification: u8,
    /// Object instance the point belongs to, 0 when unknown.
    pub object_number: u32,
}

/// One point, as produced by a parser or read back from a cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub position: Position,
    pub colour: Option<Colour>,
    pub metadata: PointMetadata,
}

/// Column-oriented batch handed to [`PointCloud::append_batch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBatch {
    pub positions: Vec<Position>,
    pub colours: Vec<Option<Colour>>,
    pub metadata: Vec<PointMetadata>,
}

impl PointBatch {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            colours: Vec::with_capacity(capacity),
            metadata: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, record: PointRecord) {
        self.positions.push(record.position);
        self.colours.push(record.colour);
        self.metadata.push(record.metadata);
    }

    /// Number of complete rows; a column longer than the others is ignored past this.
    pub fn len(&self) -> usize {
        self.positions
            .len()
            .min(self.colours.len())
            .min(self.metadata.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Positions, colours and metadata in three containers that always hold the
/// same number of elements.
#[derive(Debug, Clone)]
pub struct PointCloud {
    positions: ChunkedContainer<Position>,
    colours: ChunkedContainer<Option<Colour>>,
    metadata: ChunkedContainer<PointMetadata>,
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::new(&StoreConfig::default())
    }
}

impl PointCloud {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            positions: ChunkedContainer::with_config(config),
            colours: ChunkedContainer::with_config(config),
            metadata: ChunkedContainer::with_config(config),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &ChunkedContainer<Position> {
        &self.positions
    }

    pub fn colours(&self) -> &ChunkedContainer<Option<Colour>> {
        &self.colours
    }

    pub fn metadata(&self) -> &ChunkedContainer<PointMetadata> {
        &self.metadata
    }

    pub fn append_batch(&mut self, batch: PointBatch) {
        self.append_batch_with(batch, &mut NoYield);
    }

    /// Bulk path. Columns are cut to the shortest one so the cloud stays aligned.
    /// Only the position column drives `yielder`.
    pub fn append_batch_with<Y>(&mut self, batch: PointBatch, yielder: &mut Y)
    where
        Y: CooperativeYield + ?Sized,
    {
        let rows = batch.len();
        self.positions
            .append_batch_with(batch.positions, Some(rows), yielder);
        self.colours.append_batch(batch.colours, Some(rows));
        self.metadata.append_batch(batch.metadata, Some(rows));
    }

    /// Incremental path.
    pub fn push(&mut self, record: PointRecord) {
        self.positions.append_one(record.position);
        self.colours.append_one(record.colour);
        self.metadata.append_one(record.metadata);
    }

    /// Trim every column. Call once ingestion is done.
    pub fn finish(&mut self) {
        self.positions.trim_last_chunk();
        self.colours.trim_last_chunk();
        self.metadata.trim_last_chunk();
        debug!(
            points = self.len(),
            chunks = self.positions.chunk_count(),
            "point cloud sealed"
        );
    }

    /// Point at `index`, negative indices counting from the end.
    pub fn point(&self, index: isize) -> Option<PointRecord> {
        Some(PointRecord {
            position: *self.positions.get(index)?,
            colour: *self.colours.get(index)?,
            metadata: *self.metadata.get(index)?,
        })
    }

    pub fn set_classification(&mut self, index: isize, classification: u8) -> Result<()> {
        let mut metadata = *self.metadata.try_get(index)?;
        metadata.classification = classification;
        self.metadata.set(index, metadata)
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = PointRecord> + '_ {
        self.positions
            .each()
            .zip(self.colours.each())
            .zip(self.metadata.each())
            .map(|((position, colour), metadata)| PointRecord {
                position: *position,
                colour: *colour,
                metadata: *metadata,
            })
    }

    /// Scene bounds, reduced over position chunks in parallel.
    pub fn bounds(&self) -> PointCloudBounds {
        let chunks: Vec<&[Position]> = self.positions.chunks().collect();
        chunks
            .par_iter()
            .map(|chunk| PointCloudBounds::from_positions(chunk))
            .reduce(PointCloudBounds::new, PointCloudBounds::merge)
    }

    /// Number of points per classification code.
    pub fn class_counts(&self) -> BTreeMap<u8, usize> {
        let chunks: Vec<&[PointMetadata]> = self.metadata.chunks().collect();
        chunks
            .par_iter()
            .map(|chunk| {
                let mut counts = BTreeMap::new();
                for metadata in chunk.iter() {
                    *counts.entry(metadata.classification).or_insert(0) += 1;
                }
                counts
            })
            .reduce(BTreeMap::new, |mut a, b| {
                for (class, count) in b {
                    *a.entry(class).or_insert(0) += count;
                }
                a
            })
    }

    pub fn colour_points(&self) -> usize {
        self.colours.each().filter(|colour| colour.is_some()).count()
    }

    pub fn clear(&mut self) {
        self.positions.clear();
        self.colours.clear();
        self.metadata.clear();
    }
}
