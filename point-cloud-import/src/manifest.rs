/// Import manifest describing how a file landed in the chunked store.
use crate::error::ImportError;
use crate::importer::{IngestStats, progress_bar};
use constants::class::class_name;
use point_cloud_store::{PointCloud, PointCloudBounds};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ClassType {
    pub class_name: String,
    pub point_count: usize,
    pub objects_ids: BTreeSet<u32>,
}

#[derive(Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ClassificationInfo {
    pub class_types: BTreeMap<u8, ClassType>,
}

impl ClassificationInfo {
    pub fn insert_or_update(&mut self, class_id: u8, object_id: u32) {
        let entry = self
            .class_types
            .entry(class_id)
            .or_insert_with(|| ClassType {
                class_name: class_name(class_id).to_string(),
                point_count: 0,
                objects_ids: BTreeSet::new(),
            });
        entry.point_count += 1;
        entry.objects_ids.insert(object_id);
    }

    /// Scan every point's metadata, reporting progress through a yielding scan.
    pub fn from_cloud(cloud: &PointCloud) -> Result<Self, ImportError> {
        let pb = progress_bar(cloud.len() as u64, "Collecting classes")?;
        let metadata = cloud.metadata();
        let step = metadata.yield_interval() as u64;

        let mut classes = Self::default();
        for point in metadata.each_yielding(None, || pb.inc(step)) {
            classes.insert_or_update(point.classification, point.object_number);
        }
        pb.finish_with_message("Classes collected");
        Ok(classes)
    }
}

/// Chunk layout of the stored columns.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct StoreLayout {
    pub chunk_capacity: usize,
    pub chunk_count: usize,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ImportManifest {
    pub source: String,
    pub scanned_points: usize,
    pub point_count: usize,
    pub has_colour: bool,
    pub colour_points: usize,
    pub store: StoreLayout,
    pub bounds: PointCloudBounds,
    pub classes: ClassificationInfo,
}

impl ImportManifest {
    pub fn build(source: &Path, cloud: &PointCloud, stats: &IngestStats) -> Result<Self, ImportError> {
        let colour_points = cloud.colour_points();
        Ok(Self {
            source: source.display().to_string(),
            scanned_points: stats.scanned,
            point_count: cloud.len(),
            has_colour: stats.colour_detected,
            colour_points,
            store: StoreLayout {
                chunk_capacity: cloud.positions().chunk_capacity(),
                chunk_count: cloud.positions().chunk_count(),
            },
            bounds: cloud.bounds(),
            classes: ClassificationInfo::from_cloud(cloud)?,
        })
    }
}

/// Writes manifests next to the imported file.
pub struct ManifestGenerator {
    output_dir: PathBuf,
    output_name: String,
}

impl ManifestGenerator {
    pub fn new(output_dir: &Path, output_name: &str) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            output_name: output_name.to_string(),
        }
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}_import.json", self.output_name))
    }

    pub fn write(&self, manifest: &ImportManifest) -> Result<PathBuf, ImportError> {
        let manifest_path = self.manifest_path();
        fs::write(&manifest_path, serde_json::to_string_pretty(manifest)?)?;

        info!(path = %manifest_path.display(), "wrote import manifest");
        self.log_summary(manifest);
        Ok(manifest_path)
    }

    fn log_summary(&self, manifest: &ImportManifest) {
        let bounds = &manifest.bounds;
        info!(
            points = manifest.point_count,
            scanned = manifest.scanned_points,
            chunks = manifest.store.chunk_count,
            chunk_capacity = manifest.store.chunk_capacity,
            "manifest summary"
        );
        if !bounds.is_empty() {
            info!(
                "bounds ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
                bounds.min_x, bounds.min_y, bounds.min_z, bounds.max_x, bounds.max_y, bounds.max_z
            );
        }
        for (id, class) in &manifest.classes.class_types {
            info!(
                id,
                name = %class.class_name,
                points = class.point_count,
                objects = class.objects_ids.len(),
                "class"
            );
        }
    }
}
