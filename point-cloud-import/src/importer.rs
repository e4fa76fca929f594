/// LAS/LAZ ingestion into a chunked point cloud.
use crate::config::ImportConfig;
use crate::error::ImportError;
use crate::laz::{is_point_cloud_path, open_reader};
use constants::coordinate_system::to_scene_space;
use constants::store::COLOUR_DETECTION_SAMPLE_SIZE;
use indicatif::{ProgressBar, ProgressStyle};
use las::Point;
use point_cloud_store::{CooperativeYield, PointBatch, PointCloud, PointMetadata, PointRecord};
use std::mem;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Counts gathered while ingesting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Records read from the source.
    pub scanned: usize,
    /// Records stored in the cloud.
    pub kept: usize,
    /// Bulk appends issued.
    pub batches: usize,
    /// Whether the sampled head of the source carried RGB.
    pub colour_detected: bool,
}

/// Streams a single LAS/LAZ file into a [`PointCloud`].
pub struct PointCloudImporter {
    input_path: PathBuf,
    config: ImportConfig,
}

impl PointCloudImporter {
    pub fn new(input_path: &Path, config: ImportConfig) -> Result<Self, ImportError> {
        if !input_path.exists() {
            return Err(ImportError::MissingInput(input_path.to_path_buf()));
        }
        if !is_point_cloud_path(input_path) {
            return Err(ImportError::UnsupportedFormat(input_path.to_path_buf()));
        }

        Ok(Self {
            input_path: input_path.to_path_buf(),
            config,
        })
    }

    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Read the whole file. Unfiltered imports go through whole-batch appends,
    /// filtered imports append point by point.
    pub fn import(&self) -> Result<(PointCloud, IngestStats), ImportError> {
        self.log_file_info()?;
        let colour_detected = self.detect_colour_data()?;

        let mut reader = open_reader(&self.input_path)?;
        let total_points = reader.header().number_of_points();

        let pb = progress_bar(total_points, "Importing points")?;
        let step = self.config.store.yield_interval as u64;
        let mut on_yield = || pb.inc(step);

        let transform = self.config.transform_coordinates;
        let records = reader
            .points()
            .map(|point| -> Result<PointRecord, ImportError> {
                Ok(record_from_point(&point?, transform))
            });
        let (cloud, mut stats) = ingest(records, &self.config, &mut on_yield)?;
        stats.colour_detected = colour_detected;

        pb.finish_with_message("Points imported");
        info!(
            scanned = stats.scanned,
            kept = stats.kept,
            batches = stats.batches,
            chunks = cloud.positions().chunk_count(),
            "import complete"
        );
        Ok((cloud, stats))
    }

    /// Detect if colour data exists in the point cloud.
    /// Samples the first points of the file only.
    pub fn detect_colour_data(&self) -> Result<bool, ImportError> {
        let mut reader = open_reader(&self.input_path)?;

        let mut colour_count = 0;
        let mut total_checked = 0;
        for point in reader.points().take(COLOUR_DETECTION_SAMPLE_SIZE).flatten() {
            if point.color.is_some() {
                colour_count += 1;
            }
            total_checked += 1;
        }

        let has_colour = colour_count > 0;
        if has_colour {
            info!(colour_count, total_checked, "colour data detected");
        } else {
            info!("no colour data found");
        }
        Ok(has_colour)
    }

    /// Log coordinate system and file information for debugging.
    fn log_file_info(&self) -> Result<(), ImportError> {
        let reader = open_reader(&self.input_path)?;
        let header = reader.header();
        let transforms = header.transforms();

        info!(
            file = %self.input_path.display(),
            version = %format!("{}.{}", header.version().major, header.version().minor),
            points = header.number_of_points(),
            point_format = ?header.point_format().to_u8(),
            "LAS/LAZ file"
        );
        debug!(
            x_scale = transforms.x.scale,
            y_scale = transforms.y.scale,
            z_scale = transforms.z.scale,
            x_offset = transforms.x.offset,
            y_offset = transforms.y.offset,
            z_offset = transforms.z.offset,
            "coordinate system"
        );

        for vlr in header.vlrs() {
            if vlr.record_id == 4 && vlr.data.len() >= 17 {
                let field_name = String::from_utf8_lossy(&vlr.data[4..17]);
                debug!(
                    bytes = vlr.data.len(),
                    field = field_name.trim_end_matches('\0'),
                    data_type = vlr.data[2],
                    "extra bytes VLR"
                );
            }
        }
        Ok(())
    }
}

/// Convert a LAS point into a store record.
/// The object number lives in the first four extra bytes as a little-endian f32.
pub fn record_from_point(point: &Point, transform: bool) -> PointRecord {
    let position = [point.x, point.y, point.z];
    let object_number = match point.extra_bytes.get(..4) {
        Some(&[a, b, c, d]) => f32::from_le_bytes([a, b, c, d]) as u32,
        _ => 0,
    };

    PointRecord {
        position: if transform {
            to_scene_space(position)
        } else {
            position
        },
        colour: point.color.map(|c| [c.red, c.green, c.blue]),
        metadata: PointMetadata {
            classification: u8::from(point.classification),
            object_number,
        },
    }
}

/// Feed `records` into a new cloud and seal it.
///
/// Without a class filter records are gathered into `batch_size` batches and
/// appended whole; the cloud calls `yielder` as chunks accumulate. With a
/// filter each kept record is appended on its own and `yielder` runs once
/// per yield interval of scanned records.
pub fn ingest<I, Y>(
    records: I,
    config: &ImportConfig,
    yielder: &mut Y,
) -> Result<(PointCloud, IngestStats), ImportError>
where
    I: IntoIterator<Item = Result<PointRecord, ImportError>>,
    Y: CooperativeYield + ?Sized,
{
    let mut cloud = PointCloud::new(&config.store);
    let mut stats = IngestStats::default();

    match &config.keep_classes {
        None => {
            let batch_size = config.batch_size();
            let mut batch = PointBatch::with_capacity(batch_size);
            for record in records {
                batch.push(record?);
                stats.scanned += 1;
                if batch.len() >= batch_size {
                    let full = mem::replace(&mut batch, PointBatch::with_capacity(batch_size));
                    cloud.append_batch_with(full, yielder);
                    stats.batches += 1;
                }
            }
            if !batch.is_empty() {
                cloud.append_batch_with(batch, yielder);
                stats.batches += 1;
            }
        }
        Some(keep) => {
            let interval = config.store.yield_interval.max(1);
            for record in records {
                let record = record?;
                stats.scanned += 1;
                if keep.contains(&record.metadata.classification) {
                    cloud.push(record);
                }
                if stats.scanned % interval == 0 {
                    yielder.yield_now();
                }
            }
        }
    }

    cloud.finish();
    stats.kept = cloud.len();
    Ok((cloud, stats))
}

pub(crate) fn progress_bar(len: u64, message: &'static str) -> Result<ProgressBar, ImportError> {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.green/blue}] {pos}/{len} points ({percent}%) {msg}")?
            .progress_chars("▉▊▋▌▍▎▏ "),
    );
    pb.set_message(message);
    Ok(pb)
}
