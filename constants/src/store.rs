/// Elements per chunk when a caller does not configure one.
pub const DEFAULT_CHUNK_CAPACITY: usize = 100_000;

/// Elements processed between cooperative yields when none is configured.
pub const DEFAULT_YIELD_INTERVAL: usize = 50_000;

/// Records handed to the bulk append path per batch by the importer.
pub const DEFAULT_BATCH_SIZE: usize = 100_000;

/// Upper bound on a configured batch size.
pub const MAX_BATCH_SIZE: usize = 1_000_000;

/// Points sampled from the head of a file to decide whether it carries RGB.
pub const COLOUR_DETECTION_SAMPLE_SIZE: usize = 100;
