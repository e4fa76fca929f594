use crate::error::ImportError;
use las::Reader;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

const POINT_CLOUD_EXTENSIONS: &[&str] = &["las", "laz"];

/// True for `.las` / `.laz` paths, case-insensitive.
pub fn is_point_cloud_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            POINT_CLOUD_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Open a buffered LAS reader; LAZ decompression is picked from the header.
pub fn open_reader(path: &Path) -> Result<Reader, ImportError> {
    if !is_point_cloud_path(path) {
        return Err(ImportError::UnsupportedFormat(path.to_path_buf()));
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(Reader::new(reader)?)
}
