use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("input file does not exist: {}", .0.display())]
    MissingInput(PathBuf),
    #[error("not a LAS/LAZ file: {}", .0.display())]
    UnsupportedFormat(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("failed to read point data: {0}")]
    Las(#[from] las::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid progress template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}
