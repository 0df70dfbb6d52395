use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no road edge within snapping distance of the start location")]
    NoStartNode,
    #[error("unknown isoline method: {0}")]
    UnknownMethod(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("GeoJSON error: {0}")]
    GeoJsonError(String),
}
