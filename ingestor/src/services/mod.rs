//! Pipeline services for the Fish Farm Monitoring Platform

pub mod coordinates;
pub mod pipeline;
pub mod projection;
pub mod upload;

pub use coordinates::PondCoordinateMap;
pub use pipeline::PipelineService;
pub use projection::TableProjection;
pub use upload::BatchedUploader;
