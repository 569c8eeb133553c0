//! DTOs sent to the API

pub mod run_request;

pub use run_request::PipelineRunRequest;
