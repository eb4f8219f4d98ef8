/// Request payloads accepted by the render pipeline.
pub mod request;
