// Domain layer: models and ports. The HTTP client and file storage live under adapters.

pub mod model;
pub mod ports;
