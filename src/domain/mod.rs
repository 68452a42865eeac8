// Domain layer: course models and ports (interfaces) for every external backend.

pub mod model;
pub mod ports;
