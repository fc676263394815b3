// Domain layer: models and ports shared by the services, renderer and surfaces.

pub mod model;
pub mod ports;
