// Domain layer: core models and ports (interfaces) for the collaborators the operator drives.

pub mod model;
pub mod ports;
