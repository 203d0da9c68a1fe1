// Domain layer: the entities passed between roles and the ports (interfaces) each role is seen through.

pub mod model;
pub mod ports;
