// Domain layer: records exchanged with the backends and the ports the core talks to.

pub mod model;
pub mod ports;
