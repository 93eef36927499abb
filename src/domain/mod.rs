// Domain layer: the day record model and the ports the core talks to.

pub mod model;
pub mod ports;
