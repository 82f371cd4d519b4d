// Domain layer: shop model and ports. Concrete implementations live under adapters.

pub mod model;
pub mod ports;
