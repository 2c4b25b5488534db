// Domain layer: storefront models and the ports the API wrappers talk through.

pub mod model;
pub mod ports;
