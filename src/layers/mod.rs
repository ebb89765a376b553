pub mod dense;
pub mod initialization;
pub mod topology;

pub use dense::Layer;
pub use initialization::{ParameterInitializer, DEFAULT_BIAS, DEFAULT_INIT_SCALE};
pub use topology::Topology;
