//! CAD kernel abstraction and backends

mod registry;
mod traits;
#[cfg(feature = "truck")]
mod truck;

pub use registry::HandleRegistry;
pub use traits::*;
#[cfg(feature = "truck")]
pub use truck::TruckKernel;
