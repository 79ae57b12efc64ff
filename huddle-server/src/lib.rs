mod registry;
mod relay;
mod room;
mod router;
mod signaling;

pub use registry::*;
pub use relay::*;
pub use room::*;
pub use router::*;
pub use signaling::*;
