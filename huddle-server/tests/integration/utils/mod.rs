pub mod media_peer;

pub use media_peer::*;
pub use test_conn::*;
pub use test_observer::*;
