mod directory;
mod roster;

pub use directory::*;
pub use roster::*;
