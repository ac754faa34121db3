mod asset;
mod event;
mod metadata;
mod publish;

pub use asset::*;
pub use event::*;
pub use metadata::*;
pub use publish::*;
