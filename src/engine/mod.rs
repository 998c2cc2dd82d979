//! Engine module: sessions and the commands they execute.

#[allow(clippy::module_inception)]
pub mod engine;
pub mod session;

pub use engine::Engine;
pub use session::{HitRecord, Session};
