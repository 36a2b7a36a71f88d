//! Repository abstraction.
//!
//! This module defines the trait the request pipeline resolves objects through.

mod health;
mod traits;

pub use health::MirrorHealth;
pub use traits::MirrorRepository;
