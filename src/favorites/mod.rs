pub mod client;
pub mod handlers;
pub mod types;

pub use client::*;
pub use handlers::*;
pub use types::*;
