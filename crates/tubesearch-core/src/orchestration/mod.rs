pub mod cancellation;
pub mod client_runtime;

pub use cancellation::CancellationToken;
pub use client_runtime::{ClientRuntime, RuntimeEvent};
