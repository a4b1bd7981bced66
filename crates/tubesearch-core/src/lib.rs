pub mod adapters;
pub mod config;
pub mod identity;
pub mod models;
pub mod orchestration;
pub mod registry;
pub(crate) mod request_context;
pub mod session;
pub mod transport;
pub mod view;
