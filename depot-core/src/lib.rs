pub mod controller;
pub mod error;
pub mod gateway;
pub mod http;
pub mod notifier;
pub mod pagination;
pub mod record;
pub mod registry;
pub mod session;
pub mod settings;

#[cfg(test)]
mod testing;
