pub mod api;
pub mod app;
pub mod error;
pub mod flowmon;
pub mod lte;
pub mod net;
pub mod queue;
pub mod scenario;
pub mod sim;

#[cfg(test)]
mod test;
