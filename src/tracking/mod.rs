pub mod provider;
pub mod session;
pub mod state;
