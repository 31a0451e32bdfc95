pub mod settings;
pub mod trace;
