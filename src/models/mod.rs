pub mod landmarks;
pub mod settings;
pub mod trace;
