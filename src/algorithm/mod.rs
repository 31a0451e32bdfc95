pub mod accuracy;
pub mod calibration;
pub mod mapper;
pub mod ratio;
pub mod smoothing;
