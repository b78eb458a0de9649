pub mod fft;
pub mod frame;
pub mod processor;
