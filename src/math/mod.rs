pub mod bitrev;
pub mod fft;
pub mod prime;
