mod matrix;
mod misc;
mod random;

pub use matrix::*;
pub use misc::*;
pub use random::*;
