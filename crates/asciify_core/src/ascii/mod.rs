pub mod blocks;
pub mod grid;
pub mod mapping;
pub mod ramp;
