pub mod display;
pub mod metric;
pub mod sample;
