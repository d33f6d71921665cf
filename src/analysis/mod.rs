pub mod delta;
pub mod lag;
pub mod page;
