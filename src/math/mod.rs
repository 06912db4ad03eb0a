pub mod angles;
pub mod frame;
