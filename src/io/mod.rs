pub mod receiver;
pub mod wire;
