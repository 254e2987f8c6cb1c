pub mod device;
pub mod update;
