//! 静态参考数据

pub mod cities;

pub use cities::{City, CITIES};
