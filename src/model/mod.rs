//! 数据模型模块

pub mod song;

pub use song::{Song, SongRecord};
