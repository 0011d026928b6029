//! 歌曲目录模块
//!
//! 该模块定义了与歌曲目录提供商交互的核心抽象。
//! 提供商只负责返回有序的原始歌曲记录，歌词脚本的解析由 [`crate::model::Song`] 完成。

use async_trait::async_trait;

use crate::{error::Result, model::SongRecord};

pub mod json_catalog;
pub mod memory_catalog;

pub use json_catalog::JsonCatalog;
pub use memory_catalog::MemoryCatalog;

/// 定义了所有歌曲目录提供商需要实现的通用接口。
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    ///
    /// 返回提供商的唯一名称。
    ///
    fn name(&self) -> &'static str;

    ///
    /// 列出目录中的全部歌曲记录。
    ///
    /// # 返回
    /// 一个 `Result`，成功时包含按目录顺序排列的 `SongRecord` 列表。
    ///
    async fn list_songs(&self) -> Result<Vec<SongRecord>>;
}
