//! 内存中的歌曲目录。

use async_trait::async_trait;

use crate::{catalog::CatalogProvider, error::Result, model::SongRecord};

/// 由宿主程序直接提供记录的目录。
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    records: Vec<SongRecord>,
}

impl MemoryCatalog {
    /// 用给定的记录创建目录。
    pub fn new(records: Vec<SongRecord>) -> Self {
        Self { records }
    }

    /// 在目录末尾追加一条记录。
    pub fn push(&mut self, record: SongRecord) {
        self.records.push(record);
    }
}

#[async_trait]
impl CatalogProvider for MemoryCatalog {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_songs(&self) -> Result<Vec<SongRecord>> {
        Ok(self.records.clone())
    }
}
