//! 从 `songs.json` 歌曲列表文件读取目录的提供商。

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use crate::{
    catalog::CatalogProvider,
    error::{KaraokeError, Result},
    model::SongRecord,
};

/// 读取一个 JSON 数组形式的歌曲列表文件。
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    /// 创建一个读取 `path` 的目录提供商。
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 歌曲列表文件的路径。
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 从 JSON 文本解析歌曲记录。
    pub fn parse(content: &str) -> Result<Vec<SongRecord>> {
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(content)?)
    }
}

#[async_trait]
impl CatalogProvider for JsonCatalog {
    fn name(&self) -> &'static str {
        "json"
    }

    async fn list_songs(&self) -> Result<Vec<SongRecord>> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            KaraokeError::Catalog(format!("{}: {e}", self.path.display()))
        })?;
        let records = Self::parse(&content)?;
        info!("[Catalog] 已从 {:?} 读取 {} 条歌曲记录。", self.path, records.len());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty_file_yields_no_records() {
        assert!(JsonCatalog::parse("").unwrap().is_empty());
        assert!(JsonCatalog::parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(matches!(
            JsonCatalog::parse(r#"{"id": "x"}"#),
            Err(KaraokeError::JsonParse(_))
        ));
    }

    #[tokio::test]
    async fn test_list_songs_reads_file() {
        let path = std::env::temp_dir().join(format!("songs-{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(
            &path,
            r#"[{"id":"1","title":"One","videoUrl":"/one.mp4","script":": 0 1 0 la"}]"#,
        )
        .await
        .unwrap();

        let records = JsonCatalog::new(path.clone()).list_songs().await.unwrap();
        let _ = tokio::fs::remove_file(&path).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].video_url, "/one.mp4");
        assert_eq!(records[0].script, ": 0 1 0 la");
    }

    #[tokio::test]
    async fn test_missing_file_is_a_catalog_error() {
        let catalog = JsonCatalog::new("/definitely/not/here/songs.json");
        assert!(matches!(
            catalog.list_songs().await,
            Err(KaraokeError::Catalog(_))
        ));
    }
}
