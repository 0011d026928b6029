//! 定义了歌曲目录中的歌曲记录和播放使用的不可变歌曲模型。

use std::sync::Arc;

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lyrics::{LyricEvent, parse_ultrastar};

/// 缺少艺术家时使用的占位名称。
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// 缺少标题时使用的占位名称。
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// 歌曲目录提供商返回的原始歌曲记录。
///
/// 字段名与 `songs.json` 中的驼峰命名保持一致，除媒体地址外均可缺省。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SongRecord {
    /// 稳定的歌曲 ID。
    pub id: Option<String>,
    /// 歌曲标题。
    pub title: Option<String>,
    /// 艺术家。
    pub artist: Option<String>,
    /// 发行年份。
    pub year: Option<i32>,
    /// 专辑封面地址。
    pub album_cover: String,
    /// 视频地址，播放时作为计时主源。
    pub video_url: String,
    /// 伴奏音轨地址。
    pub music_url: String,
    /// 人声音轨地址。
    pub vocals_url: String,
    /// 原始节拍歌词脚本，可以为空。
    pub script: String,
}

/// 一首可以播放的歌曲。
///
/// 歌词事件在创建时解析一次，之后不可变。
#[derive(Debug, Clone, PartialEq)]
pub struct Song {
    /// 歌曲 ID。
    pub id: String,
    /// 歌曲标题。
    pub title: String,
    /// 艺术家。
    pub artist: String,
    /// 发行年份。
    pub year: i32,
    /// 专辑封面地址。
    pub album_cover: String,
    /// 视频地址。
    pub video_url: String,
    /// 伴奏音轨地址。
    pub music_url: String,
    /// 人声音轨地址。
    pub vocals_url: String,
    /// 按文件顺序排列的歌词事件。
    pub lyrics: Arc<[LyricEvent]>,
}

/// 去除首尾空白，空字符串视为缺失。
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl Song {
    /// 从目录记录构建歌曲，并解析其中的歌词脚本。
    ///
    /// 记录中缺失的标题、艺术家和年份会依次尝试从脚本头部 (`#TITLE`、`#ARTIST`、`#YEAR`)
    /// 补全，仍然缺失时使用占位值；缺失的 ID 会生成一个随机 UUID。
    pub fn from_record(record: SongRecord) -> Self {
        let parsed = parse_ultrastar(&record.script);
        if !parsed.warnings.is_empty() {
            debug!(
                "[Song] 歌曲 '{}' 的歌词脚本有 {} 条警告。",
                record.title.as_deref().unwrap_or(UNKNOWN_TITLE),
                parsed.warnings.len()
            );
        }

        let title = non_blank(record.title.as_deref())
            .or_else(|| non_blank(parsed.metadata("TITLE")))
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
        let artist = non_blank(record.artist.as_deref())
            .or_else(|| non_blank(parsed.metadata("ARTIST")))
            .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
        let year = record
            .year
            .or_else(|| parsed.metadata("YEAR").and_then(|y| y.trim().parse().ok()))
            .unwrap_or_else(|| chrono::Local::now().year());
        let id = non_blank(record.id.as_deref()).unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            id,
            title,
            artist,
            year,
            album_cover: record.album_cover,
            video_url: record.video_url,
            music_url: record.music_url,
            vocals_url: record.vocals_url,
            lyrics: parsed.events.into(),
        }
    }

    /// 用于标题栏的显示名称，格式为 `标题 - 艺术家`。
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }

    /// 这首歌是否带有歌词。
    #[must_use]
    pub fn has_lyrics(&self) -> bool {
        !self.lyrics.is_empty()
    }
}
