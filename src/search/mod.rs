//! 搜索模块
//!
//! 在已加载的歌曲目录中按标题和艺术家搜索歌曲。

use tracing::debug;

use crate::model::Song;

mod matcher;
pub use matcher::{MatchType, compare_song};

/// 在歌曲列表中搜索。
///
/// # 参数
/// * `songs` - 已加载的歌曲列表。
/// * `query` - 搜索词，忽略大小写与首尾空白。
///
/// # 返回
/// 按匹配度从高到低排列的歌曲，匹配度相同的歌曲保持原有顺序。
/// 搜索词为空时按原顺序返回全部歌曲。
pub fn search_songs<'a>(songs: &'a [Song], query: &str) -> Vec<&'a Song> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return songs.iter().collect();
    }

    let mut scored: Vec<(MatchType, &Song)> = songs
        .iter()
        .map(|song| (compare_song(song, &query), song))
        .filter(|(match_type, _)| *match_type != MatchType::None)
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    debug!("[Search] 搜索 '{query}' 命中 {} 首歌曲。", scored.len());
    scored.into_iter().map(|(_, song)| song).collect()
}
