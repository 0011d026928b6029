//! 匹配算法模块，简单实现

use strsim::normalized_levenshtein;

use crate::model::Song;

/// 字符串相似度阈值，高于此值则认为模糊匹配成功
const SIMILARITY_THRESHOLD: f64 = 0.85;

/// 一首歌与搜索词的匹配程度。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum MatchType {
    /// 不匹配。
    #[default]
    None,
    /// 标题或艺术家与搜索词足够相似。
    Fuzzy,
    /// 标题或艺术家包含搜索词。
    Contains,
    /// 标题或艺术家以搜索词开头。
    Prefix,
    /// 标题或艺术家与搜索词完全相同（忽略大小写）。
    Exact,
}

/// 比较单个字段和已规范化的搜索词。
fn compare_field(field: &str, query: &str) -> MatchType {
    let field = field.trim().to_lowercase();
    if field == query {
        MatchType::Exact
    } else if field.starts_with(query) {
        MatchType::Prefix
    } else if field.contains(query) {
        MatchType::Contains
    } else if normalized_levenshtein(&field, query) >= SIMILARITY_THRESHOLD {
        MatchType::Fuzzy
    } else {
        MatchType::None
    }
}

/// 比较歌曲与搜索词，返回标题、艺术家和 `标题 - 艺术家` 三者中最好的匹配。
///
/// `query` 需要已经去除首尾空白并转换为小写。
pub fn compare_song(song: &Song, query: &str) -> MatchType {
    [
        compare_field(&song.title, query),
        compare_field(&song.artist, query),
        compare_field(&song.display_name(), query),
    ]
    .into_iter()
    .max()
    .unwrap_or_default()
}
