//! 定义了节拍歌词处理中使用的核心数据类型。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::lyrics::utils::strip_marker_chars;

//=============================================================================
// 1. 歌词事件
//=============================================================================

/// 歌词事件的分类，四种类型互斥。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, Display, EnumIter,
)]
pub enum LyricKind {
    /// 普通音符，标记为 `:`。
    #[default]
    Normal,
    /// 停顿（换气、静音），标记为 `-`。永远不会被渲染，但仍然占据时间轴上的位置。
    Pause,
    /// 延长音，标记为 `~`。
    Prolongation,
    /// 金色音符，标记为 `*`。
    Golden,
}

impl LyricKind {
    /// 从行首的标记字符识别事件类型。
    #[must_use]
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            ':' => Some(Self::Normal),
            '*' => Some(Self::Golden),
            '~' => Some(Self::Prolongation),
            '-' => Some(Self::Pause),
            _ => None,
        }
    }

    /// 返回该类型在脚本中对应的标记字符。
    #[must_use]
    pub fn marker(self) -> char {
        match self {
            Self::Normal => ':',
            Self::Golden => '*',
            Self::Prolongation => '~',
            Self::Pause => '-',
        }
    }
}

/// 一个已换算为绝对时间的歌词事件。
///
/// 解析完成后即不可变，由歌曲记录独占持有。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricEvent {
    /// 歌词变为激活状态的绝对时间（毫秒）。
    pub start_ms: u64,
    /// 歌词名义上的结束时间（毫秒），不含缓冲。总是 `>= start_ms`。
    pub end_ms: u64,
    /// 脚本中的原始文本。
    ///
    /// 保留 `*` 与 `~` 等标记残留，供下游工具检查完整时间轴；
    /// 显示前请使用 [`LyricEvent::display_text`]。
    pub text: String,
    /// 事件类型。
    pub kind: LyricKind,
}

impl LyricEvent {
    /// 返回去除了标记字符后的显示文本。
    #[must_use]
    pub fn display_text(&self) -> String {
        strip_marker_chars(&self.text)
    }

    /// 事件的名义时长（毫秒）。
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    /// 该事件是否会被渲染。
    #[must_use]
    pub fn is_renderable(&self) -> bool {
        self.kind != LyricKind::Pause
    }
}

//=============================================================================
// 2. 速度上下文
//=============================================================================

/// 未设置 `#BPM` 时使用的默认速度。
pub const DEFAULT_BPM: f64 = 160.0;

/// 一次解析过程中的速度信息，只在节拍到时间的换算中使用，解析结束后即丢弃。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoContext {
    /// 每分钟节拍数，总是大于 0。
    pub beats_per_minute: f64,
    /// 第一个节拍之前的静音时长（毫秒）。
    pub gap_ms: f64,
    /// 视频相对音频的偏移（毫秒），可以为负。脚本中以秒为单位给出。
    pub video_gap_ms: f64,
}

impl Default for TempoContext {
    fn default() -> Self {
        Self {
            beats_per_minute: DEFAULT_BPM,
            gap_ms: 0.0,
            video_gap_ms: 0.0,
        }
    }
}

impl TempoContext {
    /// 将节拍换算为毫秒：`GAP + beat * 60000 / BPM - VIDEOGAP`。
    ///
    /// 返回未经取整的值，可能为负。
    #[must_use]
    pub fn beat_to_ms(&self, beat: i64) -> f64 {
        self.gap_ms + (beat as f64) * 60000.0 / self.beats_per_minute - self.video_gap_ms
    }
}

//=============================================================================
// 3. 解析结果
//=============================================================================

/// 解析一个节拍歌词脚本后得到的完整结果。
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedScript {
    /// 按文件顺序排列的歌词事件（不保证按时间排序）。
    pub events: Vec<LyricEvent>,
    /// 脚本头部的所有 `#KEY:VALUE` 元数据，键为大写形式。
    pub raw_metadata: HashMap<String, String>,
    /// 解析过程中被跳过的行或被忽略的头部值。
    pub warnings: Vec<String>,
}

impl ParsedScript {
    /// 获取某个头部元数据的值，键不区分大小写。
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.raw_metadata
            .get(&key.to_ascii_uppercase())
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_marker_round_trips_for_every_kind() {
        for kind in LyricKind::iter() {
            assert_eq!(LyricKind::from_marker(kind.marker()), Some(kind));
        }
        assert_eq!(LyricKind::from_marker('E'), None);
    }

    #[test]
    fn test_beat_to_ms_reference_points() {
        let tempo = TempoContext::default();
        assert_eq!(tempo.beat_to_ms(0), 0.0);
        assert_eq!(tempo.beat_to_ms(160), 60000.0);

        let gapped = TempoContext {
            gap_ms: 500.0,
            ..Default::default()
        };
        assert_eq!(gapped.beat_to_ms(0), 500.0);
    }

    #[test]
    fn test_display_text_strips_markers_but_text_keeps_them() {
        let event = LyricEvent {
            start_ms: 0,
            end_ms: 10,
            text: "~*la~".to_string(),
            kind: LyricKind::Golden,
        };
        assert_eq!(event.text, "~*la~");
        assert_eq!(event.display_text(), "la");
    }
}
