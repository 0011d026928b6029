//! 播放时钟。

use serde::{Deserialize, Serialize};

/// 当前播放位置与播放状态。
///
/// 只会被主媒体元素触发的事件（播放、暂停、跳转、时间更新）修改，
/// 由同步器持有，是“当前时刻”的唯一来源。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackClock {
    /// 当前播放位置（毫秒）。
    pub current_time_ms: u64,
    /// 主媒体是否正在播放。
    pub is_playing: bool,
}

impl PlaybackClock {
    /// 创建一个位于指定位置的时钟。
    #[must_use]
    pub fn new(current_time_ms: u64, is_playing: bool) -> Self {
        Self {
            current_time_ms,
            is_playing,
        }
    }
}
