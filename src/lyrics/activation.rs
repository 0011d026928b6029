//! # 歌词激活
//!
//! 根据当前播放时间，计算此刻应当显示的歌词事件。
//!
//! 这里的函数都是纯函数，不保存任何调用之间的状态，
//! 相同的输入总是得到相同的输出，可以安全地按 `(events, now_ms)` 缓存。

use crate::lyrics::types::LyricEvent;

/// 默认的结束边界缓冲（毫秒）。
///
/// 媒体元素的时间更新是离散的，没有缓冲时歌词可能在下一行出现前一帧熄灭。
pub const DEFAULT_BUFFER_MS: u64 = 100;

/// 判断单个事件在 `now_ms` 时刻是否处于激活状态。
///
/// 缓冲只作用于结束边界，开始边界不提前显示。
#[must_use]
pub fn is_active(event: &LyricEvent, now_ms: u64, buffer_ms: u64) -> bool {
    event.is_renderable()
        && event.start_ms <= now_ms
        && event.end_ms.saturating_add(buffer_ms) >= now_ms
}

/// 计算当前应当渲染的歌词事件。
///
/// # 参数
/// * `events` - 一首歌的全部歌词事件，顺序任意。
/// * `now_ms` - 当前播放位置（毫秒）。
/// * `buffer_ms` - 结束边界的缓冲，通常为 [`DEFAULT_BUFFER_MS`]。
///
/// # 返回
/// 按 `start_ms` 升序排列的激活事件。开始时间相同的事件保持输入中的相对顺序。
#[must_use]
pub fn active_events(events: &[LyricEvent], now_ms: u64, buffer_ms: u64) -> Vec<&LyricEvent> {
    let mut active: Vec<&LyricEvent> = events
        .iter()
        .filter(|event| is_active(event, now_ms, buffer_ms))
        .collect();
    // 稳定排序，同一时刻的多声部歌词按书写顺序从左到右显示
    active.sort_by_key(|event| event.start_ms);
    active
}

/// 计算当前应当渲染的歌词文本，已去除标记字符。
#[must_use]
pub fn active_display_texts(events: &[LyricEvent], now_ms: u64, buffer_ms: u64) -> Vec<String> {
    active_events(events, now_ms, buffer_ms)
        .into_iter()
        .map(LyricEvent::display_text)
        .collect()
}
