//! 播放界面的能力抽象。
//!
//! 同步器只依赖这里定义的最小能力集合，而不依赖任何具体的媒体技术，
//! 因此可以在测试中用假的时钟和事件源替代真正的视频、音频元素。

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// 播放界面可能报告的错误。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// 运行时拒绝了播放请求（例如自动播放策略）。
    #[error("播放请求被拒绝: {0}")]
    PlayRejected(String),
    /// 试图移除一个不存在的监听器。
    #[error("找不到监听器 #{0}")]
    ListenerNotFound(ListenerId),
}

/// 主媒体元素发出的事件类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum MediaEventKind {
    /// 播放位置随正常播放推进。
    TimeUpdate,
    /// 开始播放。
    Play,
    /// 暂停。
    Pause,
    /// 一次离散的跳转已完成。
    Seeked,
}

/// 由主媒体分配的监听器标识。
pub type ListenerId = u64;

/// 主媒体事件的回调，参数为事件发生时主媒体的播放位置（毫秒）。
pub type MediaListener = Box<dyn FnMut(u64)>;

/// 伴随音轨的角色，决定它使用哪一个音量设置。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum FollowerRole {
    /// 伴奏音轨。
    Instrumental,
    /// 人声音轨。
    Vocal,
}

/// 作为计时主源的播放界面（通常是视频）。
pub trait MasterSurface {
    /// 当前播放位置（毫秒）。
    fn current_time_ms(&self) -> u64;

    /// 主媒体当前是否处于暂停状态。
    fn is_paused(&self) -> bool;

    /// 注册一个事件监听器。
    fn subscribe(&mut self, kind: MediaEventKind, listener: MediaListener) -> ListenerId;

    /// 移除一个之前注册的监听器。
    fn unsubscribe(&mut self, id: ListenerId) -> Result<(), SurfaceError>;

    /// 设置主媒体音量，范围 `[0, 1]`。
    fn set_volume(&mut self, _volume: f32) {}
}

/// 只跟随主媒体状态的播放界面（伴奏或人声音轨）。
///
/// 伴随音轨不会产生任何回流到播放时钟的事件。
pub trait FollowerSurface {
    /// 该音轨的角色。
    fn role(&self) -> FollowerRole;

    /// 当前是否处于暂停状态。
    fn is_paused(&self) -> bool;

    /// 请求开始播放，运行时可能拒绝。
    fn play(&mut self) -> Result<(), SurfaceError>;

    /// 暂停播放。
    fn pause(&mut self);

    /// 将播放位置设置为 `ms`。
    fn set_time_ms(&mut self, ms: u64);

    /// 设置音量，范围 `[0, 1]`。
    fn set_volume(&mut self, _volume: f32) {}
}
