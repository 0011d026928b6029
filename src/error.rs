//! 定义了整个 `karaoke-helper` 库的错误类型 `KaraokeError`。
//!
//! 注意：歌词解析与歌词激活永远不会失败，它们不会产生这里的任何错误。

use std::io;
use thiserror::Error;

use crate::playback::surface::SurfaceError;

/// `karaoke-helper` 库的通用错误枚举。
#[derive(Error, Debug)]
pub enum KaraokeError {
    /// I/O 错误 (源自 `io::Error`)
    #[error("I/O 错误: {0}")]
    Io(#[from] io::Error),

    /// JSON 解析失败 (源自 `serde_json::Error`)
    #[error("JSON 解析失败: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// 歌曲目录提供商返回了错误或无法读取的数据
    #[error("歌曲目录 `{0}` 加载失败")]
    Catalog(String),

    /// 没有注册任何歌曲目录提供商
    #[error("未注册任何歌曲目录提供商")]
    NoProviders,

    /// 配置读写失败
    #[error("配置错误: {0}")]
    Config(String),

    /// 播放界面（主视频或伴随音轨）报告的错误
    #[error("播放错误: {0}")]
    Playback(String),
}

/// `KaraokeError` 的 `Result` 类型别名，方便在函数签名中使用。
pub type Result<T> = std::result::Result<T, KaraokeError>;

impl From<SurfaceError> for KaraokeError {
    fn from(err: SurfaceError) -> Self {
        Self::Playback(err.to_string())
    }
}
