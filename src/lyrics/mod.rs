//! 节拍歌词处理核心模块
//!
//! 包括脚本解析（节拍到绝对时间的换算）与播放时的歌词激活。

pub mod activation;
pub mod parsers;
pub mod types;
pub mod utils;

pub use activation::{DEFAULT_BUFFER_MS, active_display_texts, active_events};
pub use parsers::ultrastar_parser::{parse_script, parse_ultrastar};
pub use types::{LyricEvent, LyricKind, ParsedScript, TempoContext};
