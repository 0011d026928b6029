//! 负责处理播放器的持久化配置。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::error::{KaraokeError, Result};
use crate::lyrics::DEFAULT_BUFFER_MS;

/// 配置文件名。
const CONFIG_FILE_NAME: &str = "config.json";

/// 各音轨的音量设置，范围均为 `[0, 1]`。
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct VolumeSettings {
    /// 伴奏音量，同时作用于主视频和伴奏音轨。
    pub music: f32,
    /// 人声音轨音量。
    pub voice: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            music: 0.8,
            voice: 1.0,
        }
    }
}

impl VolumeSettings {
    /// 返回一个把两个音量都限制在 `[0, 1]` 内的副本。
    #[must_use]
    pub fn clamped(self) -> Self {
        let clamp = |v: f32| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 };
        Self {
            music: clamp(self.music),
            voice: clamp(self.voice),
        }
    }
}

/// 播放器配置。
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    /// 歌词结束边界的缓冲（毫秒）。
    pub lyric_buffer_ms: u64,
    /// 音量设置。
    pub volume: VolumeSettings,
    /// 可选的 `songs.json` 歌曲列表位置。
    pub catalog_path: Option<PathBuf>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            lyric_buffer_ms: DEFAULT_BUFFER_MS,
            volume: VolumeSettings::default(),
            catalog_path: None,
        }
    }
}

/// 获取应用配置目录下指定文件的完整路径。
///
/// # 参数
/// * `filename` - 目标配置文件的名称，例如 "config.json"。
pub(crate) fn get_config_file_path(filename: &str) -> Result<PathBuf> {
    if let Some(mut config_dir) = dirs::config_dir() {
        config_dir.push("karaoke-helper");
        fs::create_dir_all(&config_dir)?;
        config_dir.push(filename);
        Ok(config_dir)
    } else {
        Err(KaraokeError::Config("无法找到用户配置目录".to_string()))
    }
}

/// 从 JSON 文本解析配置，缺失的字段使用默认值，音量会被限制在合法范围内。
pub fn parse_config(content: &str) -> Result<PlayerConfig> {
    let mut config: PlayerConfig = serde_json::from_str(content)?;
    config.volume = config.volume.clamped();
    Ok(config)
}

/// 从用户配置目录加载配置。文件不存在时返回默认配置。
pub fn load_config() -> Result<PlayerConfig> {
    let config_path = get_config_file_path(CONFIG_FILE_NAME)?;

    match fs::read_to_string(&config_path) {
        Ok(content) => {
            let config = parse_config(&content)?;
            info!("[Config] 已从 {:?} 加载配置。", config_path);
            Ok(config)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("[Config] 配置文件不存在，使用默认配置。");
            Ok(PlayerConfig::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// 将配置序列化为 JSON 并保存到用户配置目录。
pub fn save_config(config: &PlayerConfig) -> Result<()> {
    let config_path = get_config_file_path(CONFIG_FILE_NAME)?;
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content)?;
    info!("[Config] 配置已保存。");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = parse_config(r#"{ "lyric_buffer_ms": 250 }"#).unwrap();
        assert_eq!(config.lyric_buffer_ms, 250);
        assert_eq!(config.volume, VolumeSettings::default());
        assert!(config.catalog_path.is_none());
    }

    #[test]
    fn test_volume_is_clamped_on_load() {
        let config = parse_config(r#"{ "volume": { "music": 1.7, "voice": -0.2 } }"#).unwrap();
        assert_eq!(config.volume.music, 1.0);
        assert_eq!(config.volume.voice, 0.0);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(matches!(
            parse_config("{ not json"),
            Err(KaraokeError::JsonParse(_))
        ));
    }

    #[test]
    fn test_config_round_trips_through_json() {
        let config = PlayerConfig {
            lyric_buffer_ms: 80,
            volume: VolumeSettings {
                music: 0.5,
                voice: 0.25,
            },
            catalog_path: Some(PathBuf::from("/srv/songs/songs.json")),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(parse_config(&json).unwrap(), config);
    }
}
