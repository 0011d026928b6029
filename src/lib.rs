#![warn(missing_docs)]

//! # Karaoke Helper RS
//!
//! 一个用于卡拉 OK 播放的 Rust 库，负责播放器中真正需要时间精度的部分。
//!
//! ## 主要功能
//!
//! - **节拍歌词解析**: 把 UltraStar 风格的节拍脚本（`#BPM`、`#GAP`、`#VIDEOGAP` 与音符行）
//!   换算为绝对时间的歌词事件。解析尽力而为，永远不会失败。
//! - **歌词激活**: 根据当前播放时间计算应当显示的歌词，结束边界带缓冲，结果按开始时间稳定排序。
//! - **多轨同步**: 视频作为计时主源，伴奏和人声音轨镜像它的播放、暂停与跳转。
//!
//! ## 解析与激活
//!
//! ```rust
//! use karaoke_helper_rs::lyrics::{DEFAULT_BUFFER_MS, active_display_texts, parse_script};
//!
//! let events = parse_script("#BPM:120\n: 0 2 0 Hel\n* 2 2 0 lo");
//! assert_eq!(events[1].start_ms, 1000);
//!
//! let texts = active_display_texts(&events, 1050, DEFAULT_BUFFER_MS);
//! assert_eq!(texts, vec!["Hel", "lo"]);
//! ```
//!
//! ## 加载歌曲
//!
//! ```rust,no_run
//! use karaoke_helper_rs::{KaraokeHelper, catalog::JsonCatalog, config::PlayerConfig};
//!
//! async {
//!     let mut helper = KaraokeHelper::new(PlayerConfig::default());
//!     helper.add_provider(JsonCatalog::new("songs/songs.json"));
//!
//!     match helper.load_songs().await {
//!         Ok(songs) => println!("共加载 {} 首歌曲。", songs.len()),
//!         Err(e) => eprintln!("加载失败: {}", e),
//!     }
//! };
//! ```
pub mod catalog;
pub mod config;
pub mod error;
pub mod lyrics;
pub mod model;
pub mod playback;
pub mod search;

use std::collections::HashSet;

use futures::future;
use tracing::{info, warn};

pub use crate::{
    error::{KaraokeError, Result},
    model::{Song, SongRecord},
};

use crate::{
    catalog::{CatalogProvider, JsonCatalog},
    config::PlayerConfig,
    playback::KaraokeSession,
};

// ==========================================================
//  顶层 API
// ==========================================================

/// 顶层卡拉 OK 助手，封装了歌曲目录提供商和播放器配置。
///
/// 这是与本库交互的主要入口点。
pub struct KaraokeHelper {
    providers: Vec<Box<dyn CatalogProvider>>,
    config: PlayerConfig,
}

impl Default for KaraokeHelper {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl KaraokeHelper {
    /// 使用给定配置创建一个没有任何目录提供商的实例。
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            providers: Vec::new(),
            config,
        }
    }

    /// 从用户配置目录加载配置并创建实例。
    ///
    /// 如果配置中指定了 `catalog_path`，会自动注册一个 [`JsonCatalog`]。
    pub fn from_user_config() -> Result<Self> {
        let config = config::load_config()?;
        let mut helper = Self::new(config);
        if let Some(path) = helper.config.catalog_path.clone() {
            helper.add_provider(JsonCatalog::new(path));
        }
        Ok(helper)
    }

    /// 当前配置。
    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// 注册一个歌曲目录提供商。提供商按注册顺序决定歌曲的排列顺序。
    pub fn add_provider(&mut self, provider: impl CatalogProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    /// 从所有提供商并发地加载歌曲，并解析每首歌的歌词脚本。
    ///
    /// 失败的提供商会被记录并跳过。重复的歌曲 ID 只保留第一次出现的歌曲。
    ///
    /// # 返回
    /// 按提供商注册顺序、再按目录顺序排列的歌曲列表。
    pub async fn load_songs(&self) -> Result<Vec<Song>> {
        if self.providers.is_empty() {
            return Err(KaraokeError::NoProviders);
        }

        let list_futures = self.providers.iter().map(|provider| provider.list_songs());
        let results = future::join_all(list_futures).await;

        let mut songs = Vec::new();
        let mut seen_ids = HashSet::new();
        for (provider, result) in self.providers.iter().zip(results) {
            match result {
                Ok(records) => {
                    info!("[Main] 目录 '{}' 返回 {} 条记录。", provider.name(), records.len());
                    for record in records {
                        let song = Song::from_record(record);
                        if seen_ids.insert(song.id.clone()) {
                            songs.push(song);
                        } else {
                            warn!("[Main] 跳过重复的歌曲 ID '{}'。", song.id);
                        }
                    }
                }
                Err(e) => {
                    warn!("[Main] 目录 '{}' 加载失败: {}. 将忽略此目录。", provider.name(), e);
                }
            }
        }

        Ok(songs)
    }

    /// 在已加载的歌曲中搜索，结果按匹配度排序。
    pub fn search<'a>(&self, songs: &'a [Song], query: &str) -> Vec<&'a Song> {
        search::search_songs(songs, query)
    }

    /// 使用当前配置创建一个新的播放会话。
    pub fn new_session(&self) -> KaraokeSession {
        KaraokeSession::new(&self.config)
    }
}
