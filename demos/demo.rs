//! 用于演示 `karaoke-helper` 库的核心功能。
//!
//! ## 如何运行
//!
//! ```bash
//! cargo run --package karaoke_helper_rs --example demo -- [脚本文件路径]
//! ```
//!
//! 不提供路径时使用仓库自带的示例脚本。

use std::{cell::RefCell, rc::Rc};

use karaoke_helper_rs::{
    KaraokeHelper, SongRecord,
    catalog::MemoryCatalog,
    error::Result,
    lyrics::{LyricKind, parse_ultrastar},
    playback::{
        FollowerRole, FollowerSurface, ListenerId, MasterSurface, MediaEventKind, MediaListener,
        SurfaceError,
    },
};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SAMPLE_SCRIPT: &str = include_str!("../tests/test_data/midnight_harbor.txt");

/// 一个按固定步长推进时间的模拟视频。
struct SimulatedVideo {
    time_ms: u64,
    paused: bool,
    listeners: Vec<(ListenerId, MediaEventKind, MediaListener)>,
    next_id: ListenerId,
}

impl SimulatedVideo {
    fn emit(&mut self, kind: MediaEventKind) {
        let time_ms = self.time_ms;
        for (_, listener_kind, listener) in &mut self.listeners {
            if *listener_kind == kind {
                listener(time_ms);
            }
        }
    }
}

impl MasterSurface for SimulatedVideo {
    fn current_time_ms(&self) -> u64 {
        self.time_ms
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn subscribe(&mut self, kind: MediaEventKind, listener: MediaListener) -> ListenerId {
        self.next_id += 1;
        self.listeners.push((self.next_id, kind, listener));
        self.next_id
    }

    fn unsubscribe(&mut self, id: ListenerId) -> std::result::Result<(), SurfaceError> {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _, _)| *listener_id != id);
        if self.listeners.len() == before {
            return Err(SurfaceError::ListenerNotFound(id));
        }
        Ok(())
    }
}

/// 只打印日志的音轨。
struct LoggingTrack {
    role: FollowerRole,
    paused: bool,
}

impl FollowerSurface for LoggingTrack {
    fn role(&self) -> FollowerRole {
        self.role
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn play(&mut self) -> std::result::Result<(), SurfaceError> {
        info!("{} 音轨开始播放", self.role);
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        info!("{} 音轨暂停", self.role);
        self.paused = true;
    }

    fn set_time_ms(&mut self, ms: u64) {
        info!("{} 音轨跳转到 {ms}ms", self.role);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let script = match std::env::args().nth(1) {
        Some(path) => {
            info!("正在读取脚本: {path}");
            tokio::fs::read_to_string(&path).await?
        }
        None => SAMPLE_SCRIPT.to_string(),
    };

    let parsed = parse_ultrastar(&script);
    for warning in &parsed.warnings {
        warn!("{warning}");
    }

    println!("{:>8} {:>8}  {:<13} 文本", "开始", "结束", "类型");
    for event in &parsed.events {
        let kind = match event.kind {
            LyricKind::Normal => "普通",
            LyricKind::Golden => "金色",
            LyricKind::Prolongation => "延长",
            LyricKind::Pause => "停顿",
        };
        println!(
            "{:>8} {:>8}  {:<13} {}",
            event.start_ms,
            event.end_ms,
            kind,
            event.display_text()
        );
    }

    let mut helper = KaraokeHelper::default();
    helper.add_provider(MemoryCatalog::new(vec![SongRecord {
        id: Some("demo".to_string()),
        script,
        ..Default::default()
    }]));
    let songs = helper.load_songs().await?;
    let Some(song) = songs.first() else {
        return Ok(());
    };
    info!("已加载歌曲: {}", song.display_name());

    let video = Rc::new(RefCell::new(SimulatedVideo {
        time_ms: 0,
        paused: true,
        listeners: Vec::new(),
        next_id: 0,
    }));
    let tracks: Vec<Box<dyn FollowerSurface>> = vec![
        Box::new(LoggingTrack {
            role: FollowerRole::Instrumental,
            paused: true,
        }),
        Box::new(LoggingTrack {
            role: FollowerRole::Vocal,
            paused: true,
        }),
    ];

    let mut session = helper.new_session();
    session.load_song(song, video.clone(), tracks);

    {
        let mut v = video.borrow_mut();
        v.paused = false;
        v.emit(MediaEventKind::Play);
    }

    let end_ms = song.lyrics.iter().map(|e| e.end_ms).max().unwrap_or(0);
    let mut last_line: Vec<String> = Vec::new();
    let mut now = 0;
    while now <= end_ms + 500 {
        {
            let mut v = video.borrow_mut();
            v.time_ms = now;
            v.emit(MediaEventKind::TimeUpdate);
        }
        let texts = session.active_texts();
        if texts != last_line {
            println!("[{now:>6}ms] {}", texts.join(" "));
            last_line = texts;
        }
        now += 50;
    }

    {
        let mut v = video.borrow_mut();
        v.paused = true;
        v.emit(MediaEventKind::Pause);
    }
    session.close()?;
    Ok(())
}
