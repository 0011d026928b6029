//! # 卡拉 OK 会话
//!
//! 把一首歌的歌词事件、多轨同步器和歌词激活连接在一起：
//! 同步器每次报告新的播放时间，会话就重新计算一次当前应显示的歌词。

use std::{cell::RefCell, rc::Rc, sync::Arc};

use tracing::{info, warn};

use crate::{
    config::{PlayerConfig, VolumeSettings},
    error::Result,
    lyrics::{LyricEvent, active_events},
    model::Song,
    playback::{
        clock::PlaybackClock,
        surface::{FollowerSurface, MasterSurface},
        synchronizer::{SyncState, TransportSynchronizer},
    },
};

/// 当前歌曲的歌词显示状态。
#[derive(Debug, Default)]
struct LyricDisplay {
    song_id: Option<String>,
    events: Arc<[LyricEvent]>,
    buffer_ms: u64,
    /// 上一次计算时的播放位置，位置不变时复用结果
    last_time_ms: Option<u64>,
    active: Vec<LyricEvent>,
}

impl LyricDisplay {
    fn refresh(&mut self, now_ms: u64) {
        if self.last_time_ms == Some(now_ms) {
            return;
        }
        self.active = active_events(&self.events, now_ms, self.buffer_ms)
            .into_iter()
            .cloned()
            .collect();
        self.last_time_ms = Some(now_ms);
    }

    fn reset(&mut self, song_id: Option<String>, events: Arc<[LyricEvent]>) {
        self.song_id = song_id;
        self.events = events;
        self.last_time_ms = None;
        self.active.clear();
    }
}

/// 一个播放会话，同一时刻只播放一首歌。
pub struct KaraokeSession {
    synchronizer: TransportSynchronizer,
    display: Rc<RefCell<LyricDisplay>>,
    volume: VolumeSettings,
}

impl KaraokeSession {
    /// 使用给定配置创建一个空闲的会话。
    pub fn new(config: &PlayerConfig) -> Self {
        let display = Rc::new(RefCell::new(LyricDisplay {
            buffer_ms: config.lyric_buffer_ms,
            ..Default::default()
        }));

        let mut synchronizer = TransportSynchronizer::new();
        let tick_display = Rc::clone(&display);
        synchronizer.set_tick_observer(Box::new(move |clock: &PlaybackClock| {
            tick_display.borrow_mut().refresh(clock.current_time_ms);
        }));

        Self {
            synchronizer,
            display,
            volume: config.volume.clamped(),
        }
    }

    /// 切换到一首新歌。
    ///
    /// 先卸载旧的主媒体并移除它的全部监听器，再替换歌词，最后挂接新的主媒体。
    ///
    /// # 参数
    /// * `song` - 要播放的歌曲。
    /// * `master` - 播放这首歌视频的主媒体。
    /// * `followers` - 伴奏与人声音轨。
    pub fn load_song(
        &mut self,
        song: &Song,
        master: Rc<RefCell<dyn MasterSurface>>,
        followers: Vec<Box<dyn FollowerSurface>>,
    ) {
        if let Err(e) = self.synchronizer.detach() {
            warn!("[Session] 卸载上一首歌的主媒体失败: {e}");
        }

        self.display
            .borrow_mut()
            .reset(Some(song.id.clone()), Arc::clone(&song.lyrics));

        self.synchronizer.attach(master, followers);
        self.synchronizer.set_volume(self.volume);
        info!(
            "[Session] 开始播放 '{}'，共 {} 个歌词事件。",
            song.display_name(),
            song.lyrics.len()
        );
    }

    /// 结束当前歌曲，回到空闲状态。
    pub fn close(&mut self) -> Result<()> {
        let result = self.synchronizer.detach();
        self.display.borrow_mut().reset(None, Arc::from(Vec::new()));
        result
    }

    /// 当前应显示的歌词事件，按开始时间排序。
    pub fn active_lyrics(&self) -> Vec<LyricEvent> {
        self.display.borrow().active.clone()
    }

    /// 当前应显示的歌词文本，已去除标记字符。
    pub fn active_texts(&self) -> Vec<String> {
        self.display
            .borrow()
            .active
            .iter()
            .map(LyricEvent::display_text)
            .collect()
    }

    /// 当前播放时钟。
    pub fn clock(&self) -> PlaybackClock {
        self.synchronizer.clock()
    }

    /// 同步器状态。
    pub fn state(&self) -> SyncState {
        self.synchronizer.state()
    }

    /// 正在播放的歌曲 ID。
    pub fn current_song_id(&self) -> Option<String> {
        self.display.borrow().song_id.clone()
    }

    /// 调整音量并立即应用到当前的音轨。
    pub fn set_volume(&mut self, volume: VolumeSettings) {
        self.volume = volume.clamped();
        self.synchronizer.set_volume(self.volume);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SongRecord;
    use crate::playback::{
        surface::FollowerRole,
        test_support::{FakeFollower, FakeMaster},
    };

    fn new_song(id: &str, script: &str) -> Song {
        Song::from_record(SongRecord {
            id: Some(id.to_string()),
            title: Some(id.to_string()),
            artist: Some("Tester".to_string()),
            year: Some(2024),
            script: script.to_string(),
            ..Default::default()
        })
    }

    fn followers() -> Vec<Box<dyn FollowerSurface>> {
        let (music, _) = FakeFollower::new(FollowerRole::Instrumental);
        let (vocals, _) = FakeFollower::new(FollowerRole::Vocal);
        let followers: Vec<Box<dyn FollowerSurface>> = vec![Box::new(music), Box::new(vocals)];
        followers
    }

    #[test]
    fn test_time_updates_drive_active_lyrics() {
        let song = new_song("a", "#BPM:120\n: 0 2 0 one\n* 2 2 0 *two*\n- 4 2 0 ~");
        let master = Rc::new(RefCell::new(FakeMaster::new(0, true)));
        let mut session = KaraokeSession::new(&PlayerConfig::default());
        session.load_song(&song, master.clone(), followers());

        assert_eq!(session.active_texts(), vec!["one".to_string()]);

        master.borrow_mut().play();
        master.borrow_mut().advance_to(1050);
        assert_eq!(session.active_texts(), vec!["one".to_string(), "two".to_string()]);

        master.borrow_mut().advance_to(2200);
        assert!(session.active_texts().is_empty());
        assert_eq!(session.clock(), PlaybackClock::new(2200, true));
    }

    #[test]
    fn test_switching_song_ignores_old_master() {
        let first = new_song("first", "#BPM:60\n: 0 100 0 old");
        let second = new_song("second", "#BPM:60\n: 50 10 0 new");
        let master_a = Rc::new(RefCell::new(FakeMaster::new(0, true)));
        let master_b = Rc::new(RefCell::new(FakeMaster::new(0, true)));

        let mut session = KaraokeSession::new(&PlayerConfig::default());
        session.load_song(&first, master_a.clone(), followers());
        session.load_song(&second, master_b.clone(), followers());

        assert_eq!(master_a.borrow().listener_count(), 0);
        master_a.borrow_mut().advance_to(55_000);
        assert!(session.active_texts().is_empty());
        assert_eq!(session.clock().current_time_ms, 0);

        master_b.borrow_mut().advance_to(55_000);
        assert_eq!(session.active_texts(), vec!["new".to_string()]);
        assert_eq!(session.current_song_id().as_deref(), Some("second"));
    }

    #[test]
    fn test_pause_at_new_position_refreshes_lyrics() {
        let song = new_song("a", "#BPM:60\n: 0 1 0 first\n: 5 1 0 second");
        let master = Rc::new(RefCell::new(FakeMaster::new(0, true)));
        let mut session = KaraokeSession::new(&PlayerConfig::default());
        session.load_song(&song, master.clone(), followers());
        assert_eq!(session.active_texts(), vec!["first".to_string()]);

        master.borrow_mut().time_ms = 5200;
        master.borrow_mut().pause();
        assert_eq!(session.clock().current_time_ms, 5200);
        assert_eq!(session.active_texts(), vec!["second".to_string()]);
    }

    #[test]
    fn test_close_returns_to_idle() {
        let song = new_song("a", ": 0 100 0 la");
        let master = Rc::new(RefCell::new(FakeMaster::new(0, true)));
        let mut session = KaraokeSession::new(&PlayerConfig::default());
        session.load_song(&song, master.clone(), followers());

        session.close().unwrap();
        assert_eq!(session.state(), SyncState::Idle);
        assert!(session.active_lyrics().is_empty());
        assert!(session.current_song_id().is_none());
    }
}
