//! # 多轨同步器
//!
//! 一个主媒体（视频）负责推进播放时间，伴奏和人声两条伴随音轨只镜像它的
//! 播放、暂停状态和跳转位置，自身不作为计时源。
//!
//! 同步只在离散的跳转完成时写入伴随音轨的位置，正常播放中的微小漂移不做连续校正。
//!
//! 所有回调都在同一个线程上按事件循环串行执行。

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use strum::IntoEnumIterator;
use tracing::{debug, error, info, warn};

use crate::{
    config::VolumeSettings,
    error::{KaraokeError, Result},
    playback::{
        clock::PlaybackClock,
        surface::{FollowerRole, FollowerSurface, ListenerId, MasterSurface, MediaEventKind},
    },
};

/// 每次播放时钟变化时调用的观察者。
pub type TickObserver = Box<dyn FnMut(&PlaybackClock)>;

/// 同步器的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// 没有挂接主媒体。
    Idle,
    /// 已挂接主媒体与伴随音轨。
    Syncing,
}

/// 所有监听器回调共享的可变状态。
struct SyncCore {
    /// 当前有效的挂接编号，`0` 表示没有任何挂接。
    session: u64,
    clock: PlaybackClock,
    followers: Vec<Box<dyn FollowerSurface>>,
    on_tick: Option<TickObserver>,
}

impl SyncCore {
    fn handle(&mut self, kind: MediaEventKind, session: u64, time_ms: u64) {
        if session != self.session {
            debug!("[Sync] 忽略来自已卸载主媒体 (会话 {session}) 的 {kind} 事件。");
            return;
        }

        let changed = match kind {
            MediaEventKind::TimeUpdate => {
                let changed = self.clock.current_time_ms != time_ms;
                self.clock.current_time_ms = time_ms;
                changed
            }
            MediaEventKind::Play => {
                self.clock.current_time_ms = time_ms;
                self.clock.is_playing = true;
                self.start_followers();
                true
            }
            MediaEventKind::Pause => {
                let changed = self.clock.is_playing || self.clock.current_time_ms != time_ms;
                self.clock.current_time_ms = time_ms;
                self.clock.is_playing = false;
                self.pause_followers();
                changed
            }
            MediaEventKind::Seeked => {
                self.clock.current_time_ms = time_ms;
                for follower in &mut self.followers {
                    follower.set_time_ms(time_ms);
                }
                true
            }
        };

        if changed {
            self.notify();
        }
    }

    /// 每次播放转换只尝试一次，被拒绝时记录日志并继续。
    fn start_followers(&mut self) {
        for follower in &mut self.followers {
            if !follower.is_paused() {
                continue;
            }
            if let Err(e) = follower.play() {
                warn!("[Sync] {} 音轨播放失败，已忽略: {e}", follower.role());
            }
        }
    }

    fn pause_followers(&mut self) {
        for follower in &mut self.followers {
            if !follower.is_paused() {
                follower.pause();
            }
        }
    }

    fn notify(&mut self) {
        if let Some(observer) = self.on_tick.as_mut() {
            observer(&self.clock);
        }
    }
}

/// 把伴随音轨锁定到主媒体上的同步器。
pub struct TransportSynchronizer {
    core: Rc<RefCell<SyncCore>>,
    master: Option<Rc<RefCell<dyn MasterSurface>>>,
    listeners: Vec<ListenerId>,
    next_session: u64,
}

impl Default for TransportSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportSynchronizer {
    /// 创建一个处于 `Idle` 状态的同步器。
    pub fn new() -> Self {
        Self {
            core: Rc::new(RefCell::new(SyncCore {
                session: 0,
                clock: PlaybackClock::default(),
                followers: Vec::new(),
                on_tick: None,
            })),
            master: None,
            listeners: Vec::new(),
            next_session: 1,
        }
    }

    /// 当前状态。
    pub fn state(&self) -> SyncState {
        if self.master.is_some() {
            SyncState::Syncing
        } else {
            SyncState::Idle
        }
    }

    /// 当前播放时钟的快照。
    pub fn clock(&self) -> PlaybackClock {
        self.core.borrow().clock
    }

    /// 设置播放时钟变化时的观察者，替换之前的观察者。
    pub fn set_tick_observer(&mut self, observer: TickObserver) {
        self.core.borrow_mut().on_tick = Some(observer);
    }

    /// 挂接一个主媒体和它的伴随音轨。
    ///
    /// 如果已经挂接了其他主媒体，会先同步地移除它的全部监听器，
    /// 保证旧主媒体的回调不会在新主媒体挂接后触发。
    ///
    /// # 参数
    /// * `master` - 作为计时主源的播放界面。
    /// * `followers` - 需要镜像主媒体状态的伴随音轨。
    pub fn attach(
        &mut self,
        master: Rc<RefCell<dyn MasterSurface>>,
        followers: Vec<Box<dyn FollowerSurface>>,
    ) {
        if self.master.is_some()
            && let Err(e) = self.detach()
        {
            warn!("[Sync] 卸载旧主媒体时出错，继续挂接新主媒体: {e}");
        }

        let session = self.next_session;
        self.next_session += 1;

        let (current_time_ms, is_paused) = {
            let master_ref = master.borrow();
            (master_ref.current_time_ms(), master_ref.is_paused())
        };

        {
            let mut core = self.core.borrow_mut();
            core.session = session;
            core.clock = PlaybackClock::new(current_time_ms, !is_paused);
            core.followers = followers;
            for follower in &mut core.followers {
                follower.set_time_ms(current_time_ms);
            }
            if !is_paused {
                core.start_followers();
            }
        }

        {
            let mut master_mut = master.borrow_mut();
            for kind in MediaEventKind::iter() {
                let weak_core: Weak<RefCell<SyncCore>> = Rc::downgrade(&self.core);
                let id = master_mut.subscribe(
                    kind,
                    Box::new(move |time_ms| {
                        let Some(core) = weak_core.upgrade() else {
                            return;
                        };
                        match core.try_borrow_mut() {
                            Ok(mut core) => core.handle(kind, session, time_ms),
                            Err(_) => warn!("[Sync] 重入的 {kind} 事件已丢弃。"),
                        };
                    }),
                );
                self.listeners.push(id);
            }
        }

        self.master = Some(master);
        info!(
            "[Sync] 已挂接主媒体 (会话 {session})，伴随音轨 {} 条。",
            self.core.borrow().followers.len()
        );
        self.core.borrow_mut().notify();
    }

    /// 卸载当前主媒体。
    ///
    /// 同步地移除主媒体上的所有监听器，然后暂停并释放伴随音轨，回到 `Idle`。
    /// 移除监听器失败会被记录并作为错误返回，但状态依然会被重置。
    pub fn detach(&mut self) -> Result<()> {
        let Some(master) = self.master.take() else {
            return Ok(());
        };

        let mut first_error = None;
        {
            let mut master_mut = master.borrow_mut();
            for id in self.listeners.drain(..) {
                if let Err(e) = master_mut.unsubscribe(id) {
                    error!("[Sync] 移除监听器 #{id} 失败: {e}");
                    first_error.get_or_insert(e);
                }
            }
        }

        let mut core = self.core.borrow_mut();
        let session = core.session;
        core.session = 0;
        core.pause_followers();
        core.followers.clear();
        core.clock = PlaybackClock::default();
        drop(core);

        info!("[Sync] 已卸载主媒体 (会话 {session})。");
        match first_error {
            Some(e) => Err(KaraokeError::from(e)),
            None => Ok(()),
        }
    }

    /// 将音量应用到主媒体和所有伴随音轨。
    ///
    /// `music` 作用于主媒体与伴奏音轨，`voice` 作用于人声音轨。
    pub fn set_volume(&mut self, volume: VolumeSettings) {
        let volume = volume.clamped();
        if let Some(master) = &self.master {
            master.borrow_mut().set_volume(volume.music);
        }
        for follower in &mut self.core.borrow_mut().followers {
            let value = match follower.role() {
                FollowerRole::Instrumental => volume.music,
                FollowerRole::Vocal => volume.voice,
            };
            follower.set_volume(value);
        }
    }
}

impl Drop for TransportSynchronizer {
    fn drop(&mut self) {
        if let Err(e) = self.detach() {
            error!("[Sync] 释放同步器时卸载主媒体失败: {e}");
        }
    }
}
