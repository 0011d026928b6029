//! 播放模块
//!
//! 该模块包含播放时钟、播放界面的能力抽象、多轨同步器，
//! 以及把同步器和歌词激活连接起来的卡拉 OK 会话。

pub mod clock;
pub mod session;
pub mod surface;
pub mod synchronizer;

pub use clock::PlaybackClock;
pub use session::KaraokeSession;
pub use surface::{
    FollowerRole, FollowerSurface, ListenerId, MasterSurface, MediaEventKind, MediaListener,
    SurfaceError,
};
pub use synchronizer::{SyncState, TransportSynchronizer};
