//! FICS 客户端会话层
//!
//! 包含:
//! - 玩家 / 对局注册表
//! - 预测引擎（行分类 + 分发表）
//! - seek、提议、棋盘、封盘四个管理器
//! - 类型化事件总线
//! - 客户端配置

pub mod config;
pub mod dispatch;
pub mod events;
pub mod game;
pub mod managers;
pub mod player;
pub mod session;
pub mod state;

pub use config::ClientConfig;
pub use dispatch::{classify, Family, HandlerContext, LineHandler, MessageKind, PredictionEngine};
pub use events::{Event, EventBus, EventKind, SubscriptionId};
pub use game::{AdjournedGame, Board, BoardPosition, Game, GameRegistry};
pub use managers::{default_handlers, AdjournManager, BoardManager, OfferManager, SeekManager};
pub use player::{Player, PlayerRegistry};
pub use session::Session;
pub use state::SessionState;
