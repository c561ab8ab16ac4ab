//! 各消息族群的管理器

mod adjourn;
mod board;
mod offer;
mod seek;

pub use adjourn::AdjournManager;
pub use board::BoardManager;
pub use offer::OfferManager;
pub use seek::SeekManager;

use crate::dispatch::LineHandler;

/// 默认注册的全部管理器
pub fn default_handlers() -> Vec<Box<dyn LineHandler>> {
    vec![
        Box::new(SeekManager::new()),
        Box::new(OfferManager::new()),
        Box::new(BoardManager::new()),
        Box::new(AdjournManager::new()),
    ]
}
