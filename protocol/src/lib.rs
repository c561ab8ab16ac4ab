//! FICS 协议解析库
//!
//! 包含:
//! - block mode 行分帧 (LineFramer)
//! - 各类文本行的解析：seek、提议/挑战、style 12、对局公告、封盘列表、预览着法表
//! - 基础值类型（颜色、类别、等级分、时限、结果、封盘原因）
//! - 棋谱记录 (PGN) 与时钟重建
//! - 传输层抽象 (LineConnector, LineConnection traits)

mod announce;
mod constants;
mod error;
mod framing;
mod movelist;
mod offer;
mod record;
mod seek;
mod stored;
mod style12;
mod transport;
mod types;

pub use announce::{GameCreation, GameNotice};
pub use constants::*;
pub use error::{ParseError, ProtocolError, Result};
pub use framing::{FramedLine, LineFramer, ReplyContext};
pub use movelist::{
    is_move_table_rule, parse_elapsed, parse_move_table_header, MatchInfo, MoveRow, PreviewHeader,
    ReasonLine,
};
pub use offer::{Challenge, Offer, OfferId, OfferKind, OfferLine};
pub use record::{format_clock, GameMetadata, GameRecord, MoveRecord};
pub use seek::{parse_seek_removal, Seek, SeekId, SeekUpdate};
pub use stored::{
    is_stored_header, parse_no_stored, ply_count, ServerTime, StoredGame, NO_STORED_SUFFIX,
    STORED_HEADER_PREFIX,
};
pub use style12::{Style12, STYLE12_TAG};
pub use transport::{
    LineConnection, LineConnector, LineReader, LineWriter, NetworkConfig, TcpLineConnection,
    TcpLineConnector,
};
pub use types::{AdjournReason, Color, GameCategory, GameResult, Rating, TimeControl};
