//! 对局与对局注册表

use std::collections::BTreeMap;

use fics_protocol::{
    AdjournReason, Color, GameCategory, ServerTime, StoredGame, TimeControl, FEN_START,
};
use serde::{Deserialize, Serialize};

/// 局面：FEN 或完整棋谱二选一
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardPosition {
    Fen(String),
    /// PGN 标签头 + 着法行
    Transcript(String),
}

/// 时钟 + 局面快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub white_clock_ms: u64,
    pub black_clock_ms: u64,
    pub position: BoardPosition,
}

impl Board {
    pub fn with_fen(white_clock_ms: u64, black_clock_ms: u64, fen: impl Into<String>) -> Self {
        Self {
            white_clock_ms,
            black_clock_ms,
            position: BoardPosition::Fen(fen.into()),
        }
    }

    pub fn with_transcript(
        white_clock_ms: u64,
        black_clock_ms: u64,
        transcript: impl Into<String>,
    ) -> Self {
        Self {
            white_clock_ms,
            black_clock_ms,
            position: BoardPosition::Transcript(transcript.into()),
        }
    }

    pub fn fen(&self) -> Option<&str> {
        match &self.position {
            BoardPosition::Fen(fen) => Some(fen),
            BoardPosition::Transcript(_) => None,
        }
    }

    pub fn transcript(&self) -> Option<&str> {
        match &self.position {
            BoardPosition::Transcript(pgn) => Some(pgn),
            BoardPosition::Fen(_) => None,
        }
    }
}

/// 进行中的对局
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub number: u32,
    pub white: String,
    pub black: String,
    pub rated: bool,
    pub category: GameCategory,
    pub private: bool,
    pub time: TimeControl,
    pub board: Board,
}

impl Game {
    /// 只有编号的占位对局，字段等待后续消息填充
    pub fn placeholder(number: u32) -> Self {
        Self {
            number,
            white: String::new(),
            black: String::new(),
            rated: false,
            category: GameCategory::Untimed,
            private: false,
            time: TimeControl::default(),
            board: Board::with_fen(0, 0, FEN_START),
        }
    }
}

/// 封盘（可续下）的对局
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjournedGame {
    pub white: String,
    pub black: String,
    /// 我方颜色，预览中无法判断时为 None
    pub our_color: Option<Color>,
    pub ply_count: Option<u32>,
    pub adjourned_at: Option<ServerTime>,
    pub reason: Option<AdjournReason>,
    pub board: Option<Board>,
    pub rated: bool,
    pub category: GameCategory,
    pub private: bool,
    pub time: TimeControl,
    pub opponent_online: Option<bool>,
    pub eco: Option<String>,
}

impl AdjournedGame {
    /// 由列表行构造，`us` 为会话用户名
    pub fn from_stored(row: &StoredGame, us: &str) -> Self {
        let (white, black) = match row.our_color {
            Color::White => (us.to_string(), row.opponent.clone()),
            Color::Black => (row.opponent.clone(), us.to_string()),
        };
        Self {
            white,
            black,
            our_color: Some(row.our_color),
            ply_count: Some(row.ply_count),
            adjourned_at: Some(row.adjourned_at.clone()),
            reason: None,
            board: None,
            rated: row.rated,
            category: row.category,
            private: row.private,
            time: row.time,
            opponent_online: Some(row.opponent_online),
            eco: row.eco.clone(),
        }
    }
}

/// 对局注册表
#[derive(Debug, Default)]
pub struct GameRegistry {
    games: BTreeMap<u32, Game>,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取对局，不存在时创建占位对局
    pub fn get_or_create(&mut self, number: u32) -> &mut Game {
        self.games
            .entry(number)
            .or_insert_with(|| Game::placeholder(number))
    }

    /// 登记对局，返回被替换的旧对局
    pub fn insert(&mut self, game: Game) -> Option<Game> {
        self.games.insert(game.number, game)
    }

    /// 移除对局（玩家的当前对局引用由 SessionState::remove_game 负责清理）
    pub fn remove(&mut self, number: u32) -> Option<Game> {
        self.games.remove(&number)
    }

    pub fn get(&self, number: u32) -> Option<&Game> {
        self.games.get(&number)
    }

    pub fn get_mut(&mut self, number: u32) -> Option<&mut Game> {
        self.games.get_mut(&number)
    }

    pub fn contains(&self, number: u32) -> bool {
        self.games.contains_key(&number)
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Game> {
        self.games.values()
    }
}
