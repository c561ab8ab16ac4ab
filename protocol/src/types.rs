//! 基础值类型：颜色、对局类别、等级分、时限、对局结果、封盘原因

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{parse_number, ParseError};

/// 棋子颜色 / 执棋方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Black,
}

impl Color {
    /// 获取对方
    pub fn opponent(&self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// 从单字母解析（W/B，大小写不敏感）
    pub fn from_letter(c: char) -> Option<Color> {
        match c.to_ascii_uppercase() {
            'W' => Some(Color::White),
            'B' => Some(Color::Black),
            _ => None,
        }
    }
}

/// 对局类别
///
/// wild 的各个子类型单独列出，但共享同一个等级分类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameCategory {
    Lightning,
    Blitz,
    Standard,
    Untimed,
    Wild,
    Wild0,
    Wild1,
    Wild2,
    Wild3,
    Wild4,
    Wild5,
    Wild8,
    Wild8a,
    WildFr,
    Losers,
    Crazyhouse,
    Suicide,
    Atomic,
    Bughouse,
}

impl GameCategory {
    /// 所有类别
    pub const ALL: [GameCategory; 19] = [
        GameCategory::Lightning,
        GameCategory::Blitz,
        GameCategory::Standard,
        GameCategory::Untimed,
        GameCategory::Wild,
        GameCategory::Wild0,
        GameCategory::Wild1,
        GameCategory::Wild2,
        GameCategory::Wild3,
        GameCategory::Wild4,
        GameCategory::Wild5,
        GameCategory::Wild8,
        GameCategory::Wild8a,
        GameCategory::WildFr,
        GameCategory::Losers,
        GameCategory::Crazyhouse,
        GameCategory::Suicide,
        GameCategory::Atomic,
        GameCategory::Bughouse,
    ];

    /// 服务器使用的名称
    pub fn fics_name(&self) -> &'static str {
        match self {
            GameCategory::Lightning => "lightning",
            GameCategory::Blitz => "blitz",
            GameCategory::Standard => "standard",
            GameCategory::Untimed => "untimed",
            GameCategory::Wild => "wild",
            GameCategory::Wild0 => "wild/0",
            GameCategory::Wild1 => "wild/1",
            GameCategory::Wild2 => "wild/2",
            GameCategory::Wild3 => "wild/3",
            GameCategory::Wild4 => "wild/4",
            GameCategory::Wild5 => "wild/5",
            GameCategory::Wild8 => "wild/8",
            GameCategory::Wild8a => "wild/8a",
            GameCategory::WildFr => "wild/fr",
            GameCategory::Losers => "losers",
            GameCategory::Crazyhouse => "crazyhouse",
            GameCategory::Suicide => "suicide",
            GameCategory::Atomic => "atomic",
            GameCategory::Bughouse => "bughouse",
        }
    }

    /// 从服务器名称解析
    pub fn from_fics_name(name: &str) -> Result<GameCategory, ParseError> {
        let lower = name.to_ascii_lowercase();
        GameCategory::ALL
            .iter()
            .copied()
            .find(|c| c.fics_name() == lower)
            .ok_or_else(|| ParseError::UnknownCategory(name.to_string()))
    }

    /// 从列表中的单字母类别代码解析（如 stored 列表的 `[ br  2  12]`）
    pub fn from_code(code: char) -> Result<GameCategory, ParseError> {
        let category = match code {
            'l' => GameCategory::Lightning,
            'b' => GameCategory::Blitz,
            's' => GameCategory::Standard,
            'u' => GameCategory::Untimed,
            'w' => GameCategory::Wild,
            'z' => GameCategory::Crazyhouse,
            'B' => GameCategory::Bughouse,
            'L' => GameCategory::Losers,
            'S' => GameCategory::Suicide,
            'x' => GameCategory::Atomic,
            other => return Err(ParseError::UnknownCategory(other.to_string())),
        };
        Ok(category)
    }

    /// 等级分所属类别（wild 子类型归并到 wild）
    pub fn rating_category(&self) -> GameCategory {
        match self {
            GameCategory::Wild0
            | GameCategory::Wild1
            | GameCategory::Wild2
            | GameCategory::Wild3
            | GameCategory::Wild4
            | GameCategory::Wild5
            | GameCategory::Wild8
            | GameCategory::Wild8a
            | GameCategory::WildFr => GameCategory::Wild,
            other => *other,
        }
    }
}

impl fmt::Display for GameCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.fics_name())
    }
}

/// 等级分
///
/// 游客账号或不适用时，服务器显示 `----` / `++++`，统一归为 `Unrated`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rating {
    Rated(u32),
    Unrated,
}

impl Rating {
    /// 解析等级分文本
    ///
    /// 接受 `1291`、`1637E`、`(1945)`、`----`、`++++`。
    pub fn parse(text: &str) -> Result<Rating, ParseError> {
        let trimmed = text
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim();
        if trimmed.is_empty() || trimmed.chars().all(|c| c == '-' || c == '+') {
            return Ok(Rating::Unrated);
        }
        let digits = trimmed.trim_end_matches(|c: char| c.is_ascii_alphabetic());
        digits
            .parse()
            .map(Rating::Rated)
            .map_err(|_| ParseError::InvalidRating(text.to_string()))
    }

    /// 数值（未评级为 0）
    pub fn value(&self) -> u32 {
        match self {
            Rating::Rated(value) => *value,
            Rating::Unrated => 0,
        }
    }

    pub fn is_rated(&self) -> bool {
        matches!(self, Rating::Rated(_))
    }
}

impl Default for Rating {
    fn default() -> Self {
        Rating::Unrated
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// 时限：基础分钟 + 每步加秒
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeControl {
    pub minutes: u32,
    pub increment: u32,
}

impl TimeControl {
    pub fn new(minutes: u32, increment: u32) -> Self {
        Self { minutes, increment }
    }

    /// 从两个文本字段解析
    pub fn parse(minutes: &str, increment: &str) -> Result<Self, ParseError> {
        Ok(Self {
            minutes: parse_number("minutes", minutes)?,
            increment: parse_number("increment", increment)?,
        })
    }

    /// 基础时间（毫秒）
    pub fn base_ms(&self) -> i64 {
        i64::from(self.minutes) * 60_000
    }

    /// 加秒（毫秒）
    pub fn increment_ms(&self) -> i64 {
        i64::from(self.increment) * 1000
    }

    /// PGN TimeControl 标签格式，如 `300+0`
    pub fn to_pgn(&self) -> String {
        format!("{}+{}", u64::from(self.minutes) * 60, self.increment)
    }
}

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    /// 未结束（`*`）
    InProgress,
}

impl GameResult {
    /// 从结果记号解析
    pub fn from_token(token: &str) -> Option<GameResult> {
        match token {
            "1-0" => Some(GameResult::WhiteWins),
            "0-1" => Some(GameResult::BlackWins),
            "1/2-1/2" => Some(GameResult::Draw),
            "*" => Some(GameResult::InProgress),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::InProgress => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 封盘原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum AdjournReason {
    /// 双方均断线
    LostConnection = 5,
    /// 双方同意
    MutualAgreement = 6,
    /// 服务器关闭
    ServerShutdown = 7,
    /// 礼让封盘
    Courtesy = 8,
    /// 白方礼让封盘
    CourtesyWhite = 9,
    /// 黑方礼让封盘
    CourtesyBlack = 10,
    /// 白方断线
    WhiteLostConnection = 11,
    /// 黑方断线
    BlackLostConnection = 12,
}

impl AdjournReason {
    /// 数值代码
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// 从花括号注释文本解析（不含花括号）
    pub fn from_annotation(text: &str) -> Option<AdjournReason> {
        let reason = match text.trim() {
            "Game adjourned by mutual agreement" => AdjournReason::MutualAgreement,
            "White lost connection; game adjourned" => AdjournReason::WhiteLostConnection,
            "Black lost connection; game adjourned" => AdjournReason::BlackLostConnection,
            "Both players lost connection; game adjourned"
            | "Game adjourned by lost connection" => AdjournReason::LostConnection,
            "Game adjourned by server shutdown" => AdjournReason::ServerShutdown,
            "Game courtesyadjourned by White" => AdjournReason::CourtesyWhite,
            "Game courtesyadjourned by Black" => AdjournReason::CourtesyBlack,
            "Game adjourned by courtesy" => AdjournReason::Courtesy,
            _ => return None,
        };
        Some(reason)
    }
}
