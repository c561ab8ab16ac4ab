//! style 12 棋盘状态行
//!
//! `<12> rnbqkbnr pppppppp -------- -------- -------- -------- PPPPPPPP RNBQKBNR W -1 1 1 1 1 0 55 mgatto Thegermain 1 4 0 39 39 240000 240000 1 none (0:00.000) none 0 0 0`

use serde::{Deserialize, Serialize};

use crate::error::{parse_number, ParseError};
use crate::types::{Color, TimeControl};

/// 行首标签
pub const STYLE12_TAG: &str = "<12>";

/// 至少需要的字段数（不含标签）
const MIN_FIELDS: usize = 31;

/// 解析后的 style 12 行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style12 {
    /// 第 8 行到第 1 行，`-` 表示空格
    pub ranks: Vec<String>,
    pub side_to_move: Color,
    /// 上一步双步兵所在列（0-7），没有时为 None
    pub double_pawn_file: Option<u8>,
    pub white_castle_short: bool,
    pub white_castle_long: bool,
    pub black_castle_short: bool,
    pub black_castle_long: bool,
    /// 自上次吃子或兵走以来的半回合数
    pub halfmove_clock: u32,
    pub game_number: u32,
    pub white: String,
    pub black: String,
    /// 与本局的关系（执棋方 / 观战 / 复盘等）
    pub relation: i32,
    pub time: TimeControl,
    pub white_material: u32,
    pub black_material: u32,
    /// 白方剩余时间（毫秒，负数视为 0）
    pub white_clock_ms: u64,
    /// 黑方剩余时间（毫秒，负数视为 0）
    pub black_clock_ms: u64,
    /// 下一步的回合数
    pub move_number: u32,
    /// 上一步（长格式），开局为 `none`
    pub verbose_move: String,
    /// 上一步用时
    pub move_time: String,
    /// 上一步（SAN），开局为 `none`
    pub pretty_move: String,
}

impl Style12 {
    /// 解析 `<12> ...` 行
    pub fn parse(line: &str) -> Result<Style12, ParseError> {
        let rest = line
            .trim()
            .strip_prefix(STYLE12_TAG)
            .ok_or_else(|| ParseError::malformed("style12", line))?;
        let f: Vec<&str> = rest.split_whitespace().collect();
        if f.len() < MIN_FIELDS {
            return Err(ParseError::malformed("style12", line));
        }

        let ranks: Vec<String> = f[0..8].iter().map(|r| r.to_string()).collect();
        if ranks.iter().any(|r| r.chars().count() != 8) {
            return Err(ParseError::malformed("style12 rank", line));
        }

        let side_to_move = f[8]
            .chars()
            .next()
            .and_then(Color::from_letter)
            .ok_or_else(|| ParseError::InvalidColor(f[8].to_string()))?;
        let double_pawn: i8 = parse_number("double pawn push", f[9])?;

        Ok(Style12 {
            ranks,
            side_to_move,
            double_pawn_file: u8::try_from(double_pawn).ok().filter(|file| *file < 8),
            white_castle_short: f[10] == "1",
            white_castle_long: f[11] == "1",
            black_castle_short: f[12] == "1",
            black_castle_long: f[13] == "1",
            halfmove_clock: parse_number("halfmove clock", f[14])?,
            game_number: parse_number("game number", f[15])?,
            white: f[16].to_string(),
            black: f[17].to_string(),
            relation: parse_number("relation", f[18])?,
            time: TimeControl::parse(f[19], f[20])?,
            white_material: parse_number("white material", f[21])?,
            black_material: parse_number("black material", f[22])?,
            white_clock_ms: clock_ms("white clock", f[23])?,
            black_clock_ms: clock_ms("black clock", f[24])?,
            move_number: parse_number("move number", f[25])?,
            verbose_move: f[26].to_string(),
            move_time: f[27].to_string(),
            pretty_move: f[28].to_string(),
        })
    }

    /// 是否为初始局面（尚未走棋）
    pub fn is_initial_position(&self) -> bool {
        self.move_number == 1 && self.verbose_move == "none"
    }

    /// 上一步的 SAN，开局时为 None
    pub fn last_move(&self) -> Option<&str> {
        (self.pretty_move != "none").then_some(self.pretty_move.as_str())
    }

    /// 生成 FEN
    pub fn to_fen(&self) -> String {
        let placement = self
            .ranks
            .iter()
            .map(|rank| compress_rank(rank))
            .collect::<Vec<_>>()
            .join("/");

        let mut castling = String::new();
        if self.white_castle_short {
            castling.push('K');
        }
        if self.white_castle_long {
            castling.push('Q');
        }
        if self.black_castle_short {
            castling.push('k');
        }
        if self.black_castle_long {
            castling.push('q');
        }
        if castling.is_empty() {
            castling.push('-');
        }

        // 过路兵目标格：轮到白方时黑兵刚走两步（第 6 行），反之第 3 行
        let en_passant = match self.double_pawn_file {
            Some(file) => {
                let rank = if self.side_to_move == Color::White { '6' } else { '3' };
                format!("{}{}", (b'a' + file) as char, rank)
            }
            None => "-".to_string(),
        };

        let side = match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        };

        format!(
            "{} {} {} {} {} {}",
            placement, side, castling, en_passant, self.halfmove_clock, self.move_number
        )
    }
}

fn clock_ms(field: &'static str, value: &str) -> Result<u64, ParseError> {
    let ms: i64 = parse_number(field, value)?;
    Ok(ms.max(0) as u64)
}

/// 把 `--p-----` 压缩成 `2p5`
fn compress_rank(rank: &str) -> String {
    let mut out = String::new();
    let mut empty = 0;
    for c in rank.chars() {
        if c == '-' {
            empty += 1;
        } else {
            if empty > 0 {
                out.push_str(&empty.to_string());
                empty = 0;
            }
            out.push(c);
        }
    }
    if empty > 0 {
        out.push_str(&empty.to_string());
    }
    out
}
