//! 棋谱记录
//!
//! 由预览着法表重建双方剩余时间，并生成 PGN 文本（标签头 + 着法行）。

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::{Color, GameCategory, GameResult, Rating, TimeControl};

/// 一个半回合
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// SAN 记法
    pub san: String,
    /// 思考用时（毫秒），未走完的最后一步为 None
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
}

impl MoveRecord {
    /// 创建新的走法记录
    pub fn new(san: impl Into<String>) -> Self {
        Self {
            san: san.into(),
            elapsed_ms: None,
        }
    }

    /// 带用时创建
    pub fn with_elapsed(san: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            san: san.into(),
            elapsed_ms: Some(elapsed_ms),
        }
    }
}

/// 棋谱元数据（PGN 标签）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMetadata {
    /// 站点名
    pub site: String,
    pub white: String,
    pub black: String,
    pub white_rating: Rating,
    pub black_rating: Rating,
    pub rated: bool,
    pub category: GameCategory,
    pub time: TimeControl,
    /// 对局开始时间
    pub date: NaiveDateTime,
}

/// 完整的棋谱记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub metadata: GameMetadata,
    /// 第一个半回合的一方
    pub first_mover: Color,
    /// 走法列表，从 `first_mover` 开始交替
    pub moves: Vec<MoveRecord>,
    pub result: GameResult,
}

impl GameRecord {
    /// 创建新的棋谱记录
    pub fn new(metadata: GameMetadata) -> Self {
        Self {
            metadata,
            first_mover: Color::White,
            moves: Vec::new(),
            result: GameResult::InProgress,
        }
    }

    /// 添加走法
    pub fn add_move(&mut self, mv: MoveRecord) {
        self.moves.push(mv);
    }

    /// 设置先走的一方（着法表以 `...` 开头时为黑方）
    pub fn set_first_mover(&mut self, color: Color) {
        self.first_mover = color;
    }

    /// 设置对局结果
    pub fn set_result(&mut self, result: GameResult) {
        self.result = result;
    }

    /// 按着法表重建双方剩余时间 `(白, 黑)`（毫秒）
    ///
    /// 每个带用时的半回合先扣除用时再加秒；没有用时的半回合不计。
    pub fn clocks(&self) -> (u64, u64) {
        let base = self.metadata.time.base_ms();
        let increment = self.metadata.time.increment_ms();
        let mut white = base;
        let mut black = base;

        let mut side = self.first_mover;
        for mv in &self.moves {
            if let Some(elapsed) = mv.elapsed_ms {
                let clock = match side {
                    Color::White => &mut white,
                    Color::Black => &mut black,
                };
                let elapsed = i64::try_from(elapsed).unwrap_or(i64::MAX);
                *clock = clock.saturating_sub(elapsed).saturating_add(increment);
            }
            side = side.opponent();
        }

        (white.max(0) as u64, black.max(0) as u64)
    }

    /// 着法行，如 `1. Nf3 d5 2. d4 Nf6 *`；黑方先走时为 `1... e5 2. Nf3 *`
    pub fn movetext(&self) -> String {
        let mut output = String::new();
        let mut side = self.first_mover;
        let mut number = 1;
        for (i, mv) in self.moves.iter().enumerate() {
            match side {
                Color::White => output.push_str(&format!("{}. ", number)),
                Color::Black if i == 0 => output.push_str(&format!("{}... ", number)),
                Color::Black => {}
            }
            output.push_str(&mv.san);
            output.push(' ');
            if side == Color::Black {
                number += 1;
            }
            side = side.opponent();
        }
        output.push_str(self.result.as_str());
        output
    }

    /// 生成 PGN 文本，以换行结尾
    pub fn to_pgn(&self) -> String {
        let meta = &self.metadata;
        let (white_clock, black_clock) = self.clocks();
        let rated = if meta.rated { "rated" } else { "unrated" };

        let tags = [
            ("Event", format!("{} {} {} game", meta.site, rated, meta.category)),
            ("Site", meta.site.clone()),
            ("White", meta.white.clone()),
            ("Black", meta.black.clone()),
            ("TimeControl", meta.time.to_pgn()),
            ("Result", self.result.to_string()),
            ("WhiteClock", format_clock(white_clock)),
            ("BlackClock", format_clock(black_clock)),
            ("WhiteElo", meta.white_rating.to_string()),
            ("BlackElo", meta.black_rating.to_string()),
            ("Year", meta.date.format("%Y").to_string()),
            ("Month", meta.date.format("%-m").to_string()),
            ("Day", meta.date.format("%-d").to_string()),
            ("Time", meta.date.format("%H:%M:%S").to_string()),
        ];

        let mut output = String::new();
        for (name, value) in tags {
            output.push_str(&format!("[{} \"{}\"]\n", name, value));
        }
        output.push_str(&self.movetext());
        output.push('\n');
        output
    }
}

/// 毫秒格式化为 `h:mm:ss.mmm`
pub fn format_clock(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = ms / 60_000 % 60;
    let seconds = ms / 1000 % 60;
    format!("{}:{:02}:{:02}.{:03}", hours, minutes, seconds, ms % 1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn metadata(minutes: u32, increment: u32) -> GameMetadata {
        GameMetadata {
            site: "FICS".to_string(),
            white: "mgatto".to_string(),
            black: "BabyLurking".to_string(),
            white_rating: Rating::Rated(1233),
            black_rating: Rating::Rated(1455),
            rated: true,
            category: GameCategory::Blitz,
            time: TimeControl::new(minutes, increment),
            date: NaiveDate::from_ymd_opt(2010, 11, 5)
                .and_then(|d| d.and_hms_opt(4, 33, 0))
                .unwrap(),
        }
    }

    fn record(minutes: u32, increment: u32, moves: &[(&str, Option<u64>)]) -> GameRecord {
        let mut record = GameRecord::new(metadata(minutes, increment));
        for (san, elapsed) in moves {
            record.add_move(match elapsed {
                Some(ms) => MoveRecord::with_elapsed(*san, *ms),
                None => MoveRecord::new(*san),
            });
        }
        record
    }

    #[test]
    fn test_zero_elapsed_keeps_base() {
        let r = record(5, 0, &[("e4", Some(0)), ("c5", Some(0)), ("Nf3", Some(0))]);
        assert_eq!(r.clocks(), (300_000, 300_000));
    }

    #[test]
    fn test_elapsed_subtracted_per_side() {
        let r = record(
            5,
            0,
            &[
                ("Nf3", Some(0)),
                ("d5", Some(0)),
                ("d4", Some(3000)),
                ("Nf6", Some(0)),
                ("c4", Some(3000)),
                ("e6", Some(0)),
            ],
        );
        assert_eq!(r.clocks(), (294_000, 300_000));
    }

    #[test]
    fn test_increment_skips_unfinished_ply() {
        let r = record(2, 12, &[("e4", Some(5000)), ("e5", Some(1000)), ("Nf3", None)]);
        assert_eq!(r.clocks(), (127_000, 131_000));
    }

    #[test]
    fn test_clock_never_negative() {
        let r = record(1, 0, &[("e4", Some(90_000))]);
        assert_eq!(r.clocks(), (0, 60_000));
    }

    #[test]
    fn test_huge_time_control() {
        let r = record(u32::MAX, u32::MAX, &[("e4", Some(u64::MAX)), ("e5", Some(0))]);
        let (white, black) = r.clocks();
        assert_eq!(white, 0);
        assert_eq!(black, u64::from(u32::MAX) * 61_000);
        assert!(r.to_pgn().contains("[TimeControl \"257698037700+4294967295\"]"));
    }

    #[test]
    fn test_black_moves_first() {
        let mut r = record(2, 0, &[("e5", Some(1000)), ("Nf3", Some(2000)), ("Nc6", None)]);
        r.set_first_mover(Color::Black);
        assert_eq!(r.clocks(), (118_000, 119_000));
        assert_eq!(r.movetext(), "1... e5 2. Nf3 Nc6 *");
    }

    #[test]
    fn test_movetext() {
        let r = record(5, 0, &[("e4", Some(0)), ("c5", Some(0)), ("Nf3", None)]);
        assert_eq!(r.movetext(), "1. e4 c5 2. Nf3 *");
        let empty = record(5, 0, &[]);
        assert_eq!(empty.movetext(), "*");
    }

    #[test]
    fn test_pgn_block() {
        let r = record(5, 0, &[("Nf3", Some(0)), ("d5", Some(0)), ("d4", Some(6000))]);
        let expected = "[Event \"FICS rated blitz game\"]\n[Site \"FICS\"]\n[White \"mgatto\"]\n\
                        [Black \"BabyLurking\"]\n[TimeControl \"300+0\"]\n[Result \"*\"]\n\
                        [WhiteClock \"0:04:54.000\"]\n[BlackClock \"0:05:00.000\"]\n\
                        [WhiteElo \"1233\"]\n[BlackElo \"1455\"]\n[Year \"2010\"]\n[Month \"11\"]\n\
                        [Day \"5\"]\n[Time \"04:33:00\"]\n1. Nf3 d5 2. d4 *\n";
        assert_eq!(r.to_pgn(), expected);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(300_000), "0:05:00.000");
        assert_eq!(format_clock(3_723_456), "1:02:03.456");
    }
}
