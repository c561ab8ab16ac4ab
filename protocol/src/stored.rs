//! 封盘对局列表（`stored` 命令的回复）
//!
//! ```text
//!     C Opponent       On Type          Str  M    ECO Date
//!  1: W gbtami         N [ wr  2   2] 31-31 W18  --- Wed Dec 23, 06:58 PST 2009
//! ```

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{parse_number, ParseError};
use crate::types::{Color, GameCategory, TimeControl};

/// 列表表头的开头
pub const STORED_HEADER_PREFIX: &str = "C Opponent";

/// 无封盘对局时的句尾
pub const NO_STORED_SUFFIX: &str = " has no adjourned games.";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// 服务器时间戳：`Wed Dec 23, 06:58 PST 2009`
///
/// 时区只作为标签保留，不参与换算。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerTime {
    pub at: NaiveDateTime,
    pub zone: String,
}

impl ServerTime {
    /// 从 `[weekday, month, day,, hh:mm, tz, year]` 六个词解析
    pub fn parse(tokens: &[&str]) -> Result<ServerTime, ParseError> {
        let joined = || tokens.join(" ");
        let [_weekday, month, day, time, zone, year] = tokens else {
            return Err(ParseError::InvalidTimestamp(joined()));
        };

        let month = MONTHS
            .iter()
            .position(|m| m == month)
            .ok_or_else(|| ParseError::InvalidTimestamp(joined()))? as u32
            + 1;
        let day: u32 = parse_number("day", day.trim_end_matches(','))?;
        let year: i32 = parse_number("year", year)?;
        let (hour, minute) = time
            .split_once(':')
            .ok_or_else(|| ParseError::InvalidTimestamp(joined()))?;
        let hour: u32 = parse_number("hour", hour)?;
        let minute: u32 = parse_number("minute", minute)?;

        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| ParseError::InvalidTimestamp(joined()))?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0)
            .ok_or_else(|| ParseError::InvalidTimestamp(joined()))?;

        Ok(ServerTime {
            at: NaiveDateTime::new(date, time),
            zone: zone.to_string(),
        })
    }
}

/// 列表中的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredGame {
    pub index: u32,
    /// 我方颜色
    pub our_color: Color,
    pub opponent: String,
    pub opponent_online: bool,
    pub private: bool,
    pub category: GameCategory,
    pub rated: bool,
    pub time: TimeControl,
    /// 子力值 `白-黑`
    pub strength: (u32, u32),
    /// 已走半回合数
    pub ply_count: u32,
    /// 开局代码，未知时为 None
    pub eco: Option<String>,
    pub adjourned_at: ServerTime,
}

impl StoredGame {
    pub fn parse(line: &str) -> Result<StoredGame, ParseError> {
        let line = line.trim();
        let (index, rest) = line
            .split_once(':')
            .ok_or_else(|| ParseError::malformed("stored row", line))?;
        let index = parse_number("index", index.trim())?;

        let open = rest
            .find('[')
            .ok_or_else(|| ParseError::malformed("stored row", line))?;
        let close = rest
            .find(']')
            .filter(|close| *close > open)
            .ok_or_else(|| ParseError::malformed("stored row", line))?;

        let head: Vec<&str> = rest[..open].split_whitespace().collect();
        let [color, opponent, online] = head[..] else {
            return Err(ParseError::malformed("stored row", line));
        };
        let our_color = color
            .chars()
            .next()
            .and_then(Color::from_letter)
            .ok_or_else(|| ParseError::InvalidColor(color.to_string()))?;

        let (private, category, rated, time) = parse_game_bracket(&rest[open + 1..close])?;

        let tail: Vec<&str> = rest[close + 1..].split_whitespace().collect();
        if tail.len() != 9 {
            return Err(ParseError::malformed("stored row", line));
        }
        let (white_strength, black_strength) = tail[0]
            .split_once('-')
            .ok_or_else(|| ParseError::malformed("stored strength", tail[0]))?;

        Ok(StoredGame {
            index,
            our_color,
            opponent: opponent.to_string(),
            opponent_online: online == "Y",
            private,
            category,
            rated,
            time,
            strength: (
                parse_number("strength", white_strength)?,
                parse_number("strength", black_strength)?,
            ),
            ply_count: ply_count(tail[1])?,
            eco: match tail[2] {
                "---" | "???" => None,
                eco => Some(eco.to_string()),
            },
            adjourned_at: ServerTime::parse(&tail[3..])?,
        })
    }
}

/// 解析 `[psu  2  12]` 的内部：私有标记、类别代码、是否计分，以及时限
fn parse_game_bracket(
    inner: &str,
) -> Result<(bool, GameCategory, bool, TimeControl), ParseError> {
    let flags: Vec<char> = inner.chars().take(3).collect();
    let [private, code, rated] = flags[..] else {
        return Err(ParseError::malformed("stored type", inner));
    };
    let rated = match rated {
        'r' => true,
        'u' => false,
        _ => return Err(ParseError::malformed("stored type", inner)),
    };
    let numbers: Vec<&str> = inner
        .get(3..)
        .ok_or_else(|| ParseError::malformed("stored type", inner))?
        .split_whitespace()
        .collect();
    let [minutes, increment] = numbers[..] else {
        return Err(ParseError::malformed("stored type", inner));
    };
    Ok((
        private == 'p',
        GameCategory::from_code(code)?,
        rated,
        TimeControl::parse(minutes, increment)?,
    ))
}

/// 由 `W18` / `B2` 求已走半回合数
///
/// 数字是当前回合数，字母是轮到哪一方；两种颜色都按 `2n - 1` 计。
pub fn ply_count(token: &str) -> Result<u32, ParseError> {
    let mut chars = token.chars();
    chars
        .next()
        .and_then(Color::from_letter)
        .ok_or_else(|| ParseError::InvalidColor(token.to_string()))?;
    let number: u32 = parse_number("move number", chars.as_str())?;
    if number == 0 {
        return Err(ParseError::malformed("move number", token));
    }
    number
        .checked_mul(2)
        .map(|plies| plies - 1)
        .ok_or_else(|| ParseError::InvalidNumber {
            field: "move number",
            value: token.to_string(),
        })
}

/// `mgatto has no adjourned games.` 返回名字
pub fn parse_no_stored(line: &str) -> Option<&str> {
    let name = line.trim().strip_suffix(NO_STORED_SUFFIX)?;
    (!name.is_empty() && !name.contains(' ')).then_some(name)
}

/// 是否为列表表头
pub fn is_stored_header(line: &str) -> bool {
    line.trim_start().starts_with(STORED_HEADER_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_wild_row() {
        let g = StoredGame::parse(
            " 1: W gbtami         N [ wr  2   2] 31-31 W18  --- Wed Dec 23, 06:58 PST 2009",
        )
        .unwrap();
        assert_eq!(g.index, 1);
        assert_eq!(g.our_color, Color::White);
        assert_eq!(g.opponent, "gbtami");
        assert!(!g.opponent_online);
        assert!(!g.private);
        assert_eq!(g.category, GameCategory::Wild);
        assert!(g.rated);
        assert_eq!(g.time, TimeControl::new(2, 2));
        assert_eq!(g.strength, (31, 31));
        assert_eq!(g.ply_count, 35);
        assert_eq!(g.eco, None);
        assert_eq!(g.adjourned_at.at.year(), 2009);
        assert_eq!(g.adjourned_at.at.month(), 12);
        assert_eq!(g.adjourned_at.at.day(), 23);
        assert_eq!(g.adjourned_at.at.hour(), 6);
        assert_eq!(g.adjourned_at.zone, "PST");
    }

    #[test]
    fn test_parse_private_unrated_row() {
        let g = StoredGame::parse(
            " 2: W PyChess       Y [psu  2  12] 39-39 W3   C20 Sun Jan 11, 17:40 ??? 2009",
        )
        .unwrap();
        assert!(g.private);
        assert!(!g.rated);
        assert!(g.opponent_online);
        assert_eq!(g.category, GameCategory::Standard);
        assert_eq!(g.time, TimeControl::new(2, 12));
        assert_eq!(g.eco.as_deref(), Some("C20"));
        assert_eq!(g.adjourned_at.zone, "???");
    }

    #[test]
    fn test_unpadded_time() {
        let g = StoredGame::parse(
            " 1: W TheDane       N [ br  2  12]  0-0  B2   ??? Sun Nov 23,  6:14 CST 1997",
        )
        .unwrap();
        assert_eq!(g.ply_count, 3);
        assert_eq!(g.adjourned_at.at.hour(), 6);
        assert_eq!(g.adjourned_at.at.minute(), 14);
    }

    #[test]
    fn test_ply_count() {
        assert_eq!(ply_count("W18"), Ok(35));
        assert_eq!(ply_count("B2"), Ok(3));
        assert_eq!(ply_count("W1"), Ok(1));
        assert!(ply_count("X3").is_err());
        assert!(ply_count("W0").is_err());
        assert!(ply_count("W3000000000").is_err());
    }

    #[test]
    fn test_bad_rows() {
        assert!(StoredGame::parse(" 1: W foo N [ qr  2 2] 0-0 W1 --- Wed Dec 23, 06:58 PST 2009").is_err());
        assert!(StoredGame::parse(" 1: W foo N [ br  2 2] 0-0 W1 --- Wed Foo 23, 06:58 PST 2009").is_err());
        assert!(StoredGame::parse(" 1: W foo N 0-0 W1").is_err());
    }

    #[test]
    fn test_header_and_empty() {
        assert!(is_stored_header("    C Opponent       On Type          Str  M    ECO Date"));
        assert!(is_stored_header("C Opponent       On Type"));
        assert_eq!(parse_no_stored("tester has no adjourned games."), Some("tester"));
        assert_eq!(parse_no_stored("has no adjourned games."), None);
    }
}
