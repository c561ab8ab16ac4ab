//! 对局预览（`smoves` 的回复）各行
//!
//! ```text
//! BwanaSlei (1137) vs. mgatto (1336) --- Wed Nov  5, 20:56 PST 2008
//! Rated blitz match, initial time: 5 minutes, increment: 0 seconds.
//!
//! Move  BwanaSlei               mgatto
//! ----  ---------------------   ---------------------
//!   1.  e4      (0:00.000)     c5      (0:00.000)
//!   2.  Nf3     (0:00.000)
//!       {White lost connection; game adjourned} *
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{parse_number, ParseError};
use crate::record::MoveRecord;
use crate::stored::ServerTime;
use crate::types::{AdjournReason, Color, GameCategory, GameResult, Rating, TimeControl};

/// 预览头
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewHeader {
    pub white: String,
    pub white_rating: Rating,
    pub black: String,
    pub black_rating: Rating,
    pub started: ServerTime,
}

impl PreviewHeader {
    pub fn parse(line: &str) -> Result<PreviewHeader, ParseError> {
        let (players, date) = line
            .split_once(" --- ")
            .ok_or_else(|| ParseError::malformed("preview header", line))?;
        let (white, black) = players
            .split_once(" vs. ")
            .ok_or_else(|| ParseError::malformed("preview header", line))?;
        let (white, white_rating) = name_and_rating(white, line)?;
        let (black, black_rating) = name_and_rating(black, line)?;
        let date: Vec<&str> = date.split_whitespace().collect();
        Ok(PreviewHeader {
            white,
            white_rating,
            black,
            black_rating,
            started: ServerTime::parse(&date)?,
        })
    }
}

fn name_and_rating(text: &str, line: &str) -> Result<(String, Rating), ParseError> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [name, rating] = tokens[..] else {
        return Err(ParseError::malformed("preview header", line));
    };
    Ok((name.to_string(), Rating::parse(rating)?))
}

/// `Rated blitz match, initial time: 5 minutes, increment: 0 seconds.`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchInfo {
    pub rated: bool,
    pub category: GameCategory,
    pub time: TimeControl,
}

impl MatchInfo {
    pub fn parse(line: &str) -> Result<MatchInfo, ParseError> {
        let line = line.trim().trim_end_matches('.');
        let (head, tail) = match line.split_once(',') {
            Some((head, tail)) => (head, tail),
            None => (line, ""),
        };
        let words: Vec<&str> = head.split_whitespace().collect();
        let [rated, category, "match"] = words[..] else {
            return Err(ParseError::malformed("match info", line));
        };
        let rated = match rated {
            "Rated" => true,
            "Unrated" => false,
            _ => return Err(ParseError::malformed("match info", line)),
        };

        // 未计时对局没有时间部分
        let mut time = TimeControl::default();
        if !tail.is_empty() {
            let numbers: Vec<&str> = tail
                .split_whitespace()
                .filter(|w| w.chars().all(|c| c.is_ascii_digit()))
                .collect();
            let [minutes, increment] = numbers[..] else {
                return Err(ParseError::malformed("match info time", line));
            };
            time = TimeControl::parse(minutes, increment)?;
        }

        Ok(MatchInfo {
            rated,
            category: GameCategory::from_fics_name(category)?,
            time,
        })
    }
}

/// 着法表表头 `Move  <white>  <black>`
pub fn parse_move_table_header(line: &str) -> Result<(String, String), ParseError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let ["Move", white, black] = tokens[..] else {
        return Err(ParseError::malformed("move table header", line));
    };
    Ok((white.to_string(), black.to_string()))
}

/// 着法表分隔线（全部由 `-` 和空白组成）
pub fn is_move_table_rule(line: &str) -> bool {
    let line = line.trim();
    line.starts_with("----") && line.chars().all(|c| c == '-' || c.is_whitespace())
}

/// 着法表的一行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRow {
    pub number: u32,
    /// 本行第一个半回合的一方，白方栏位为 `...` 时是黑方
    pub first: Color,
    /// 按顺序的半回合
    pub plies: Vec<MoveRecord>,
}

impl MoveRow {
    pub fn parse(line: &str) -> Result<MoveRow, ParseError> {
        let mut tokens = line.split_whitespace();
        let number = tokens
            .next()
            .and_then(|t| t.strip_suffix('.'))
            .ok_or_else(|| ParseError::malformed("move row", line))?;
        let number = parse_number("move number", number)?;

        let mut first = Color::White;
        let mut plies: Vec<MoveRecord> = Vec::new();
        for token in tokens {
            if let Some(inner) = token.strip_prefix('(') {
                let inner = inner.trim_end_matches(')');
                let last = plies
                    .last_mut()
                    .filter(|ply| ply.elapsed_ms.is_none())
                    .ok_or_else(|| ParseError::malformed("move row", line))?;
                last.elapsed_ms = Some(parse_elapsed(inner)?);
            } else if token == "..." {
                // 只能占据白方栏位
                if !plies.is_empty() || first == Color::Black {
                    return Err(ParseError::malformed("move row", line));
                }
                first = Color::Black;
            } else {
                plies.push(MoveRecord::new(token));
            }
        }
        let capacity = if first == Color::Black { 1 } else { 2 };
        if plies.is_empty() || plies.len() > capacity {
            return Err(ParseError::malformed("move row", line));
        }
        Ok(MoveRow {
            number,
            first,
            plies,
        })
    }
}

/// 思考时间 `m:ss`、`m:ss.fff`、`h:mm:ss[.fff]` 转毫秒
pub fn parse_elapsed(text: &str) -> Result<u64, ParseError> {
    let (whole, fraction) = match text.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (text, ""),
    };

    let parts = whole
        .split(':')
        .map(|p| parse_number::<u64>("elapsed", p))
        .collect::<Result<Vec<_>, _>>()?;
    let too_large = || ParseError::InvalidNumber {
        field: "elapsed",
        value: text.to_string(),
    };
    let seconds = match parts[..] {
        [m, s] => m.checked_mul(60).and_then(|v| v.checked_add(s)),
        [h, m, s] => h
            .checked_mul(60)
            .and_then(|v| v.checked_add(m))
            .and_then(|v| v.checked_mul(60))
            .and_then(|v| v.checked_add(s)),
        _ => return Err(ParseError::malformed("elapsed", text)),
    }
    .ok_or_else(too_large)?;

    // 小数部分补齐或截断到毫秒
    let millis = if fraction.is_empty() {
        0
    } else {
        if !fraction.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseError::malformed("elapsed", text));
        }
        let padded: String = fraction.chars().chain("000".chars()).take(3).collect();
        parse_number::<u64>("elapsed", &padded)?
    };

    seconds
        .checked_mul(1000)
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(too_large)
}

/// 着法表末尾 `{<reason>} <result>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonLine {
    pub annotation: String,
    pub reason: Option<AdjournReason>,
    pub result: GameResult,
}

impl ReasonLine {
    pub fn parse(line: &str) -> Result<ReasonLine, ParseError> {
        let line = line.trim();
        let rest = line
            .strip_prefix('{')
            .ok_or_else(|| ParseError::malformed("reason", line))?;
        let (annotation, result) = rest
            .split_once('}')
            .ok_or_else(|| ParseError::malformed("reason", line))?;
        let result = GameResult::from_token(result.trim())
            .ok_or_else(|| ParseError::malformed("reason result", line))?;
        Ok(ReasonLine {
            annotation: annotation.to_string(),
            reason: AdjournReason::from_annotation(annotation),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_preview_header() {
        let h = PreviewHeader::parse("BwanaSlei (1137) vs. mgatto (1336) --- Wed Nov  5, 20:56 PST 2008")
            .unwrap();
        assert_eq!(h.white, "BwanaSlei");
        assert_eq!(h.white_rating, Rating::Rated(1137));
        assert_eq!(h.black, "mgatto");
        assert_eq!(h.black_rating, Rating::Rated(1336));
        assert_eq!(h.started.at.day(), 5);
        assert_eq!(h.started.at.hour(), 20);
    }

    #[test]
    fn test_match_info() {
        let info = MatchInfo::parse("Rated blitz match, initial time: 5 minutes, increment: 0 seconds.")
            .unwrap();
        assert!(info.rated);
        assert_eq!(info.category, GameCategory::Blitz);
        assert_eq!(info.time, TimeControl::new(5, 0));

        let info = MatchInfo::parse("Unrated untimed match.").unwrap();
        assert!(!info.rated);
        assert_eq!(info.time, TimeControl::new(0, 0));

        assert!(MatchInfo::parse("Rated blitz game, initial time: 5 minutes").is_err());
    }

    #[test]
    fn test_table_header_and_rule() {
        assert_eq!(
            parse_move_table_header("Move  BwanaSlei               mgatto").unwrap(),
            ("BwanaSlei".to_string(), "mgatto".to_string())
        );
        assert!(is_move_table_rule("----  ---------------------   ---------------------"));
        assert!(!is_move_table_rule("---- foo"));
    }

    #[test]
    fn test_move_rows() {
        let row = MoveRow::parse("  1.  e4      (0:00.000)     c5      (0:00.000)").unwrap();
        assert_eq!(row.number, 1);
        assert_eq!(row.plies.len(), 2);
        assert_eq!(row.plies[1].san, "c5");
        assert_eq!(row.plies[1].elapsed_ms, Some(0));

        let row = MoveRow::parse("  2.  Nf3     (0:00.000) ").unwrap();
        assert_eq!(row.plies.len(), 1);

        let row = MoveRow::parse("2.  d4      (0:03)     Nf6     (0:00)").unwrap();
        assert_eq!(row.plies[0].elapsed_ms, Some(3000));

        let row = MoveRow::parse(" 14.  Qd2").unwrap();
        assert_eq!(row.plies[0].elapsed_ms, None);

        assert!(MoveRow::parse("  3.  (0:01)").is_err());
    }

    #[test]
    fn test_black_first_row() {
        let row = MoveRow::parse("  1.  ...               e5      (0:01)").unwrap();
        assert_eq!(row.first, Color::Black);
        assert_eq!(row.plies.len(), 1);
        assert_eq!(row.plies[0].san, "e5");
        assert_eq!(row.plies[0].elapsed_ms, Some(1000));

        let row = MoveRow::parse("  2.  Nf3     (0:02)     Nc6     (0:01)").unwrap();
        assert_eq!(row.first, Color::White);

        assert!(MoveRow::parse("  1.  ...  e5  (0:01)  Nf3  (0:01)").is_err());
        assert!(MoveRow::parse("  1.  e4  (0:01)  ...").is_err());
    }

    #[test]
    fn test_elapsed_forms() {
        assert_eq!(parse_elapsed("0:03"), Ok(3000));
        assert_eq!(parse_elapsed("1:02.5"), Ok(62_500));
        assert_eq!(parse_elapsed("0:00.1234"), Ok(123));
        assert_eq!(parse_elapsed("1:00:01.000"), Ok(3_601_000));
        assert!(parse_elapsed("3").is_err());
        assert!(parse_elapsed("0:0x").is_err());
        assert!(parse_elapsed("99999999999999999:00").is_err());
        assert!(parse_elapsed("18446744073709551:00:00").is_err());
    }

    #[test]
    fn test_reason_line() {
        let r = ReasonLine::parse("      {White lost connection; game adjourned} *").unwrap();
        assert_eq!(r.reason, Some(AdjournReason::WhiteLostConnection));
        assert_eq!(r.result, GameResult::InProgress);

        let r = ReasonLine::parse("{Game adjourned by gremlins} *").unwrap();
        assert_eq!(r.reason, None);
    }
}
