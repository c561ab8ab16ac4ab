//! 对局公告行
//!
//! - `Creating: mgatto (1327) Thegermain (1645) unrated blitz 4 0`
//! - `{Game 55 (mgatto vs. Thegermain) Creating unrated blitz match.}`
//! - `{Game 55 (mgatto vs. Thegermain) Thegermain resigns} 1-0`

use serde::{Deserialize, Serialize};

use crate::error::{parse_number, ParseError};
use crate::types::{GameCategory, GameResult, Rating, TimeControl};

/// 对局创建确认行
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCreation {
    pub white: String,
    pub white_rating: Rating,
    pub black: String,
    pub black_rating: Rating,
    pub rated: bool,
    pub category: GameCategory,
    pub time: TimeControl,
}

impl GameCreation {
    pub fn parse(line: &str) -> Result<GameCreation, ParseError> {
        let rest = line
            .trim()
            .strip_prefix("Creating:")
            .ok_or_else(|| ParseError::malformed("creating", line))?;
        let f: Vec<&str> = rest.split_whitespace().collect();
        if f.len() < 8 {
            return Err(ParseError::malformed("creating", line));
        }
        let rated = match f[4] {
            "rated" => true,
            "unrated" => false,
            other => return Err(ParseError::malformed("creating rated flag", other)),
        };
        Ok(GameCreation {
            white: f[0].to_string(),
            white_rating: Rating::parse(f[1])?,
            black: f[2].to_string(),
            black_rating: Rating::parse(f[3])?,
            rated,
            category: GameCategory::from_fics_name(f[5])?,
            time: TimeControl::parse(f[6], f[7])?,
        })
    }
}

/// `{Game N (white vs. black) text} result` 公告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameNotice {
    pub game_number: u32,
    pub white: String,
    pub black: String,
    pub text: String,
    /// 创建公告没有结果
    pub result: Option<GameResult>,
}

impl GameNotice {
    pub fn parse(line: &str) -> Result<GameNotice, ParseError> {
        let line = line.trim();
        let rest = line
            .strip_prefix("{Game ")
            .ok_or_else(|| ParseError::malformed("game notice", line))?;
        let (number, rest) = rest
            .split_once(' ')
            .ok_or_else(|| ParseError::malformed("game notice", line))?;
        let game_number = parse_number("game number", number)?;

        let rest = rest
            .strip_prefix('(')
            .ok_or_else(|| ParseError::malformed("game notice", line))?;
        let (players, rest) = rest
            .split_once(')')
            .ok_or_else(|| ParseError::malformed("game notice", line))?;
        let (white, black) = players
            .split_once(" vs. ")
            .ok_or_else(|| ParseError::malformed("game notice players", line))?;

        let (text, tail) = rest
            .rsplit_once('}')
            .ok_or_else(|| ParseError::malformed("game notice", line))?;
        let tail = tail.trim();
        let result = if tail.is_empty() {
            None
        } else {
            Some(
                GameResult::from_token(tail)
                    .ok_or_else(|| ParseError::malformed("game result", tail))?,
            )
        };

        Ok(GameNotice {
            game_number,
            white: white.trim().to_string(),
            black: black.trim().to_string(),
            text: text.trim().to_string(),
            result,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_creation() {
        let c = GameCreation::parse("Creating: mgatto (1327) Thegermain (1645) unrated blitz 4 0")
            .unwrap();
        assert_eq!(c.white, "mgatto");
        assert_eq!(c.white_rating, Rating::Rated(1327));
        assert_eq!(c.black, "Thegermain");
        assert_eq!(c.black_rating, Rating::Rated(1645));
        assert!(!c.rated);
        assert_eq!(c.category, GameCategory::Blitz);
        assert_eq!(c.time, TimeControl::new(4, 0));
    }

    #[test]
    fn test_parse_creation_guest() {
        let c = GameCreation::parse("Creating: mgatto (1305) GuestRLJC (++++) unrated blitz 5 0")
            .unwrap();
        assert_eq!(c.black_rating, Rating::Unrated);
        assert!(GameCreation::parse("Creating: a (1) b (2) maybe blitz 5 0").is_err());
    }

    #[test]
    fn test_creation_notice_has_no_result() {
        let n = GameNotice::parse("{Game 55 (mgatto vs. Thegermain) Creating unrated blitz match.}")
            .unwrap();
        assert_eq!(n.game_number, 55);
        assert_eq!(n.white, "mgatto");
        assert_eq!(n.black, "Thegermain");
        assert_eq!(n.result, None);
    }

    #[test]
    fn test_end_notice() {
        let n = GameNotice::parse("{Game 442 (mgatto vs. GuestRLJC) GuestRLJC resigns} 1-0").unwrap();
        assert_eq!(n.game_number, 442);
        assert_eq!(n.text, "GuestRLJC resigns");
        assert_eq!(n.result, Some(GameResult::WhiteWins));

        let n = GameNotice::parse("{Game 7 (a vs. b) Game drawn by repetition} 1/2-1/2").unwrap();
        assert_eq!(n.result, Some(GameResult::Draw));
    }

    #[test]
    fn test_bad_notice() {
        assert!(GameNotice::parse("{Game x (a vs. b) foo} 1-0").is_err());
        assert!(GameNotice::parse("{Game 7 (a vs. b) foo} 2-0").is_err());
    }
}
