//! 挑战 / 提议行解析
//!
//! `<pf> <id> w=<name> t=<type> p=<params>`：收到的提议
//! `<pt> <id> w=<name> t=<type> p=<params>`：自己发出的提议
//! `<pr> <id>`：提议被移除

use serde::{Deserialize, Serialize};

use crate::error::{parse_number, ParseError};
use crate::types::{Color, GameCategory, Rating, TimeControl};

/// 提议编号
pub type OfferId = u32;

/// 提议类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferKind {
    /// 对局挑战
    Match,
    Draw,
    Abort,
    Adjourn,
    Takeback,
    Pause,
    Unpause,
    Switch,
    Partner,
    Other(String),
}

impl OfferKind {
    pub fn from_name(name: &str) -> OfferKind {
        match name {
            "match" => OfferKind::Match,
            "draw" => OfferKind::Draw,
            "abort" => OfferKind::Abort,
            "adjourn" => OfferKind::Adjourn,
            "takeback" => OfferKind::Takeback,
            "pause" => OfferKind::Pause,
            "unpause" => OfferKind::Unpause,
            "switch" => OfferKind::Switch,
            "partner" => OfferKind::Partner,
            other => OfferKind::Other(other.to_string()),
        }
    }
}

/// 一条待处理的提议
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: OfferId,
    /// 对方名字（`w=` 字段）
    pub from: String,
    pub kind: OfferKind,
    /// `p=` 之后的原始参数
    pub params: String,
}

/// 提议相关的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferLine {
    /// 收到的提议
    Incoming(Offer),
    /// 自己发出的提议
    Outgoing(Offer),
    /// 提议已移除
    Removed(OfferId),
}

impl OfferLine {
    pub fn parse(line: &str) -> Result<OfferLine, ParseError> {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("<pr>") {
            let id = rest.split_whitespace().next().ok_or(ParseError::MissingField("id"))?;
            return Ok(OfferLine::Removed(parse_number("id", id)?));
        }
        if let Some(rest) = line.strip_prefix("<pf>") {
            return Ok(OfferLine::Incoming(parse_offer(rest)?));
        }
        if let Some(rest) = line.strip_prefix("<pt>") {
            return Ok(OfferLine::Outgoing(parse_offer(rest)?));
        }
        Err(ParseError::malformed("offer", line))
    }
}

fn parse_offer(rest: &str) -> Result<Offer, ParseError> {
    let (head, params) = match rest.find(" p=") {
        Some(pos) => (&rest[..pos], &rest[pos + 3..]),
        None => (rest, ""),
    };
    let mut tokens = head.split_whitespace();
    let id = parse_number("id", tokens.next().ok_or(ParseError::MissingField("id"))?)?;

    let mut from = None;
    let mut kind = None;
    for token in tokens {
        match token.split_once('=') {
            Some(("w", name)) => from = Some(name.to_string()),
            Some(("t", name)) => kind = Some(OfferKind::from_name(name)),
            _ => {}
        }
    }

    Ok(Offer {
        id,
        from: from.ok_or(ParseError::MissingField("w"))?,
        kind: kind.ok_or(ParseError::MissingField("t"))?,
        params: params.trim().to_string(),
    })
}

/// 对局挑战的详细字段
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub category: GameCategory,
    /// 挑战者
    pub challenger: String,
    /// 被挑战者
    pub opponent: String,
    /// 挑战者等级分文本，游客为 `0`
    pub rating: String,
    pub rated: bool,
    /// 非计时对局为 0/0
    pub time: TimeControl,
    /// 被保留的颜色（`[white]` / `[black]`）
    pub color: Option<Color>,
    /// 是否为续下封盘对局
    pub adjourned: bool,
}

impl Challenge {
    /// 从 match 参数解析，如
    /// `antiseptic (1945) mgatto (1729) rated wild 6 1 Loaded from wild/4 (adjourned)`
    pub fn parse(params: &str) -> Result<Challenge, ParseError> {
        let tokens: Vec<&str> = params.split_whitespace().collect();
        let mut pos = 0;

        let challenger = take(&tokens, &mut pos, "challenger")?.to_string();
        let rating = Rating::parse(take(&tokens, &mut pos, "rating")?)?;

        // 颜色保留标记出现在挑战者等级分之后，偶尔也出现在对手等级分之后
        let mut color = None;
        let mut opponent = take(&tokens, &mut pos, "opponent")?;
        if let Some(c) = parse_color_bracket(opponent)? {
            color = Some(c);
            opponent = take(&tokens, &mut pos, "opponent")?;
        }
        Rating::parse(take(&tokens, &mut pos, "opponent rating")?)?;

        let mut token = take(&tokens, &mut pos, "rated")?;
        if let Some(c) = parse_color_bracket(token)? {
            color = Some(c);
            token = take(&tokens, &mut pos, "rated")?;
        }
        let rated = match token {
            "rated" => true,
            "unrated" => false,
            other => return Err(ParseError::malformed("match rated flag", other)),
        };
        let mut category = GameCategory::from_fics_name(take(&tokens, &mut pos, "category")?)?;

        let rest = &tokens[pos..];
        let mut rest_pos = 0;
        let mut time = TimeControl::default();
        if rest.len() >= 2 && is_number(rest[0]) && is_number(rest[1]) {
            time = TimeControl::parse(rest[0], rest[1])?;
            rest_pos = 2;
        }

        let mut adjourned = false;
        let mut iter = rest[rest_pos..].iter().copied();
        while let Some(token) = iter.next() {
            match token {
                "(adjourned)" => adjourned = true,
                "Loaded" => {
                    if iter.next() != Some("from") {
                        return Err(ParseError::malformed("match loaded clause", params));
                    }
                    let name = iter.next().ok_or(ParseError::MissingField("loaded category"))?;
                    category = GameCategory::from_fics_name(name)?;
                }
                _ => {}
            }
        }

        Ok(Challenge {
            category,
            challenger,
            opponent: opponent.to_string(),
            rating: rating.to_string(),
            rated,
            time,
            color,
            adjourned,
        })
    }
}

fn take<'a>(tokens: &[&'a str], pos: &mut usize, field: &'static str) -> Result<&'a str, ParseError> {
    let token = tokens.get(*pos).copied().ok_or(ParseError::MissingField(field))?;
    *pos += 1;
    Ok(token)
}

fn is_number(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// 解析 `[white]` / `[black]`，不是方括号时返回 `None`
fn parse_color_bracket(token: &str) -> Result<Option<Color>, ParseError> {
    let Some(inner) = token.strip_prefix('[').and_then(|t| t.strip_suffix(']')) else {
        return Ok(None);
    };
    match inner {
        "white" => Ok(Some(Color::White)),
        "black" => Ok(Some(Color::Black)),
        other => Err(ParseError::InvalidColor(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn challenge(line: &str) -> (OfferId, Challenge) {
        match OfferLine::parse(line).unwrap() {
            OfferLine::Incoming(offer) => {
                assert_eq!(offer.kind, OfferKind::Match);
                (offer.id, Challenge::parse(&offer.params).unwrap())
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_loaded_adjourned_challenge() {
        let (id, c) = challenge(
            "<pf> 59 w=antiseptic t=match p=antiseptic (1945) mgatto (1729) rated wild 6 1 Loaded from wild/4 (adjourned)",
        );
        assert_eq!(id, 59);
        assert_eq!(c.category, GameCategory::Wild4);
        assert_eq!(c.challenger, "antiseptic");
        assert_eq!(c.rating, "1945");
        assert!(c.rated);
        assert_eq!(c.time, TimeControl::new(6, 1));
        assert_eq!(c.color, None);
        assert!(c.adjourned);
    }

    #[test]
    fn test_guest_challenge() {
        let (_, c) = challenge(
            "<pf> 45 w=GuestGYXR t=match p=GuestGYXR (----) Lobais (----) unrated losers 2 12",
        );
        assert_eq!(c.category, GameCategory::Losers);
        assert_eq!(c.rating, "0");
        assert!(!c.rated);
        assert!(!c.adjourned);
    }

    #[test]
    fn test_bare_adjourned_suffix() {
        let (_, c) = challenge(
            "<pf> 39 w=GuestDVXV t=match p=GuestDVXV (----) GuestNXMP (----) unrated blitz 2 12 (adjourned)",
        );
        assert_eq!(c.category, GameCategory::Blitz);
        assert!(c.adjourned);
    }

    #[test]
    fn test_color_restriction() {
        let (_, c) = challenge(
            "<pf> 20 w=GuestFQPB t=match p=GuestFQPB (----) [white] mgatto (1322) unrated blitz 2 12",
        );
        assert_eq!(c.color, Some(Color::White));
        assert_eq!(c.time, TimeControl::new(2, 12));
    }

    #[test]
    fn test_untimed_challenge() {
        let (id, c) = challenge(
            "<pf> 7 w=GuestFQPB t=match p=GuestFQPB (----) [black] mgatto (----) unrated untimed",
        );
        assert_eq!(id, 7);
        assert_eq!(c.category, GameCategory::Untimed);
        assert_eq!(c.time, TimeControl::new(0, 0));
        assert_eq!(c.color, Some(Color::Black));
    }

    #[test]
    fn test_other_offer_lines() {
        assert_eq!(
            OfferLine::parse("<pf> 3 w=foo t=draw p=#").unwrap(),
            OfferLine::Incoming(Offer {
                id: 3,
                from: "foo".to_string(),
                kind: OfferKind::Draw,
                params: "#".to_string(),
            })
        );
        assert!(matches!(
            OfferLine::parse("<pt> 4 w=bar t=takeback p=2").unwrap(),
            OfferLine::Outgoing(Offer { kind: OfferKind::Takeback, .. })
        ));
        assert_eq!(OfferLine::parse("<pr> 59").unwrap(), OfferLine::Removed(59));
    }

    #[test]
    fn test_malformed_challenge() {
        assert!(Challenge::parse("foo (1200) bar (1300) maybe blitz 2 12").is_err());
        assert!(Challenge::parse("foo (1200) bar (1300) rated chess960 2 12").is_err());
        assert!(OfferLine::parse("<pf> x w=foo t=draw").is_err());
    }
}
