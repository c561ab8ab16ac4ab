//! seek 广告行解析
//!
//! 格式：
//! `<s> <id> w=<name> ti=<hex> rt=<rating>[E|P] t=<min> i=<inc> r=<r|u> tp=<category> c=<?|W|B> rr=<min>-<max> a=<t|f> f=<t|f>`
//!
//! `<sn>` 使用相同字段。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{parse_number, ParseError};
use crate::types::{Color, GameCategory, Rating, TimeControl};

/// seek 编号
pub type SeekId = u32;

/// 称号位：电脑账号
const TITLE_COMPUTER: u32 = 0x02;

/// 一条 seek 广告
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seek {
    pub id: SeekId,
    /// 发布者
    pub seeker: String,
    pub category: GameCategory,
    pub rating_min: u32,
    pub rating_max: u32,
    /// 是否电脑账号
    pub computer: bool,
    /// 称号注释，电脑账号为 `(C)`，否则为空
    pub title: String,
    /// 发布者等级分（已去掉后缀字母）
    pub rating: String,
    /// 是否需要手动接受
    pub manual: bool,
    /// 限定颜色
    pub color: Option<Color>,
    pub rated: bool,
    pub time: TimeControl,
    /// 是否检查 formula
    pub formula: bool,
}

impl Seek {
    /// 解析 `<s>` / `<sn>` 行（含标签）
    pub fn parse(line: &str) -> Result<Seek, ParseError> {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("<s>") | Some("<sn>") => {}
            _ => return Err(ParseError::malformed("seek", line)),
        }
        let id = parse_number("id", tokens.next().ok_or(ParseError::MissingField("id"))?)?;

        let fields: HashMap<&str, &str> = tokens.filter_map(|t| t.split_once('=')).collect();
        let field = |key: &'static str| fields.get(key).copied().ok_or(ParseError::MissingField(key));

        let ti = field("ti")?;
        let title_bits = u32::from_str_radix(ti, 16).map_err(|_| ParseError::InvalidNumber {
            field: "ti",
            value: ti.to_string(),
        })?;
        let computer = title_bits & TITLE_COMPUTER != 0;

        let (rating_min, rating_max) = field("rr")?
            .split_once('-')
            .ok_or_else(|| ParseError::malformed("seek rating range", line))?;

        Ok(Seek {
            id,
            seeker: field("w")?.to_string(),
            category: GameCategory::from_fics_name(field("tp")?)?,
            rating_min: parse_number("rr", rating_min)?,
            rating_max: parse_number("rr", rating_max)?,
            computer,
            title: if computer { "(C)".to_string() } else { String::new() },
            rating: Rating::parse(field("rt")?)?.to_string(),
            manual: !parse_flag("a", field("a")?)?,
            color: match field("c")? {
                "?" => None,
                c => Some(
                    c.chars()
                        .next()
                        .and_then(Color::from_letter)
                        .ok_or_else(|| ParseError::InvalidColor(c.to_string()))?,
                ),
            },
            rated: field("r")? == "r",
            time: TimeControl::parse(field("t")?, field("i")?)?,
            formula: parse_flag("f", field("f")?)?,
        })
    }
}

/// 解析 `<sr> id [id ...]` 中的编号列表
pub fn parse_seek_removal(line: &str) -> Result<Vec<SeekId>, ParseError> {
    let rest = line
        .strip_prefix("<sr>")
        .ok_or_else(|| ParseError::malformed("seek removal", line))?;
    let ids = rest
        .split_whitespace()
        .map(|id| parse_number("id", id))
        .collect::<Result<Vec<SeekId>, _>>()?;
    if ids.is_empty() {
        return Err(ParseError::MissingField("id"));
    }
    Ok(ids)
}

/// seek 更新行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeekUpdate {
    pub id: SeekId,
    /// 人类可读的变更描述，如 `to automatic`、`rating range now 0-9999`
    pub change: String,
}

impl SeekUpdate {
    /// 解析 `Updating seek ad <id> to automatic.` 或
    /// `Updating seek ad <id>; rating range now <min>-<max>.`
    pub fn parse(line: &str) -> Result<SeekUpdate, ParseError> {
        let rest = line
            .trim()
            .strip_prefix("Updating seek ad ")
            .ok_or_else(|| ParseError::malformed("seek update", line))?;
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ParseError::malformed("seek update", line))?;
        let id = parse_number("id", &rest[..end])?;
        let change = rest[end..]
            .trim_start_matches(';')
            .trim()
            .trim_end_matches('.')
            .to_string();
        if change.is_empty() {
            return Err(ParseError::malformed("seek update", line));
        }
        Ok(SeekUpdate { id, change })
    }
}

fn parse_flag(field: &'static str, value: &str) -> Result<bool, ParseError> {
    match value {
        "t" => Ok(true),
        "f" => Ok(false),
        other => Err(ParseError::malformed(field, other)),
    }
}
