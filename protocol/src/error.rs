//! 错误类型定义

use thiserror::Error;

/// 文本格式解析错误
///
/// 匹配成功但字段不合法时返回，调用方丢弃整条消息并记录日志。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// 数字字段无法解析
    #[error("Invalid number in field `{field}`: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// 缺少必需字段
    #[error("Missing field `{0}`")]
    MissingField(&'static str),

    /// 未知的对局类别
    #[error("Unknown game category: {0:?}")]
    UnknownCategory(String),

    /// 无效的等级分文本
    #[error("Invalid rating: {0:?}")]
    InvalidRating(String),

    /// 无效的颜色标记
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),

    /// 无效的时间戳
    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    /// 结构不符合预期
    #[error("Malformed {kind} line: {line:?}")]
    Malformed { kind: &'static str, line: String },
}

impl ParseError {
    /// 构造 Malformed 错误
    pub fn malformed(kind: &'static str, line: &str) -> Self {
        ParseError::Malformed {
            kind,
            line: line.to_string(),
        }
    }
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,

    /// 行过长
    #[error("Line too long: {size} bytes (max: {max})")]
    LineTooLong { size: usize, max: usize },

    /// 解析错误
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// 解析工具：把字符串解析为数字，失败时带上字段名
pub(crate) fn parse_number<T: std::str::FromStr>(
    field: &'static str,
    value: &str,
) -> std::result::Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
