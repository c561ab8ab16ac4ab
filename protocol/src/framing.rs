//! block mode 行分帧
//!
//! 服务器把对某条命令的回复包在
//! `BLOCK_START <id> BLOCK_SEPARATOR <code> BLOCK_SEPARATOR ... BLOCK_END`
//! 之间。分帧器去掉这些标记，把括号内的有效行打上 `(command_id, reply_code)`。

use serde::{Deserialize, Serialize};

use crate::constants::{
    BLOCK_END, BLOCK_POSE_END, BLOCK_POSE_START, BLOCK_SEPARATOR, BLOCK_START,
};

/// 回复上下文
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReplyContext {
    /// 客户端命令编号
    pub command_id: u32,
    /// 回复码（命令类型）
    pub code: u32,
}

/// 分帧后的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedLine {
    pub text: String,
    pub reply: Option<ReplyContext>,
}

impl FramedLine {
    /// 无回复上下文的普通行
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply: None,
        }
    }

    /// 是否处于指定回复码的回复中
    pub fn is_reply_to(&self, codes: &[u32]) -> bool {
        self.reply.is_some_and(|ctx| codes.contains(&ctx.code))
    }
}

/// 行分帧器
#[derive(Debug, Clone)]
pub struct LineFramer {
    prompt: Option<String>,
    context: Option<ReplyContext>,
}

impl LineFramer {
    /// 创建分帧器，`prompt` 为空时不剥离提示符
    pub fn new(prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        Self {
            prompt: (!prompt.is_empty()).then_some(prompt),
            context: None,
        }
    }

    /// 当前打开的回复上下文
    pub fn context(&self) -> Option<ReplyContext> {
        self.context
    }

    /// 处理一行原始文本
    ///
    /// 纯标记行返回 `None`。
    pub fn push(&mut self, raw: &str) -> Option<FramedLine> {
        let mut line = self.strip_prompt(raw.trim_end_matches(['\r', '\n']));

        if let Some(rest) = line.strip_prefix(BLOCK_START) {
            if let Some(open) = self.context.take() {
                tracing::warn!("嵌套的 block 起始标记，丢弃上下文 {:?}", open);
            }
            let Some((ctx, payload)) = parse_block_header(rest) else {
                tracing::warn!("无法解析 block 起始标记: {:?}", rest);
                return None;
            };
            self.context = Some(ctx);
            if payload.is_empty() {
                return None;
            }
            line = self.strip_prompt(payload);
        }

        if line == BLOCK_END.to_string() {
            if self.context.take().is_none() {
                tracing::warn!("多余的 block 结束标记");
            }
            return None;
        }

        if let Some(rest) = line.strip_prefix(BLOCK_POSE_START) {
            let text = rest.trim_end_matches(BLOCK_POSE_END);
            return Some(FramedLine::plain(self.strip_prompt(text)));
        }

        let closes = line.ends_with(BLOCK_END);
        let text = line.trim_end_matches(BLOCK_END);
        let framed = FramedLine {
            text: text.to_string(),
            reply: self.context,
        };
        if closes {
            self.context = None;
        }
        Some(framed)
    }

    /// 去掉行首的提示符（可能重复出现）
    fn strip_prompt<'a>(&self, mut line: &'a str) -> &'a str {
        let Some(prompt) = self.prompt.as_deref() else {
            return line;
        };
        while let Some(rest) = line.strip_prefix(prompt) {
            line = rest.trim_start_matches(' ');
        }
        line
    }
}

/// 解析 `<id> SEP <code> SEP <payload>`
fn parse_block_header(rest: &str) -> Option<(ReplyContext, &str)> {
    let mut parts = rest.splitn(3, BLOCK_SEPARATOR);
    let command_id = parts.next()?.trim().parse().ok()?;
    let code = parts.next()?.trim().parse().ok()?;
    let payload = parts.next().unwrap_or("");
    Some((ReplyContext { command_id, code }, payload))
}
