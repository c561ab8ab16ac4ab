//! seek 管理器
//!
//! 处理 `<s>` / `<sn>` / `<sc>` / `<sr>` 以及 seek 更新序列：
//! `Updating seek ad N ...` → `<sr> N` → `<sn> N ...`，整段只发出一个 `SeekUpdated`。
//! 更新序列只在开启它的回复内有效，回复之外的行一律按普通消息处理。

use fics_protocol::{
    parse_seek_removal, FramedLine, ReplyContext, Seek, SeekId, SeekUpdate, SEEK_WITHDRAWAL_CODES,
};

use crate::dispatch::{Family, HandlerContext, LineHandler, MessageKind};
use crate::events::Event;

/// 更新序列的累积状态
#[derive(Debug, Default)]
enum UpdateState {
    #[default]
    Idle,
    Updating {
        id: SeekId,
        /// 开启更新序列的回复
        reply: ReplyContext,
        changes: Vec<String>,
    },
}

#[derive(Debug, Default)]
pub struct SeekManager {
    update: UpdateState,
}

impl SeekManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前行不属于更新序列所在的回复时放弃累积
    fn leave_stale_update(&mut self, line: &FramedLine) {
        if let UpdateState::Updating { id, reply, .. } = &self.update {
            if line.reply != Some(*reply) {
                tracing::debug!("seek {} 的更新序列未完成即离开回复 {:?}", id, reply);
                self.update = UpdateState::Idle;
            }
        }
    }

    fn on_update(&mut self, line: &FramedLine) {
        let Some(reply) = line.reply else {
            tracing::debug!("忽略回复之外的 seek 更新: {:?}", line.text);
            return;
        };
        let update = match SeekUpdate::parse(&line.text) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!("丢弃 seek 更新: {}", e);
                return;
            }
        };
        if let UpdateState::Updating { id, changes, .. } = &mut self.update {
            if *id == update.id {
                changes.push(update.change);
                return;
            }
        }
        self.update = UpdateState::Updating {
            id: update.id,
            reply,
            changes: vec![update.change],
        };
    }

    fn on_remove(&mut self, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
        let ids = match parse_seek_removal(line.text.trim()) {
            Ok(ids) => ids,
            Err(e) => {
                tracing::warn!("丢弃 seek 移除行: {}", e);
                return;
            }
        };

        // 更新序列中的重新发布，吞掉
        if let UpdateState::Updating { id, .. } = &self.update {
            if ids == [*id] {
                return;
            }
        }

        // 服务器对每次撤回只回复一行 `<sr>`
        if line.is_reply_to(SEEK_WITHDRAWAL_CODES) {
            for id in &ids {
                ctx.state.seeks.remove(id);
            }
            ctx.emit(Event::OurSeeksRemoved);
            return;
        }

        for id in ids {
            ctx.state.seeks.remove(&id);
            ctx.emit(Event::RemoveSeek(id));
        }
    }

    fn on_add(&mut self, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
        let seek = match Seek::parse(&line.text) {
            Ok(seek) => seek,
            Err(e) => {
                tracing::warn!("丢弃 seek: {}", e);
                return;
            }
        };

        if let UpdateState::Updating { id, .. } = &self.update {
            if *id == seek.id {
                if let UpdateState::Updating { changes, .. } = std::mem::take(&mut self.update) {
                    ctx.state.seeks.insert(seek.id, seek);
                    ctx.emit(Event::SeekUpdated(changes.join("; ")));
                }
                return;
            }
        }

        ctx.state.seeks.insert(seek.id, seek.clone());
        ctx.emit(Event::AddSeek(seek));
    }
}

impl LineHandler for SeekManager {
    fn family(&self) -> Family {
        Family::Seek
    }

    fn accepts(&self, kind: Option<MessageKind>) -> bool {
        // 更新序列进行中需要看到每一行，以便发现回复已结束
        !matches!(self.update, UpdateState::Idle)
            || matches!(
                kind,
                Some(
                    MessageKind::SeekAdd
                        | MessageKind::SeekClear
                        | MessageKind::SeekRemove
                        | MessageKind::SeekUpdate
                )
            )
    }

    fn handle(&mut self, kind: Option<MessageKind>, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
        self.leave_stale_update(line);
        match kind {
            Some(MessageKind::SeekAdd) => self.on_add(line, ctx),
            Some(MessageKind::SeekClear) => {
                ctx.state.seeks.clear();
                ctx.emit(Event::ClearSeeks);
            }
            Some(MessageKind::SeekRemove) => self.on_remove(line, ctx),
            Some(MessageKind::SeekUpdate) => self.on_update(line),
            _ => {}
        }
    }
}
