//! 提议管理器
//!
//! `<pf>` 收到的挑战/提议、`<pt>` 自己发出的提议、`<pr>` 移除。

use fics_protocol::{Challenge, FramedLine, OfferKind, OfferLine};

use crate::dispatch::{Family, HandlerContext, LineHandler, MessageKind};
use crate::events::Event;

#[derive(Debug, Default)]
pub struct OfferManager;

impl OfferManager {
    pub fn new() -> Self {
        Self
    }
}

impl LineHandler for OfferManager {
    fn family(&self) -> Family {
        Family::Offer
    }

    fn accepts(&self, kind: Option<MessageKind>) -> bool {
        matches!(
            kind,
            Some(MessageKind::OfferReceived | MessageKind::OfferSent | MessageKind::OfferRemoved)
        )
    }

    fn handle(&mut self, _kind: Option<MessageKind>, line: &FramedLine, ctx: &mut HandlerContext<'_>) {
        let parsed = match OfferLine::parse(&line.text) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("丢弃提议行: {}", e);
                return;
            }
        };

        match parsed {
            OfferLine::Incoming(offer) if offer.kind == OfferKind::Match => {
                let challenge = match Challenge::parse(&offer.params) {
                    Ok(challenge) => challenge,
                    Err(e) => {
                        tracing::warn!("丢弃挑战 {}: {}", offer.id, e);
                        return;
                    }
                };
                let id = offer.id;
                ctx.state.offers.insert(id, offer);
                ctx.emit(Event::ChallengeAdd { id, challenge });
            }
            OfferLine::Incoming(offer) => {
                ctx.state.offers.insert(offer.id, offer.clone());
                ctx.emit(Event::OfferAdd(offer));
            }
            OfferLine::Outgoing(offer) => {
                ctx.state.offers.insert(offer.id, offer.clone());
                ctx.emit(Event::OurOfferAdd(offer));
            }
            OfferLine::Removed(id) => match ctx.state.offers.remove(&id) {
                Some(offer) if offer.kind == OfferKind::Match => {
                    ctx.emit(Event::ChallengeRemove(id))
                }
                _ => ctx.emit(Event::OfferRemove(id)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionState;

    fn run(state: &mut SessionState, text: &str) -> Vec<Event> {
        let mut manager = OfferManager::new();
        let mut events = Vec::new();
        let mut ctx = HandlerContext::new(state, &mut events);
        manager.handle(crate::dispatch::classify(text), &FramedLine::plain(text), &mut ctx);
        events
    }

    #[test]
    fn test_challenge_lifecycle() {
        let mut state = SessionState::default();
        let events = run(
            &mut state,
            "<pf> 45 w=GuestGYXR t=match p=GuestGYXR (----) Lobais (----) unrated losers 2 12",
        );
        assert!(matches!(events[..], [Event::ChallengeAdd { id: 45, .. }]));
        assert!(state.offers.contains_key(&45));

        assert_eq!(run(&mut state, "<pr> 45"), vec![Event::ChallengeRemove(45)]);
        assert!(state.offers.is_empty());
    }

    #[test]
    fn test_other_offers() {
        let mut state = SessionState::default();
        assert!(matches!(
            run(&mut state, "<pf> 3 w=foo t=draw p=#")[..],
            [Event::OfferAdd(_)]
        ));
        assert!(matches!(
            run(&mut state, "<pt> 4 w=foo t=takeback p=2")[..],
            [Event::OurOfferAdd(_)]
        ));
        assert_eq!(run(&mut state, "<pr> 3"), vec![Event::OfferRemove(3)]);
        assert_eq!(run(&mut state, "<pr> 99"), vec![Event::OfferRemove(99)]);
    }

    #[test]
    fn test_malformed_challenge_is_dropped() {
        let mut state = SessionState::default();
        let events = run(&mut state, "<pf> 5 w=foo t=match p=foo (1200) bar (1300) rated chess960 2 12");
        assert!(events.is_empty());
        assert!(state.offers.is_empty());
    }
}
