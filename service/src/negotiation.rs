//
// Copyright 2017-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Option negotiation bookkeeping
//!
//! [`Negotiator`] is sans-IO: it is handed each negotiation the peer sends and returns the
//! reply, if any, for the caller to write. It is owned by the connection's parsing task, so the
//! pending sets have a single writer; everything else reads [`NegotiationStatus`] snapshots
//! through a watch channel.
//!
//! Rules for an incoming `(verb, option)` pair:
//!
//! | Verb | Option not configured | Option pending | Option already answered |
//! |---|---|---|---|
//! | WILL / WONT | reply `DONT` | mark answered | reply `DO` |
//! | DO / DONT | reply `WONT` | mark answered | reply `WILL` |
//!
//! Negotiation completes the first time both pending sets are empty.

use crate::types::NegotiationStatus;
use std::collections::BTreeSet;
use telwire_telnetcodec::{Negotiation, TelnetOption};
use tokio::sync::watch;
use tracing::{debug, info};

/// Tracks which of our offers the peer has answered.
#[derive(Debug)]
pub struct Negotiator {
    server_options: BTreeSet<TelnetOption>,
    client_options: BTreeSet<TelnetOption>,
    unacked_server: BTreeSet<TelnetOption>,
    unacked_client: BTreeSet<TelnetOption>,
    complete: bool,
    status: watch::Sender<NegotiationStatus>,
}

impl Negotiator {
    /// Create a negotiator with every configured option pending.
    ///
    /// With no options configured there is nothing to wait for and the negotiator starts out
    /// complete.
    pub fn new(
        server_options: BTreeSet<TelnetOption>,
        client_options: BTreeSet<TelnetOption>,
    ) -> (Negotiator, watch::Receiver<NegotiationStatus>) {
        let complete = server_options.is_empty() && client_options.is_empty();
        let (status, receiver) = watch::channel(NegotiationStatus {
            pending_server: server_options.clone(),
            pending_client: client_options.clone(),
            complete,
        });
        let negotiator = Negotiator {
            unacked_server: server_options.clone(),
            unacked_client: client_options.clone(),
            server_options,
            client_options,
            complete,
            status,
        };
        (negotiator, receiver)
    }

    /// Opening offers: `WILL` for each server option, then `DO` for each client option,
    /// each in ascending option order.
    pub fn offers(&self) -> Vec<Negotiation> {
        self.server_options
            .iter()
            .map(|option| Negotiation::will(*option))
            .chain(self.client_options.iter().map(|option| Negotiation::do_(*option)))
            .collect()
    }

    /// Handle a negotiation from the peer, returning the reply to send.
    pub fn receive(&mut self, negotiation: Negotiation) -> Option<Negotiation> {
        let option = negotiation.option;
        let reply = if negotiation.command.is_sender_side() {
            if !self.client_options.contains(&option) {
                debug!(%negotiation, "Refusing unrequested option");
                return Some(Negotiation::dont(option));
            }
            if self.unacked_client.remove(&option) {
                debug!(%negotiation, "Peer answered DO");
                None
            } else {
                debug!(%negotiation, "Accepting peer offer");
                Some(Negotiation::do_(option))
            }
        } else {
            if !self.server_options.contains(&option) {
                debug!(%negotiation, "Refusing unsupported option");
                return Some(Negotiation::wont(option));
            }
            if self.unacked_server.remove(&option) {
                debug!(%negotiation, "Peer answered WILL");
                None
            } else {
                debug!(%negotiation, "Accepting peer request");
                Some(Negotiation::will(option))
            }
        };
        self.publish();
        reply
    }

    /// Record a peer answer without producing a reply.
    ///
    /// Used when a custom option callback decides the replies; completion is still tracked.
    pub fn observe(&mut self, negotiation: Negotiation) {
        let removed = if negotiation.command.is_sender_side() {
            self.unacked_client.remove(&negotiation.option)
        } else {
            self.unacked_server.remove(&negotiation.option)
        };
        if removed {
            self.publish();
        }
    }

    /// `true` once every offer has been answered.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Current snapshot.
    pub fn status(&self) -> NegotiationStatus {
        NegotiationStatus {
            pending_server: self.unacked_server.clone(),
            pending_client: self.unacked_client.clone(),
            complete: self.complete,
        }
    }

    fn publish(&mut self) {
        if !self.complete && self.unacked_server.is_empty() && self.unacked_client.is_empty() {
            self.complete = true;
            info!("Option negotiation complete");
        }
        self.status.send_replace(self.status());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(codes: &[u8]) -> BTreeSet<TelnetOption> {
        codes.iter().copied().map(TelnetOption::from).collect()
    }

    #[test]
    fn offers_are_ordered_will_then_do() {
        let (negotiator, _) = Negotiator::new(options(&[3, 1]), options(&[31, 0]));
        assert_eq!(
            negotiator.offers(),
            vec![
                Negotiation::will(1u8),
                Negotiation::will(3u8),
                Negotiation::do_(0u8),
                Negotiation::do_(31u8),
            ]
        );
    }

    #[test]
    fn empty_option_sets_start_complete() {
        let (negotiator, status) = Negotiator::new(BTreeSet::new(), BTreeSet::new());
        assert!(negotiator.is_complete());
        assert!(status.borrow().complete);
        assert!(negotiator.offers().is_empty());
    }

    #[test]
    fn completion_waits_for_both_sets() {
        let (mut negotiator, status) = Negotiator::new(options(&[1]), options(&[0]));

        assert_eq!(negotiator.receive(Negotiation::do_(1u8)), None);
        assert!(!negotiator.is_complete());
        assert!(!status.borrow().complete);
        assert!(status.borrow().pending_server.is_empty());

        assert_eq!(negotiator.receive(Negotiation::will(0u8)), None);
        assert!(negotiator.is_complete());
        assert!(status.borrow().complete);
    }

    #[test]
    fn refusals_do_not_touch_pending_sets() {
        let (mut negotiator, status) = Negotiator::new(options(&[1]), options(&[0]));

        assert_eq!(
            negotiator.receive(Negotiation::will(99u8)),
            Some(Negotiation::dont(99u8))
        );
        assert_eq!(
            negotiator.receive(Negotiation::wont(98u8)),
            Some(Negotiation::dont(98u8))
        );
        assert_eq!(
            negotiator.receive(Negotiation::do_(97u8)),
            Some(Negotiation::wont(97u8))
        );
        assert_eq!(
            negotiator.receive(Negotiation::dont(96u8)),
            Some(Negotiation::wont(96u8))
        );
        assert_eq!(negotiator.status().pending_client, options(&[0]));
        assert_eq!(negotiator.status().pending_server, options(&[1]));
        assert!(!status.borrow().complete);
    }

    #[test]
    fn answered_options_are_accepted_again() {
        let (mut negotiator, _) = Negotiator::new(options(&[3]), options(&[24]));

        assert_eq!(negotiator.receive(Negotiation::do_(3u8)), None);
        assert_eq!(
            negotiator.receive(Negotiation::do_(3u8)),
            Some(Negotiation::will(3u8))
        );
        assert_eq!(negotiator.receive(Negotiation::wont(24u8)), None);
        assert_eq!(
            negotiator.receive(Negotiation::will(24u8)),
            Some(Negotiation::do_(24u8))
        );
        assert!(negotiator.is_complete());
    }

    #[test]
    fn completion_is_reported_once() {
        let (mut negotiator, mut status) = Negotiator::new(options(&[1]), BTreeSet::new());
        status.borrow_and_update();

        negotiator.receive(Negotiation::do_(1u8));
        assert!(status.has_changed().unwrap());
        assert!(status.borrow_and_update().complete);

        negotiator.receive(Negotiation::do_(1u8));
        assert!(negotiator.is_complete());
        assert!(status.borrow_and_update().complete);
    }

    #[test]
    fn observe_tracks_answers_without_replies() {
        let (mut negotiator, _) = Negotiator::new(options(&[1]), options(&[0]));
        negotiator.observe(Negotiation::do_(1u8));
        negotiator.observe(Negotiation::will(5u8));
        assert!(!negotiator.is_complete());
        negotiator.observe(Negotiation::wont(0u8));
        assert!(negotiator.is_complete());
    }
}
