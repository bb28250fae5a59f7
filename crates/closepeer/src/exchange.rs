//! Closeness exchange between two nodes.
//!
//! The requester sends its own coordinate; the responder answers with every
//! peer it knows that is strictly closer to the requester than the responder
//! itself. A node therefore only ever learns about candidates that would
//! improve its own set, and closeness spreads transitively hop by hop.
//!
//! Under the single-threaded cycle scheduler the exchange is a direct call,
//! but it is modelled as an explicit request/response pair so that a
//! distributed driver can ship the same values over a channel.

use closepeer_coord::Coordinate;
use serde::{Deserialize, Serialize};

use crate::peer::{NodeId, PeerRecord};
use crate::set::ClosePeerSet;

/// Request for peers close to the requester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosenessQuery<C> {
    /// Who is asking.
    pub requester: NodeId,
    /// The requester's own coordinate.
    pub coord: C,
}

/// Answer to a [`ClosenessQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosenessReply<C> {
    /// Who answered.
    pub responder: NodeId,
    /// Peers closer to the requester than the responder, with distances
    /// measured from the requester.
    pub peers: Vec<PeerRecord<C>>,
}

impl<C> ClosenessReply<C> {
    /// A reply carrying nothing.
    pub fn empty(responder: NodeId) -> Self {
        Self {
            responder,
            peers: Vec::new(),
        }
    }

    /// Number of peers offered.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Check if nothing was offered.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }
}

impl<C: Coordinate> ClosePeerSet<C> {
    /// Build the query this set's owner sends during an exchange.
    ///
    /// `None` until the owner's coordinate is bound.
    pub fn query(&self) -> Option<ClosenessQuery<C>> {
        self.coord().map(|coord| ClosenessQuery {
            requester: self.owner(),
            coord: coord.clone(),
        })
    }

    /// Serve a closeness query. Read-only.
    pub fn answer(&self, query: &ClosenessQuery<C>) -> ClosenessReply<C> {
        ClosenessReply {
            responder: self.owner(),
            peers: self.close_peers(&query.coord),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClosePeerConfig;
    use crate::peer::Candidate;
    use closepeer_coord::EuclideanCoord;

    #[test]
    fn unbound_set_has_no_query() {
        let set: ClosePeerSet<EuclideanCoord> =
            ClosePeerSet::new(NodeId(1), ClosePeerConfig::default());
        assert!(set.query().is_none());
    }

    #[test]
    fn query_carries_owner_and_coord() {
        let mut set = ClosePeerSet::new(NodeId(1), ClosePeerConfig::default());
        set.bind_coord(EuclideanCoord::new(2.0, 3.0));

        let query = set.query().unwrap();
        assert_eq!(query.requester, NodeId(1));
        assert_eq!(query.coord, EuclideanCoord::new(2.0, 3.0));
    }

    #[test]
    fn answer_names_responder() {
        let mut responder = ClosePeerSet::new(NodeId(2), ClosePeerConfig::default());
        responder.bind_coord(EuclideanCoord::new(10.0, 0.0));
        responder.merge(vec![
            Candidate::new(NodeId(3), EuclideanCoord::new(1.0, 0.0)),
            Candidate::new(NodeId(4), EuclideanCoord::new(20.0, 0.0)),
        ]);

        let query = ClosenessQuery {
            requester: NodeId(1),
            coord: EuclideanCoord::ORIGIN,
        };
        let reply = responder.answer(&query);

        assert_eq!(reply.responder, NodeId(2));
        assert_eq!(reply.len(), 1);
        assert_eq!(reply.peers[0].id, NodeId(3));
        assert_eq!(reply.peers[0].distance, 1.0);
    }

    #[test]
    fn empty_reply() {
        let reply: ClosenessReply<EuclideanCoord> = ClosenessReply::empty(NodeId(5));
        assert!(reply.is_empty());
        assert_eq!(reply.responder, NodeId(5));
    }
}
