//! Close-Peer Discovery
//!
//! Each node keeps a small, bounded set of the peers it believes to be
//! nearest in network latency, estimated through virtual coordinates, and
//! refines it every cycle by gossiping with one of those peers.
//!
//! # Design
//!
//! A node's [`ClosePeerSet`] is a list of [`PeerRecord`]s ordered by cached
//! distance and cut at `max_size` (default 10). New candidates arrive from
//! two places:
//!
//! - the random-peer-sampling overlay ([`PeerSampler`]), which keeps the set
//!   from getting stuck in a local neighbourhood
//! - a closeness exchange with one randomly chosen close peer, which only
//!   returns peers strictly closer to the requester than the responder
//!
//! Because a responder only offers improvements, closeness propagates
//! transitively and each set drifts toward the true nearest neighbours.
//!
//! # Collaborators
//!
//! Scheduling, peer sampling and the coordinate system are external. The
//! core consumes them through [`PeerSampler`], [`CoordinateSource`] and the
//! [`Coordinate`](closepeer_coord::Coordinate) capability, and exposes
//! [`GossipNetwork::step`] and [`NetworkStats`] to the scheduler.

mod config;
mod error;
mod exchange;
mod gossip;
mod peer;
mod set;
mod stats;

pub use config::{ClosePeerConfig, RefreshPolicy, DEFAULT_MAX_SIZE};
pub use error::{Error, Result, Violation};
pub use exchange::{ClosenessQuery, ClosenessReply};
pub use gossip::{CoordinateSource, GossipNetwork, PeerSampler, StepOutcome};
pub use peer::{Candidate, NodeId, PeerRecord};
pub use set::{ClosePeerSet, MergeOutcome};
pub use stats::NetworkStats;

pub use closepeer_coord::{Coordinate, EuclideanCoord};
