//! Player contract and the boundary that isolates agent failures
//!
//! Architecture:
//! - Level 1: `Player` trait implemented by every bot
//! - Level 2: `AgentHandle` owns one player for one match
//! - Level 3: inline calls or a worker thread bounded by a per-turn budget

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::Duration;

use crate::game::{GameState, Order};

// ============================================================================
// PLAYER CONTRACT
// ============================================================================

/// What an agent wants to do this turn
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Decision {
    #[default]
    Hold,
    Single(Order),
    Many(Vec<Order>),
}

impl Decision {
    /// Normalize into a flat order list
    pub fn into_orders(self) -> Vec<Order> {
        match self {
            Decision::Hold => Vec::new(),
            Decision::Single(order) => vec![order],
            Decision::Many(orders) => orders,
        }
    }
}

impl From<Order> for Decision {
    fn from(order: Order) -> Self {
        Decision::Single(order)
    }
}

impl From<Option<Order>> for Decision {
    fn from(order: Option<Order>) -> Self {
        order.map_or(Decision::Hold, Decision::Single)
    }
}

impl From<Vec<Order>> for Decision {
    fn from(orders: Vec<Order>) -> Self {
        Decision::Many(orders)
    }
}

/// An agent taking part in matches
///
/// Every call receives a state relabeled so that `Owner::First` is the
/// agent's own side.
pub trait Player: Send {
    /// Display name, the bare type name unless overridden
    fn name(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Called once before the first turn with the initial state
    fn on_match_start(&mut self, _state: &GameState) -> anyhow::Result<()> {
        Ok(())
    }

    /// Choose orders for the current turn
    fn decide(&mut self, state: &GameState, turn: u32) -> anyhow::Result<Decision>;
}

fn short_type_name(full: &str) -> String {
    // Drop generic arguments before taking the last path segment
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

// ============================================================================
// FAULTS
// ============================================================================

/// Failure of an agent, reported as a value rather than unwinding the engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentFault {
    #[error("agent returned an error: {0}")]
    Raised(String),

    #[error("agent panicked: {0}")]
    Panicked(String),

    #[error("agent did not answer within {budget:?}")]
    TimedOut { budget: Duration },

    #[error("agent worker is unavailable")]
    Disconnected,
}

/// Run agent code, turning errors and panics into faults
fn shielded<T>(call: impl FnOnce() -> anyhow::Result<T>) -> Result<T, AgentFault> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(AgentFault::Raised(format!("{err:#}"))),
        Err(payload) => Err(AgentFault::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// ============================================================================
// AGENT HANDLE
// ============================================================================

enum Request {
    Start(GameState),
    Decide(GameState, u32),
}

type Reply = Result<Vec<Order>, AgentFault>;

struct Worker {
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    budget: Duration,
    /// A reply from a timed-out call is still owed
    owed: bool,
}

enum Seat {
    Inline(Box<dyn Player>),
    Threaded(Worker),
    Unavailable,
}

/// One agent seated for one match
pub struct AgentHandle {
    name: String,
    seat: Seat,
}

impl AgentHandle {
    /// Seat a player, on its own worker thread when `budget` is set
    pub fn new(player: Box<dyn Player>, budget: Option<Duration>) -> Self {
        let name = player.name();
        let seat = match budget {
            None => Seat::Inline(player),
            Some(budget) => spawn_worker(&name, player, budget),
        };
        Self { name, seat }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Deliver the match-start hook
    pub fn start(&mut self, state: &GameState) -> Result<(), AgentFault> {
        match &mut self.seat {
            Seat::Inline(player) => shielded(|| player.on_match_start(state)),
            Seat::Threaded(worker) => worker.ask(Request::Start(state.clone())).map(|_| ()),
            Seat::Unavailable => Err(AgentFault::Disconnected),
        }
    }

    /// Ask for this turn's orders
    pub fn decide(&mut self, state: &GameState, turn: u32) -> Result<Vec<Order>, AgentFault> {
        match &mut self.seat {
            Seat::Inline(player) => shielded(|| player.decide(state, turn)).map(Decision::into_orders),
            Seat::Threaded(worker) => worker.ask(Request::Decide(state.clone(), turn)),
            Seat::Unavailable => Err(AgentFault::Disconnected),
        }
    }
}

impl std::fmt::Debug for AgentHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let seat = match self.seat {
            Seat::Inline(_) => "inline",
            Seat::Threaded(_) => "threaded",
            Seat::Unavailable => "unavailable",
        };
        f.debug_struct("AgentHandle")
            .field("name", &self.name)
            .field("seat", &seat)
            .finish()
    }
}

fn spawn_worker(name: &str, mut player: Box<dyn Player>, budget: Duration) -> Seat {
    let (request_tx, request_rx) = mpsc::channel::<Request>();
    let (reply_tx, reply_rx) = mpsc::channel::<Reply>();

    let spawned = thread::Builder::new()
        .name(format!("agent-{name}"))
        .spawn(move || {
            for request in request_rx {
                let reply = match request {
                    Request::Start(state) => {
                        shielded(|| player.on_match_start(&state)).map(|()| Vec::new())
                    }
                    Request::Decide(state, turn) => {
                        shielded(|| player.decide(&state, turn)).map(Decision::into_orders)
                    }
                };
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
        });

    match spawned {
        Ok(_) => Seat::Threaded(Worker {
            requests: request_tx,
            replies: reply_rx,
            budget,
            owed: false,
        }),
        Err(err) => {
            tracing::warn!(agent = name, error = %err, "could not start agent worker");
            Seat::Unavailable
        }
    }
}

impl Worker {
    fn ask(&mut self, request: Request) -> Reply {
        if self.owed {
            // Still busy with an earlier call unless its late answer arrived
            match self.replies.try_recv() {
                Ok(_) => self.owed = false,
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                    return Err(AgentFault::Disconnected)
                }
            }
        }

        if self.requests.send(request).is_err() {
            return Err(AgentFault::Disconnected);
        }

        match self.replies.recv_timeout(self.budget) {
            Ok(reply) => reply,
            Err(RecvTimeoutError::Timeout) => {
                self.owed = true;
                Err(AgentFault::TimedOut {
                    budget: self.budget,
                })
            }
            Err(RecvTimeoutError::Disconnected) => Err(AgentFault::Disconnected),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
