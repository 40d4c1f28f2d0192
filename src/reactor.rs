//! Readiness registration.
//!
//! The event loop itself lives outside the connection core. A connection only
//! tells the reactor which readiness events it wants for its token; whoever
//! drives the loop checks [`Reactor::is_attached`] and dispatches to the
//! connection's callback (`Connection::on_readable`).

use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;

/// Kind of readiness a connection can register for. Writes block until
/// done, so only read interest is ever registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Interest {
    Read,
}

/// Identifies one registered connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(pub u64);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registrar for readiness interest.
///
/// Methods take `&self` so a single reactor can be shared by every
/// connection it serves.
pub trait Reactor {
    fn attach(&self, interest: Interest, token: Token);

    /// Detaching an interest that is not attached is a no-op.
    fn detach(&self, interest: Interest, token: Token);

    fn is_attached(&self, interest: Interest, token: Token) -> bool;
}

/// In-process registrar backed by a set of `(interest, token)` pairs.
#[derive(Debug, Default)]
pub struct Registry {
    attached: Mutex<HashSet<(Interest, Token)>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<(Interest, Token)>> {
        // a poisoned set is still a valid set
        self.attached.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Reactor for Registry {
    fn attach(&self, interest: Interest, token: Token) {
        self.lock().insert((interest, token));
    }

    fn detach(&self, interest: Interest, token: Token) {
        self.lock().remove(&(interest, token));
    }

    fn is_attached(&self, interest: Interest, token: Token) -> bool {
        self.lock().contains(&(interest, token))
    }
}
