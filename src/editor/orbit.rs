//! Orbit control gating
//!
//! Camera orbiting and entity dragging share the pointer. A drag takes the
//! controls out of service by holding an `OrbitLease`; only handing the
//! lease back re-enables them, so the two can never run at once.

use tracing::debug;

/// Proof that orbit controls are suspended. Not cloneable: exactly one
/// holder can resume the controls.
#[derive(Debug)]
#[must_use = "dropping the lease leaves orbit controls disabled"]
pub struct OrbitLease {
    _sealed: (),
}

#[derive(Debug, Clone)]
pub struct OrbitControls {
    enabled: bool,
    leased: bool,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self { enabled: true, leased: false }
    }

    /// Whether pointer input may orbit/pan/zoom the camera right now
    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.leased
    }

    pub fn is_leased(&self) -> bool {
        self.leased
    }

    /// User preference toggle. Takes effect once any lease is returned.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Take the controls out of service. Refused while another lease is out.
    pub fn suspend(&mut self) -> Option<OrbitLease> {
        if self.leased {
            return None;
        }
        self.leased = true;
        debug!("orbit controls suspended");
        Some(OrbitLease { _sealed: () })
    }

    /// Return a lease. The preference toggle is left as it is now, including
    /// any change made while the lease was out.
    pub fn resume(&mut self, lease: OrbitLease) {
        let OrbitLease { _sealed: () } = lease;
        self.leased = false;
        debug!("orbit controls resumed");
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new()
    }
}
