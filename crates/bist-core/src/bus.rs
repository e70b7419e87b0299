//! Two-phase configuration bus port (APB-style, no wait states).
//!
//! A transaction asserts select with address, direction and write data in
//! the setup phase, then asserts the enable strobe one cycle later to
//! commit. The responder is always ready. Reads return the addressed
//! register as sampled at address-latch time; writes become effects applied
//! atomically at the access commit.

/// Request pins sampled from the bus master each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BusRequest {
    /// Responder select.
    pub psel: bool,
    /// Access-phase strobe.
    pub penable: bool,
    /// Transfer direction, true for writes.
    pub pwrite: bool,
    /// Byte address; only the low byte is decoded.
    pub paddr: u32,
    /// Write data, sampled in the setup phase.
    pub pwdata: u32,
}

impl BusRequest {
    /// An idle bus cycle with nothing selected.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            psel: false,
            penable: false,
            pwrite: false,
            paddr: 0,
            pwdata: 0,
        }
    }

    /// Setup-phase pins for a read of `addr`.
    #[must_use]
    pub const fn setup_read(addr: u32) -> Self {
        Self {
            psel: true,
            penable: false,
            pwrite: false,
            paddr: addr,
            pwdata: 0,
        }
    }

    /// Access-phase pins completing a read of `addr`.
    #[must_use]
    pub const fn access_read(addr: u32) -> Self {
        Self {
            penable: true,
            ..Self::setup_read(addr)
        }
    }

    /// Setup-phase pins for a write of `value` to `addr`.
    #[must_use]
    pub const fn setup_write(addr: u32, value: u32) -> Self {
        Self {
            psel: true,
            penable: false,
            pwrite: true,
            paddr: addr,
            pwdata: value,
        }
    }

    /// Access-phase pins completing a write of `value` to `addr`.
    #[must_use]
    pub const fn access_write(addr: u32, value: u32) -> Self {
        Self {
            penable: true,
            ..Self::setup_write(addr, value)
        }
    }
}

/// Response pins driven back to the bus master each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BusReply {
    /// Read data, valid during the access phase of a read.
    pub prdata: u32,
    /// Transfer ready; this responder never inserts wait states.
    pub pready: bool,
}

/// Handshake progress, one variant per protocol phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum BusPhase {
    /// No transaction selected.
    #[default]
    Idle,
    /// Setup latched; waiting for the access strobe.
    Setup {
        /// Latched direction, true for writes.
        write: bool,
        /// Latched low-byte register address.
        addr: u8,
        /// Latched write data.
        wdata: u32,
        /// Read data sampled at address-latch time.
        rdata: u32,
    },
    /// An access committed on the previous cycle.
    Access,
}

/// Register access committed by a completed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusCommit {
    /// A read completed.
    Read {
        /// Decoded low-byte register address.
        addr: u8,
        /// Value returned to the master.
        value: u32,
    },
    /// A write committed.
    Write {
        /// Decoded low-byte register address.
        addr: u8,
        /// Value written.
        value: u32,
    },
}

/// The bus-facing port: latches on setup, commits on access, always ready.
///
/// A select that drops before the enable strobe abandons the transaction
/// with no effect; an enable strobe without a preceding setup is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ApbPort {
    phase: BusPhase,
}

impl ApbPort {
    /// Creates an idle port.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: BusPhase::Idle,
        }
    }

    pub(crate) const fn from_phase(phase: BusPhase) -> Self {
        Self { phase }
    }

    /// Returns the handshake phase.
    #[must_use]
    pub const fn phase(self) -> BusPhase {
        self.phase
    }

    /// Advances the handshake one cycle.
    ///
    /// `read_register` is consulted once, at address-latch time, so the
    /// value returned to the master is the one sampled in the setup phase.
    /// The committed effect, if any, is returned for the owner to apply.
    pub fn tick<F>(&mut self, req: BusRequest, read_register: F) -> (BusReply, Option<BusCommit>)
    where
        F: FnOnce(u8) -> u32,
    {
        let mut reply = BusReply {
            prdata: 0,
            pready: true,
        };
        let mut commit = None;

        self.phase = match self.phase {
            BusPhase::Idle | BusPhase::Access => {
                if req.psel && !req.penable {
                    Self::latch(req, read_register)
                } else {
                    BusPhase::Idle
                }
            }
            BusPhase::Setup {
                write,
                addr,
                wdata,
                rdata,
            } => {
                if req.psel && req.penable {
                    if write {
                        commit = Some(BusCommit::Write { addr, value: wdata });
                    } else {
                        reply.prdata = rdata;
                        commit = Some(BusCommit::Read { addr, value: rdata });
                    }
                    BusPhase::Access
                } else if req.psel {
                    // The master restarted the setup phase; relatch.
                    Self::latch(req, read_register)
                } else {
                    // Select dropped before enable: abandoned transaction.
                    BusPhase::Idle
                }
            }
        };

        (reply, commit)
    }

    fn latch<F>(req: BusRequest, read_register: F) -> BusPhase
    where
        F: FnOnce(u8) -> u32,
    {
        let addr = low_byte(req.paddr);
        let rdata = if req.pwrite { 0 } else { read_register(addr) };
        BusPhase::Setup {
            write: req.pwrite,
            addr,
            wdata: req.pwdata,
            rdata,
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
const fn low_byte(addr: u32) -> u8 {
    (addr & 0xFF) as u8
}
