//! Memory-mapped register file exposed over the configuration bus.
//!
//! Five word registers decoded from the low address byte. Unmapped reads
//! return zero and unmapped writes are ignored, as are writes to the
//! read-only status and captured-signature registers.

use crate::controller::RuntimeStatus;

/// Control register: bit 0 arms the engine.
pub const REG_CTRL: u8 = 0x00;
/// Status register: bit 0 busy, bit 1 sticky fail. Read-only.
pub const REG_STATUS: u8 = 0x04;
/// Idle threshold register, in consecutive idle cycles.
pub const REG_THRESHOLD: u8 = 0x08;
/// Golden signature register compared against at the end of a run.
pub const REG_GOLDEN_SIG: u8 = 0x0C;
/// Signature captured by the last completed run. Read-only.
pub const REG_CAPTURED_SIG: u8 = 0x10;

/// CTRL bit arming the engine.
pub const CTRL_ENABLE: u32 = 0x0000_0001;
/// STATUS bit set while a run or its evaluation is in flight.
pub const STATUS_BUSY: u32 = 0x0000_0001;
/// STATUS bit latched by a mismatching run, cleared by the next pass.
pub const STATUS_FAIL: u32 = 0x0000_0002;

/// Software-writable configuration state. All registers reset to zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RegisterFile {
    ctrl: u32,
    threshold: u32,
    golden_signature: u32,
}

impl RegisterFile {
    /// Creates a register file in the reset state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ctrl: 0,
            threshold: 0,
            golden_signature: 0,
        }
    }

    pub(crate) const fn from_raw(ctrl: u32, threshold: u32, golden_signature: u32) -> Self {
        Self {
            ctrl,
            threshold,
            golden_signature,
        }
    }

    /// Returns true while CTRL.ENABLE is set.
    #[must_use]
    pub const fn enable(&self) -> bool {
        self.ctrl & CTRL_ENABLE != 0
    }

    /// Returns the CTRL register value.
    #[must_use]
    pub const fn ctrl(&self) -> u32 {
        self.ctrl
    }

    /// Returns the configured idle threshold.
    #[must_use]
    pub const fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Returns the configured golden signature.
    #[must_use]
    pub const fn golden_signature(&self) -> u32 {
        self.golden_signature
    }

    /// Applies a committed bus write.
    ///
    /// CTRL keeps only its defined bits; read-only and unmapped addresses
    /// are ignored.
    pub fn write(&mut self, addr: u8, value: u32) {
        match addr {
            REG_CTRL => self.ctrl = value & CTRL_ENABLE,
            REG_THRESHOLD => self.threshold = value,
            REG_GOLDEN_SIG => self.golden_signature = value,
            _ => {}
        }
    }

    /// Reads the register at `addr`, splicing in live engine status.
    ///
    /// Unmapped addresses read as zero.
    #[must_use]
    pub fn read(&self, addr: u8, status: RuntimeStatus) -> u32 {
        match addr {
            REG_CTRL => self.ctrl,
            REG_STATUS => status.status_bits(),
            REG_THRESHOLD => self.threshold,
            REG_GOLDEN_SIG => self.golden_signature,
            REG_CAPTURED_SIG => status.captured_signature,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        RegisterFile, CTRL_ENABLE, REG_CAPTURED_SIG, REG_CTRL, REG_GOLDEN_SIG, REG_STATUS,
        REG_THRESHOLD, STATUS_BUSY, STATUS_FAIL,
    };
    use crate::controller::RuntimeStatus;

    const QUIET: RuntimeStatus = RuntimeStatus {
        busy: false,
        fail: false,
        captured_signature: 0,
    };

    #[test]
    fn registers_reset_to_zero() {
        let regs = RegisterFile::new();
        for addr in [
            REG_CTRL,
            REG_STATUS,
            REG_THRESHOLD,
            REG_GOLDEN_SIG,
            REG_CAPTURED_SIG,
        ] {
            assert_eq!(regs.read(addr, QUIET), 0, "register {addr:#04x}");
        }
        assert!(!regs.enable());
    }

    #[test]
    fn ctrl_masks_undefined_bits() {
        let mut regs = RegisterFile::new();
        regs.write(REG_CTRL, 0xFFFF_FFFF);
        assert_eq!(regs.ctrl(), CTRL_ENABLE);
        assert!(regs.enable());

        regs.write(REG_CTRL, 0xFFFF_FFFE);
        assert!(!regs.enable());
    }

    #[test]
    fn threshold_and_golden_hold_full_words() {
        let mut regs = RegisterFile::new();
        regs.write(REG_THRESHOLD, 0xDEAD_0005);
        regs.write(REG_GOLDEN_SIG, 0xCAFE_BABE);
        assert_eq!(regs.threshold(), 0xDEAD_0005);
        assert_eq!(regs.read(REG_GOLDEN_SIG, QUIET), 0xCAFE_BABE);
    }

    #[test]
    fn status_read_reflects_live_engine_state() {
        let regs = RegisterFile::new();
        let status = RuntimeStatus {
            busy: true,
            fail: true,
            captured_signature: 0x1234_5678,
        };
        assert_eq!(regs.read(REG_STATUS, status), STATUS_BUSY | STATUS_FAIL);
        assert_eq!(regs.read(REG_CAPTURED_SIG, status), 0x1234_5678);
    }

    #[test]
    fn read_only_registers_ignore_writes() {
        let mut regs = RegisterFile::new();
        regs.write(REG_STATUS, 0xFFFF_FFFF);
        regs.write(REG_CAPTURED_SIG, 0xFFFF_FFFF);
        assert_eq!(regs.read(REG_STATUS, QUIET), 0);
        assert_eq!(regs.read(REG_CAPTURED_SIG, QUIET), 0);
    }

    #[test]
    fn unmapped_addresses_read_zero_and_drop_writes() {
        let mut regs = RegisterFile::new();
        regs.write(0x14, 0xFFFF_FFFF);
        regs.write(0xFC, 0xFFFF_FFFF);
        assert_eq!(regs.read(0x14, QUIET), 0);
        assert_eq!(regs.read(0xFC, QUIET), 0);
        assert_eq!(regs.read(0x03, QUIET), 0);
    }
}
