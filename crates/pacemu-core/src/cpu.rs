//! Seams to the Z80 instruction core.
//!
//! The board does not interpret instructions itself. A host plugs in any core
//! that implements [`CpuCore`]; the core sees the board only through
//! [`MemoryBus`].

use crate::error::CpuFault;

/// Byte-wide view of the bus as seen from the CPU.
///
/// Reads take `&mut self` because I/O reads may have side effects on real
/// hardware.
pub trait MemoryBus {
    fn read_byte(&mut self, address: u16) -> u8;
    fn write_byte(&mut self, address: u16, value: u8);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    Pc,
    Sp,
    Af,
    Bc,
    De,
    Hl,
    Ix,
    Iy,
}

impl Register {
    /// Registers zeroed on power-up, besides PC and SP which get explicit
    /// values.
    pub const GENERAL: [Register; 6] = [
        Register::Af,
        Register::Bc,
        Register::De,
        Register::Hl,
        Register::Ix,
        Register::Iy,
    ];
}

/// Level applied to an interrupt input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineState {
    Clear,
    Assert,
    /// Held until the CPU acknowledges.
    Hold,
    Pulse,
}

pub trait CpuCore {
    fn reset(&mut self);

    /// Release any resources held by the core. Called once when the session
    /// stops.
    fn exit(&mut self);

    /// Run for roughly `cycles` clock cycles and return how many actually ran.
    fn execute(&mut self, bus: &mut dyn MemoryBus, cycles: u32) -> Result<u32, CpuFault>;

    fn register(&self, reg: Register) -> u16;
    fn set_register(&mut self, reg: Register, value: u16);
    fn set_irq_line(&mut self, line: u8, state: LineState);
}

impl<C: CpuCore + ?Sized> CpuCore for Box<C> {
    fn reset(&mut self) {
        (**self).reset();
    }

    fn exit(&mut self) {
        (**self).exit();
    }

    fn execute(&mut self, bus: &mut dyn MemoryBus, cycles: u32) -> Result<u32, CpuFault> {
        (**self).execute(bus, cycles)
    }

    fn register(&self, reg: Register) -> u16 {
        (**self).register(reg)
    }

    fn set_register(&mut self, reg: Register, value: u16) {
        (**self).set_register(reg, value);
    }

    fn set_irq_line(&mut self, line: u8, state: LineState) {
        (**self).set_irq_line(line, state);
    }
}
