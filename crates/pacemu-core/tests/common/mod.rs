#![allow(dead_code)]

use std::collections::HashMap;

use pacemu_core::cpu::{CpuCore, LineState, MemoryBus, Register};
use pacemu_core::error::CpuFault;

/// One scripted bus write performed at the start of the next `execute`.
#[derive(Debug, Clone, Copy)]
pub struct PokeAt {
    pub address: u16,
    pub value: u8,
}

/// Stand-in CPU that records how the scheduler drives it.
#[derive(Debug, Default)]
pub struct MockCpu {
    pub registers: HashMap<Register, u16>,
    pub budgets: Vec<u32>,
    pub irq_calls: Vec<(u8, LineState)>,
    pub resets: usize,
    pub exits: usize,
    pub fault_next: Option<CpuFault>,
    pub pokes: Vec<PokeAt>,
}

impl MockCpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poke(&mut self, address: u16, value: u8) {
        self.pokes.push(PokeAt { address, value });
    }
}

impl CpuCore for MockCpu {
    fn reset(&mut self) {
        self.resets += 1;
        self.registers.clear();
    }

    fn exit(&mut self) {
        self.exits += 1;
    }

    fn execute(&mut self, bus: &mut dyn MemoryBus, cycles: u32) -> Result<u32, CpuFault> {
        if let Some(fault) = self.fault_next.take() {
            return Err(fault);
        }
        self.budgets.push(cycles);
        for poke in self.pokes.drain(..) {
            bus.write_byte(poke.address, poke.value);
        }
        // fetch the opcode under PC so the bus sees at least one read
        let pc = self.register(Register::Pc);
        let _ = bus.read_byte(pc);
        Ok(cycles)
    }

    fn register(&self, reg: Register) -> u16 {
        self.registers.get(&reg).copied().unwrap_or(0)
    }

    fn set_register(&mut self, reg: Register, value: u16) {
        self.registers.insert(reg, value);
    }

    fn set_irq_line(&mut self, line: u8, state: LineState) {
        self.irq_calls.push((line, state));
    }
}

/// A 16 KiB program image whose first bytes are `prefix`.
pub fn program_rom(prefix: &[u8]) -> Vec<u8> {
    let mut rom = vec![0u8; 0x4000];
    rom[..prefix.len()].copy_from_slice(prefix);
    rom
}
