use log::{info, warn};

use crate::cpu::{CpuCore, LineState, Register};
use crate::driver::{Driver, WORK_RAM_SIZE};
use crate::error::{Result, StateError};
use crate::input::{InputPorts, InputSource};

/// Initial stack pointer: the last byte of work RAM.
pub const INITIAL_SP: u16 = 0x4800 + WORK_RAM_SIZE as u16 - 1;
pub const VBLANK_IRQ_LINE: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Running,
    /// A start attempt failed. Nothing else can happen in this session.
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTiming {
    pub clock_hz: u32,
    pub refresh_hz: u32,
}

impl Default for FrameTiming {
    fn default() -> Self {
        Self {
            clock_hz: 3_072_000,
            refresh_hz: 60,
        }
    }
}

impl FrameTiming {
    pub fn cycles_per_frame(&self) -> u32 {
        self.clock_hz / self.refresh_hz.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameReport {
    /// Frame counter after this frame.
    pub frame: u64,
    pub cycles_run: u32,
    pub irq_pulsed: bool,
}

/// Runs the CPU in lockstep with the board, one video frame at a time.
pub struct FrameScheduler<C: CpuCore> {
    cpu: C,
    driver: Driver,
    timing: FrameTiming,
    state: State,
}

impl<C: CpuCore> FrameScheduler<C> {
    pub fn new(cpu: C) -> Self {
        Self::with_driver(cpu, Driver::new())
    }

    pub fn with_driver(cpu: C, driver: Driver) -> Self {
        Self {
            cpu,
            driver,
            timing: FrameTiming::default(),
            state: State::Idle,
        }
    }

    pub fn with_timing(mut self, timing: FrameTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn timing(&self) -> FrameTiming {
        self.timing
    }

    pub fn driver(&self) -> &Driver {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut Driver {
        &mut self.driver
    }

    pub fn cpu(&self) -> &C {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut C {
        &mut self.cpu
    }

    /// Bring the board up with `program_rom` and reset the CPU.
    ///
    /// Any failure tears the board back down and halts the scheduler.
    pub fn start(&mut self, program_rom: &[u8]) -> Result<()> {
        if self.state != State::Idle {
            return Err(StateError::NotIdle(self.state).into());
        }

        let started = self
            .driver
            .init()
            .and_then(|()| self.driver.load_program_rom(program_rom));
        if let Err(e) = started {
            warn!("start failed, halting: {e}");
            self.driver.shutdown();
            self.state = State::Halted;
            return Err(e);
        }

        self.reset_cpu();
        self.state = State::Running;
        info!(
            "running at {} cycles per frame",
            self.timing.cycles_per_frame()
        );
        Ok(())
    }

    fn reset_cpu(&mut self) {
        self.cpu.reset();
        self.cpu.set_register(Register::Pc, 0x0000);
        self.cpu.set_register(Register::Sp, INITIAL_SP);
        for reg in Register::GENERAL {
            self.cpu.set_register(reg, 0);
        }
    }

    fn ensure_running(&self) -> Result<()> {
        match self.state {
            State::Running => Ok(()),
            other => Err(StateError::NotRunning(other).into()),
        }
    }

    /// Execute one frame's budget, then deliver vblank if enabled.
    ///
    /// A CPU fault is returned as-is: no interrupt is raised and the frame
    /// is not counted. The scheduler stays running.
    pub fn run_frame(&mut self) -> Result<FrameReport> {
        self.ensure_running()?;

        let budget = self.timing.cycles_per_frame();
        let cycles_run = self.cpu.execute(&mut self.driver, budget).map_err(|fault| {
            warn!("{fault}");
            fault
        })?;

        let irq_pulsed = self.driver.interrupt_enabled();
        if irq_pulsed {
            self.cpu.set_irq_line(VBLANK_IRQ_LINE, LineState::Assert);
            self.cpu.set_irq_line(VBLANK_IRQ_LINE, LineState::Clear);
        }

        let frame = self.driver.advance_frame();
        Ok(FrameReport {
            frame,
            cycles_run,
            irq_pulsed,
        })
    }

    /// Clear RAM and latches and restart the program from address zero.
    pub fn reset(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.driver.reset();
        self.reset_cpu();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.ensure_running()?;
        self.cpu.exit();
        self.driver.shutdown();
        self.state = State::Idle;
        info!("stopped");
        Ok(())
    }

    pub fn update_input(&mut self, source: &mut dyn InputSource) {
        self.driver.set_input_ports(InputPorts::poll(source));
    }
}
