use std::io;

use thiserror::Error;

use crate::region::RegionId;
use crate::scheduler::State;

/// Region allocation failed. Fatal to the init attempt that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    #[error("region {name} requests {size} bytes, above the {max} byte limit")]
    TooLarge {
        name: &'static str,
        size: usize,
        max: usize,
    },

    #[error("cannot allocate region {name}: {max} regions already live")]
    TooManyRegions { name: &'static str, max: usize },

    #[error("region {0:?} is already allocated")]
    AlreadyAllocated(RegionId),
}

/// Invalid mapping request. Always a programming error in the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("range ${start:04X}-${end:04X} is not aligned to 256-byte pages")]
    Misaligned { start: u16, end: u16 },

    #[error("range ${start:04X}-${end:04X} is empty")]
    EmptyRange { start: u16, end: u16 },

    #[error("region {region:?} holds {size} bytes, range needs {needed} from offset {offset}")]
    RegionTooSmall {
        region: RegionId,
        size: usize,
        offset: usize,
        needed: usize,
    },

    #[error("region {0:?} is not allocated")]
    MissingRegion(RegionId),
}

/// Operation attempted in the wrong scheduler state.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateError {
    #[error("scheduler is {0:?}, expected Running")]
    NotRunning(State),

    #[error("scheduler is {0:?}, expected Idle")]
    NotIdle(State),

    #[error("hardware driver is not initialized")]
    DriverOffline,
}

/// ROM image problems. Nothing is committed when one of these is returned.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("{name}: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("{name}: {source}")]
    Missing {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Failure reported by the external CPU core while executing a frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cpu fault at ${pc:04X}: {message}")]
pub struct CpuFault {
    pub pc: u16,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Cpu(#[from] CpuFault),
}

pub type Result<T> = std::result::Result<T, Error>;
