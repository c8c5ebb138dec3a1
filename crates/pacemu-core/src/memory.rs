use std::fmt::Write as _;

use log::{debug, warn};

use crate::address_space::{AddressMap, OPEN_BUS, PageTable, check_page_range};
use crate::error::ConfigurationError;
use crate::region::{RegionAllocator, RegionId};

/// Region allocator plus the map that exposes its buffers on the bus.
#[derive(Debug, Default)]
pub struct Memory<M: AddressMap = PageTable> {
    regions: RegionAllocator,
    map: M,
}

impl Memory<PageTable> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<M: AddressMap> Memory<M> {
    pub fn with_parts(regions: RegionAllocator, map: M) -> Self {
        Self { regions, map }
    }

    pub fn regions(&self) -> &RegionAllocator {
        &self.regions
    }

    pub fn regions_mut(&mut self) -> &mut RegionAllocator {
        &mut self.regions
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    /// Install a whole region over `[start, end]`.
    ///
    /// The region must already be allocated and be large enough to back the
    /// full range.
    pub fn map_range(
        &mut self,
        start: u16,
        end: u16,
        region: RegionId,
        read_only: bool,
    ) -> Result<(), ConfigurationError> {
        check_page_range(start, end)?;
        let size = self
            .regions
            .get_size(region)
            .ok_or(ConfigurationError::MissingRegion(region))?;
        let needed = end as usize - start as usize + 1;
        if size < needed {
            warn!("region {region:?} is too small for ${start:04X}-${end:04X}");
            return Err(ConfigurationError::RegionTooSmall {
                region,
                size,
                offset: 0,
                needed,
            });
        }
        self.map.map_range(start, end, region, 0, read_only)?;
        debug!(
            "mapped {} ${start:04X}-${end:04X} ({needed} bytes{})",
            self.regions.name(region).unwrap_or("?"),
            if read_only { ", read-only" } else { "" }
        );
        Ok(())
    }

    pub fn unmap_region(&mut self, region: RegionId) {
        self.map.unmap_region(region);
    }

    pub fn unmap_all(&mut self) {
        self.map.clear();
    }

    /// Unmap and free a region in one step.
    pub fn release(&mut self, region: RegionId) {
        self.map.unmap_region(region);
        self.regions.free(region);
    }

    #[inline]
    pub fn read_byte(&self, address: u16) -> u8 {
        self.map
            .resolve(address)
            .and_then(|entry| {
                self.regions
                    .get_base(entry.region)
                    .and_then(|data| data.get(entry.offset).copied())
            })
            .unwrap_or(OPEN_BUS)
    }

    #[inline]
    pub fn write_byte(&mut self, address: u16, value: u8) {
        let Some(entry) = self.map.resolve(address) else {
            return;
        };
        if entry.read_only {
            return;
        }
        if let Some(slot) = self
            .regions
            .get_base_mut(entry.region)
            .and_then(|data| data.get_mut(entry.offset))
        {
            *slot = value;
        }
    }

    /// Wide-address entry point; bits above the 16-bit bus are ignored.
    pub fn read_byte_wide(&self, address: u32) -> u8 {
        self.read_byte(address as u16)
    }

    pub fn write_byte_wide(&mut self, address: u32, value: u8) {
        self.write_byte(address as u16, value);
    }

    /// Hex dump of `len` bytes starting at `start`, 16 per line.
    pub fn dump(&self, start: u16, len: usize) -> String {
        let mut out = String::new();
        for (i, address) in (0..len).map(|i| (i, start.wrapping_add(i as u16))) {
            if i % 16 == 0 {
                if i != 0 {
                    out.push('\n');
                }
                let _ = write!(out, "{address:04X}:");
            }
            let _ = write!(out, " {:02X}", self.read_byte(address));
        }
        if len > 0 {
            out.push('\n');
        }
        out
    }
}
