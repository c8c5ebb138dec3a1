use log::error;

use crate::error::ConfigurationError;
use crate::region::RegionId;

/// Granule of the 16-bit bus used as the unit of mapping.
pub const PAGE_SIZE: usize = 0x100;
/// Number of pages covering the whole bus.
pub const PAGE_COUNT: usize = 0x100;
/// Value read back from a page with nothing mapped behind it.
pub const OPEN_BUS: u8 = 0xFF;

/// Where one page of the bus lands.
///
/// The entry names its backing region by id rather than holding the buffer,
/// so the allocator stays the single owner of every byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageEntry {
    pub region: RegionId,
    /// Byte offset of the page's first byte inside the region.
    pub offset: usize,
    pub read_only: bool,
}

/// Resolution strategy from bus addresses to region bytes.
///
/// [`PageTable`] is the flat implementation used by the Pac-Man board. A
/// banked target can swap in its own map without touching the driver.
pub trait AddressMap {
    /// Install `region` (starting at `offset`) into every page of
    /// `[start, end]`. Both bounds must sit on page boundaries.
    fn map_range(
        &mut self,
        start: u16,
        end: u16,
        region: RegionId,
        offset: usize,
        read_only: bool,
    ) -> Result<(), ConfigurationError>;

    fn unmap_range(&mut self, start: u16, end: u16) -> Result<(), ConfigurationError>;

    fn resolve(&self, address: u16) -> Option<PageEntry>;

    /// Drop every mapping that points at `region`.
    fn unmap_region(&mut self, region: RegionId);

    fn clear(&mut self);
}

/// Reject ranges that do not cover whole pages.
pub fn check_page_range(start: u16, end: u16) -> Result<(), ConfigurationError> {
    if start > end {
        error!("bad mapping ${start:04X}-${end:04X}: range is empty");
        return Err(ConfigurationError::EmptyRange { start, end });
    }
    let aligned_start = start as usize % PAGE_SIZE == 0;
    let aligned_end = (end as usize + 1) % PAGE_SIZE == 0;
    if !aligned_start || !aligned_end {
        error!("bad mapping ${start:04X}-${end:04X}: not page aligned");
        return Err(ConfigurationError::Misaligned { start, end });
    }
    Ok(())
}

#[inline]
pub fn page_of(address: u16) -> usize {
    (address >> 8) as usize
}

/// One descriptor per 256-byte page, indexed by the address high byte.
#[derive(Debug, Clone)]
pub struct PageTable {
    pages: [Option<PageEntry>; PAGE_COUNT],
}

impl PageTable {
    pub fn new() -> Self {
        Self {
            pages: [None; PAGE_COUNT],
        }
    }

    pub fn mapped_pages(&self) -> usize {
        self.pages.iter().filter(|p| p.is_some()).count()
    }

    pub fn page(&self, index: usize) -> Option<PageEntry> {
        self.pages.get(index).copied().flatten()
    }
}

impl Default for PageTable {
    fn default() -> Self {
        Self::new()
    }
}

impl AddressMap for PageTable {
    fn map_range(
        &mut self,
        start: u16,
        end: u16,
        region: RegionId,
        offset: usize,
        read_only: bool,
    ) -> Result<(), ConfigurationError> {
        check_page_range(start, end)?;
        for (i, page) in (page_of(start)..=page_of(end)).enumerate() {
            self.pages[page] = Some(PageEntry {
                region,
                offset: offset + i * PAGE_SIZE,
                read_only,
            });
        }
        Ok(())
    }

    fn unmap_range(&mut self, start: u16, end: u16) -> Result<(), ConfigurationError> {
        check_page_range(start, end)?;
        for page in page_of(start)..=page_of(end) {
            self.pages[page] = None;
        }
        Ok(())
    }

    #[inline]
    fn resolve(&self, address: u16) -> Option<PageEntry> {
        self.pages[page_of(address)].map(|entry| PageEntry {
            offset: entry.offset + (address as usize & (PAGE_SIZE - 1)),
            ..entry
        })
    }

    fn unmap_region(&mut self, region: RegionId) {
        for page in self.pages.iter_mut() {
            if page.is_some_and(|p| p.region == region) {
                *page = None;
            }
        }
    }

    fn clear(&mut self) {
        self.pages = [None; PAGE_COUNT];
    }
}
