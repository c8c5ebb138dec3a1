use log::{debug, warn};

use crate::error::AllocationError;

/// Largest buffer a single region may hold.
pub const MAX_REGION_SIZE: usize = 4 * 1024 * 1024;
/// Default cap on simultaneously live regions.
pub const MAX_REGIONS: usize = 16;

/// Identifies what a backing buffer is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionId {
    ProgramRom,
    VideoRam,
    ColorRam,
    WorkRam,
    /// Character ROM the tile table is expanded from.
    Graphics,
    /// Palette and lookup PROMs.
    ColorProm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionLimits {
    pub max_regions: usize,
    pub max_region_size: usize,
}

impl Default for RegionLimits {
    fn default() -> Self {
        Self {
            max_regions: MAX_REGIONS,
            max_region_size: MAX_REGION_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionInfo {
    pub id: RegionId,
    pub name: &'static str,
    pub size: usize,
}

#[derive(Debug)]
struct MemoryRegion {
    id: RegionId,
    name: &'static str,
    data: Box<[u8]>,
}

/// Owns every backing buffer installed into the address space.
///
/// Buffers are created zero-filled and never resized. At most one region per
/// [`RegionId`] is live at any time.
#[derive(Debug, Default)]
pub struct RegionAllocator {
    regions: Vec<MemoryRegion>,
    limits: RegionLimits,
}

impl RegionAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: RegionLimits) -> Self {
        Self {
            regions: Vec::new(),
            limits,
        }
    }

    pub fn limits(&self) -> RegionLimits {
        self.limits
    }

    pub fn set_limits(&mut self, limits: RegionLimits) {
        self.limits = limits;
    }

    pub fn allocate(
        &mut self,
        id: RegionId,
        size: usize,
        name: &'static str,
    ) -> Result<(), AllocationError> {
        if self.contains(id) {
            warn!("refusing to allocate {name}: {id:?} is already live");
            return Err(AllocationError::AlreadyAllocated(id));
        }
        if size > self.limits.max_region_size {
            warn!("refusing to allocate {name}: {size} bytes is too large");
            return Err(AllocationError::TooLarge {
                name,
                size,
                max: self.limits.max_region_size,
            });
        }
        if self.regions.len() >= self.limits.max_regions {
            warn!("refusing to allocate {name}: region table is full");
            return Err(AllocationError::TooManyRegions {
                name,
                max: self.limits.max_regions,
            });
        }

        debug!("allocated region {name} ({id:?}): {size} bytes");
        self.regions.push(MemoryRegion {
            id,
            name,
            data: vec![0; size].into_boxed_slice(),
        });
        Ok(())
    }

    /// Release a region. Freeing an absent region does nothing.
    pub fn free(&mut self, id: RegionId) {
        if let Some(pos) = self.regions.iter().position(|r| r.id == id) {
            let region = self.regions.swap_remove(pos);
            debug!("freed region {} ({id:?})", region.name);
        }
    }

    pub fn contains(&self, id: RegionId) -> bool {
        self.regions.iter().any(|r| r.id == id)
    }

    pub fn get_base(&self, id: RegionId) -> Option<&[u8]> {
        self.find(id).map(|r| &r.data[..])
    }

    pub fn get_base_mut(&mut self, id: RegionId) -> Option<&mut [u8]> {
        self.regions
            .iter_mut()
            .find(|r| r.id == id)
            .map(|r| &mut r.data[..])
    }

    pub fn get_size(&self, id: RegionId) -> Option<usize> {
        self.find(id).map(|r| r.data.len())
    }

    pub fn name(&self, id: RegionId) -> Option<&'static str> {
        self.find(id).map(|r| r.name)
    }

    /// Zero-fill a region in place. Returns `false` if it is not allocated.
    pub fn clear(&mut self, id: RegionId) -> bool {
        match self.get_base_mut(id) {
            Some(data) => {
                data.fill(0);
                true
            }
            None => false,
        }
    }

    /// Copy `bytes` into a region at `offset`.
    ///
    /// Either the whole slice lands or the region is left untouched.
    pub fn load(&mut self, id: RegionId, offset: usize, bytes: &[u8]) -> bool {
        let Some(data) = self.get_base_mut(id) else {
            return false;
        };
        let Some(end) = offset.checked_add(bytes.len()) else {
            return false;
        };
        match data.get_mut(offset..end) {
            Some(dst) => {
                dst.copy_from_slice(bytes);
                true
            }
            None => false,
        }
    }

    pub fn live_count(&self) -> usize {
        self.regions.len()
    }

    pub fn total_bytes(&self) -> usize {
        self.regions.iter().map(|r| r.data.len()).sum()
    }

    pub fn regions(&self) -> impl Iterator<Item = RegionInfo> + '_ {
        self.regions.iter().map(|r| RegionInfo {
            id: r.id,
            name: r.name,
            size: r.data.len(),
        })
    }

    fn find(&self, id: RegionId) -> Option<&MemoryRegion> {
        self.regions.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_zero_fills_and_reports_size() {
        let mut alloc = RegionAllocator::new();
        alloc.allocate(RegionId::WorkRam, 0x800, "RAM").unwrap();
        assert_eq!(alloc.get_size(RegionId::WorkRam), Some(0x800));
        assert!(alloc.get_base(RegionId::WorkRam).unwrap().iter().all(|&b| b == 0));
        assert_eq!(alloc.name(RegionId::WorkRam), Some("RAM"));
    }

    #[test]
    fn missing_region_has_no_base_or_size() {
        let alloc = RegionAllocator::new();
        assert!(alloc.get_base(RegionId::VideoRam).is_none());
        assert!(alloc.get_size(RegionId::VideoRam).is_none());
    }

    #[test]
    fn oversized_region_is_rejected() {
        let mut alloc = RegionAllocator::new();
        let err = alloc
            .allocate(RegionId::ProgramRom, MAX_REGION_SIZE + 1, "huge")
            .unwrap_err();
        assert!(matches!(err, AllocationError::TooLarge { .. }));
        assert_eq!(alloc.live_count(), 0);
    }

    #[test]
    fn region_table_limit_is_enforced() {
        let mut alloc = RegionAllocator::with_limits(RegionLimits {
            max_regions: 2,
            ..RegionLimits::default()
        });
        alloc.allocate(RegionId::VideoRam, 16, "a").unwrap();
        alloc.allocate(RegionId::ColorRam, 16, "b").unwrap();
        let err = alloc.allocate(RegionId::WorkRam, 16, "c").unwrap_err();
        assert_eq!(err, AllocationError::TooManyRegions { name: "c", max: 2 });
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let mut alloc = RegionAllocator::new();
        alloc.allocate(RegionId::VideoRam, 16, "VRAM").unwrap();
        assert_eq!(
            alloc.allocate(RegionId::VideoRam, 16, "VRAM again"),
            Err(AllocationError::AlreadyAllocated(RegionId::VideoRam))
        );
    }

    #[test]
    fn double_free_is_a_no_op() {
        let mut alloc = RegionAllocator::new();
        alloc.allocate(RegionId::ColorRam, 32, "CRAM").unwrap();
        alloc.free(RegionId::ColorRam);
        alloc.free(RegionId::ColorRam);
        assert_eq!(alloc.live_count(), 0);
        // the id is reusable once freed
        alloc.allocate(RegionId::ColorRam, 32, "CRAM").unwrap();
    }

    #[test]
    fn load_is_all_or_nothing() {
        let mut alloc = RegionAllocator::new();
        alloc.allocate(RegionId::ProgramRom, 8, "ROM").unwrap();
        assert!(!alloc.load(RegionId::ProgramRom, 4, &[1, 2, 3, 4, 5]));
        assert_eq!(alloc.get_base(RegionId::ProgramRom).unwrap(), &[0; 8]);
        assert!(alloc.load(RegionId::ProgramRom, 4, &[1, 2, 3, 4]));
        assert_eq!(
            alloc.get_base(RegionId::ProgramRom).unwrap(),
            &[0, 0, 0, 0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn total_bytes_tracks_live_regions() {
        let mut alloc = RegionAllocator::new();
        alloc.allocate(RegionId::VideoRam, 0x400, "VRAM").unwrap();
        alloc.allocate(RegionId::ColorRam, 0x400, "CRAM").unwrap();
        assert_eq!(alloc.total_bytes(), 0x800);
        alloc.free(RegionId::VideoRam);
        assert_eq!(alloc.total_bytes(), 0x400);
    }
}
