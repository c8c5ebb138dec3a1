use pacemu_core::address_space::{OPEN_BUS, PAGE_SIZE};
use pacemu_core::driver::{Driver, Window, window_for, windows};
use pacemu_core::memory::Memory;
use pacemu_core::region::RegionId;

#[test]
fn every_address_falls_in_at_most_one_window() {
    for address in 0..=u16::MAX {
        let hits = windows()
            .iter()
            .filter(|(range, _)| range.contains(&address))
            .count();
        let expected = if address <= 0x50FF { 1 } else { 0 };
        assert_eq!(hits, expected, "address {address:04X}");
    }
}

#[test]
fn window_boundaries_match_the_board() {
    let cases = [
        (0x0000, Some(Window::Rom)),
        (0x3FFF, Some(Window::Rom)),
        (0x4000, Some(Window::VideoRam)),
        (0x43FF, Some(Window::VideoRam)),
        (0x4400, Some(Window::ColorRam)),
        (0x47FF, Some(Window::ColorRam)),
        (0x4800, Some(Window::WorkRam)),
        (0x4FFF, Some(Window::WorkRam)),
        (0x5000, Some(Window::Io)),
        (0x50FF, Some(Window::Io)),
        (0x5100, None),
        (0xFFFF, None),
    ];
    for (address, window) in cases {
        assert_eq!(window_for(address), window, "address {address:04X}");
    }
}

#[test]
fn unmapped_space_reads_open_bus_and_ignores_writes() {
    let mut driver = Driver::new();
    driver.init().unwrap();
    for address in (0x5100..=0xFFFFu16).step_by(0x1F) {
        driver.write_byte(address, 0x00);
        assert_eq!(driver.read_byte(address), OPEN_BUS);
    }
}

#[test]
fn ram_windows_round_trip_at_their_edges() {
    let mut driver = Driver::new();
    driver.init().unwrap();
    for (i, address) in [0x4000u16, 0x43FF, 0x4400, 0x47FF, 0x4800, 0x4FFF]
        .into_iter()
        .enumerate()
    {
        driver.write_byte(address, 0x10 + i as u8);
        assert_eq!(driver.read_byte(address), 0x10 + i as u8);
    }
}

#[test]
fn rom_ignores_every_write() {
    let mut driver = Driver::new();
    driver.init().unwrap();
    let image: Vec<u8> = (0..0x4000).map(|i| (i * 7) as u8).collect();
    driver.load_program_rom(&image).unwrap();

    for address in (0x0000..=0x3FFFu16).step_by(0x7) {
        driver.write_byte(address, !image[address as usize]);
    }
    for address in 0x0000..=0x3FFFu16 {
        assert_eq!(driver.read_byte(address), image[address as usize]);
    }
}

#[test]
fn memory_pages_resolve_independently() {
    let mut mem = Memory::new();
    mem.regions_mut()
        .allocate(RegionId::WorkRam, 2 * PAGE_SIZE, "RAM")
        .unwrap();
    mem.map_range(0x8000, 0x81FF, RegionId::WorkRam, false)
        .unwrap();

    mem.write_byte(0x80FF, 0x01);
    mem.write_byte(0x8100, 0x02);
    let ram = mem.regions().get_base(RegionId::WorkRam).unwrap();
    assert_eq!(ram[0xFF], 0x01);
    assert_eq!(ram[0x100], 0x02);
    assert_eq!(mem.read_byte(0x8200), OPEN_BUS);
}
