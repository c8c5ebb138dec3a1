use pacemu_core::Error;
use pacemu_core::address_space::OPEN_BUS;
use pacemu_core::driver::{Driver, REG_DSW1, REG_DSW2, REG_FLIP_SCREEN, REG_IN0_IRQ_ENABLE, REG_IN1};
use pacemu_core::error::AllocationError;
use pacemu_core::region::{RegionId, RegionLimits};

fn online() -> Driver {
    let mut driver = Driver::new();
    driver.init().unwrap();
    driver
}

#[test]
fn irq_enable_and_flip_latch_bit_zero_only() {
    let mut driver = online();
    for value in 0..=u8::MAX {
        driver.write_byte(REG_IN0_IRQ_ENABLE, value);
        assert_eq!(driver.interrupt_enabled(), value & 1 != 0);
        driver.write_byte(REG_FLIP_SCREEN, value);
        assert_eq!(driver.flip_screen(), value & 1 != 0);
    }
}

#[test]
fn irq_enable_write_does_not_disturb_in0() {
    let mut driver = online();
    driver.update_input(0xA5, 0x5A);
    driver.write_byte(REG_IN0_IRQ_ENABLE, 0x01);
    assert_eq!(driver.read_byte(REG_IN0_IRQ_ENABLE), 0xA5);
    assert_eq!(driver.read_byte(REG_IN1), 0x5A);
}

#[test]
fn dip_switches_are_readable() {
    let mut driver = online();
    driver.set_dip_switches(0xC9, 0x30);
    assert_eq!(driver.read_byte(REG_DSW1), 0xC9);
    assert_eq!(driver.read_byte(REG_DSW2), 0x30);
}

#[test]
fn reset_clears_ram_and_latches_but_not_rom() {
    let mut driver = online();
    let mut rom = vec![0u8; 0x4000];
    rom[0] = 0xF3;
    rom[0x3FFF] = 0xC9;
    driver.load_program_rom(&rom).unwrap();

    driver.write_byte(0x4000, 0x11);
    driver.write_byte(0x4400, 0x22);
    driver.write_byte(0x4FFF, 0x33);
    driver.write_byte(REG_IN0_IRQ_ENABLE, 1);
    driver.write_byte(REG_FLIP_SCREEN, 1);
    driver.write_byte(0x5060, 0x44);
    driver.update_input(0xFE, 0xFD);

    driver.reset();

    assert_eq!(driver.read_byte(0x4000), 0);
    assert_eq!(driver.read_byte(0x4400), 0);
    assert_eq!(driver.read_byte(0x4FFF), 0);
    assert!(!driver.interrupt_enabled());
    assert!(!driver.flip_screen());
    assert_eq!(driver.sprite_coords(), &[0; 16]);
    assert_eq!(driver.frame_count(), 0);
    assert_eq!(driver.read_byte(0x0000), 0xF3);
    assert_eq!(driver.read_byte(0x3FFF), 0xC9);
    // input ports belong to the host, not the board
    assert_eq!(driver.read_byte(REG_IN0_IRQ_ENABLE), 0xFE);
    // no reallocation
    assert_eq!(driver.stats().regions, 4);
}

#[test]
fn shutdown_is_idempotent() {
    let mut driver = online();
    driver.shutdown();
    driver.shutdown();
    let stats = driver.stats();
    assert!(!stats.online);
    assert_eq!(stats.regions, 0);
    assert_eq!(stats.mapped_pages, 0);
    assert_eq!(driver.read_byte(0x4800), OPEN_BUS);
}

#[test]
fn failed_init_rolls_back_completely() {
    let mut driver = Driver::with_limits(RegionLimits {
        max_regions: 2,
        ..RegionLimits::default()
    });
    let err = driver.init().unwrap_err();
    assert!(matches!(
        err,
        Error::Allocation(AllocationError::TooManyRegions { max: 2, .. })
    ));
    let stats = driver.stats();
    assert!(!stats.online);
    assert_eq!(stats.regions, 0);
    assert_eq!(stats.mapped_pages, 0);
    assert_eq!(driver.read_byte(0x0000), OPEN_BUS);
}

#[test]
fn oversized_limit_failure_rolls_back() {
    let mut driver = Driver::with_limits(RegionLimits {
        max_region_size: 0x800,
        ..RegionLimits::default()
    });
    // the 16 KiB ROM is allocated first and is already too large
    assert!(matches!(
        driver.init(),
        Err(Error::Allocation(AllocationError::TooLarge { size: 0x4000, .. }))
    ));
    assert_eq!(driver.stats().regions, 0);
}

#[test]
fn reinit_after_failure_matches_a_first_init() {
    let fresh = online();
    let mut retried = Driver::with_limits(RegionLimits {
        max_regions: 3,
        ..RegionLimits::default()
    });
    assert!(retried.init().is_err());
    retried.set_limits(RegionLimits::default());
    retried.init().unwrap();

    assert_eq!(fresh.stats(), retried.stats());
    for address in (0x0000..=0xFFFFu16).step_by(0x3F) {
        assert_eq!(
            fresh.read_byte(address),
            retried.read_byte(address),
            "address {address:04X}"
        );
    }
    for id in [
        RegionId::ProgramRom,
        RegionId::VideoRam,
        RegionId::ColorRam,
        RegionId::WorkRam,
    ] {
        assert_eq!(
            fresh.memory().regions().get_size(id),
            retried.memory().regions().get_size(id)
        );
    }
}

#[test]
fn driver_is_a_memory_bus() {
    use pacemu_core::cpu::MemoryBus;

    let mut driver = online();
    let bus: &mut dyn MemoryBus = &mut driver;
    bus.write_byte(0x4C00, 0x77);
    assert_eq!(bus.read_byte(0x4C00), 0x77);
    bus.write_byte(0x0000, 0x77);
    assert_eq!(bus.read_byte(0x0000), 0x00);
}
