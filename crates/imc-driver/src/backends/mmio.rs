//! Memory-mapped I/O backend for the IMC peripheral.
//!
//! Maps the peripheral aperture from a device node (`/dev/mem` at the SoC
//! base address, or a UIO node exposing the peripheral) and implements
//! [`CrossbarBackend`] with volatile 32-bit register access. The register
//! layout lives in [`imc_chip::regs`]; this module never hardcodes an
//! offset of its own.

// MMIO registers are naturally aligned by hardware, so pointer casts are safe
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_ptr_alignment)]
#![allow(clippy::ptr_as_ptr)]

use crate::backend::{BackendType, CrossbarBackend};
use crate::error::{ImcError, Result};
use imc_chip::regs;
use imc_chip::tile::{pack_input, SETTLE_CYCLES, TILE_DIM};
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::OpenOptions;
use std::os::unix::io::AsFd;
use std::path::Path;

/// Size of the mapped peripheral aperture. One page covers the whole
/// register file (highest offset is `IMC_RESULT_BASE + 7·4 = 0x42C`).
const APERTURE_SIZE: usize = 0x1000;

/// Mapped peripheral aperture for MMIO access.
pub struct MappedRegion {
    /// Memory-mapped pointer.
    ptr: *mut u8,
    /// Size of the mapping.
    size: usize,
}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRegion")
            .field("ptr", &format_args!("{:p}", self.ptr))
            .field("size", &self.size)
            .finish()
    }
}

// SAFETY: Send - MappedRegion owns the mapped memory exclusively. Moving between
// threads doesn't invalidate the mapping (mmap'd memory is process-wide).
unsafe impl Send for MappedRegion {}

// SAFETY: Sync - Read operations use &self and are bounds-checked; write operations
// require &mut self (exclusive access). Volatile MMIO reads are idempotent;
// concurrent reads safe.
unsafe impl Sync for MappedRegion {}

impl MappedRegion {
    /// Map the peripheral aperture from a device node.
    ///
    /// # Errors
    ///
    /// Returns an error if the node cannot be opened or the mapping fails.
    pub fn map(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ImcError::device_not_found(path));
        }
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        // SAFETY: mmap necessary for MMIO - maps the peripheral aperture into the
        // process address space. Invariants: (1) file fd valid for the duration of
        // the call; (2) APERTURE_SIZE is page-aligned; (3) ptr valid for size bytes
        // or Err. The mapping outlives the fd; the kernel keeps it alive.
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                APERTURE_SIZE,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                0,
            )
            .map_err(|e| ImcError::map_failed(format!("mmap {}: {e}", path.display())))?
        };

        tracing::info!(
            "Mapped IMC aperture {} at {:p}, size={:#x}",
            path.display(),
            ptr,
            APERTURE_SIZE
        );

        Ok(Self {
            ptr: ptr.cast(),
            size: APERTURE_SIZE,
        })
    }

    /// Read a 32-bit register.
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the mapped aperture size.
    pub fn read32(&self, offset: usize) -> u32 {
        assert!(offset + 4 <= self.size, "Register offset out of bounds");
        // SAFETY: read_volatile necessary for MMIO - hardware can change the value.
        // ptr is valid for self.size bytes (from mmap in map()), offset is bounds
        // checked, and registers are word aligned by the decoder.
        unsafe { std::ptr::read_volatile(self.ptr.add(offset).cast::<u32>()) }
    }

    /// Write a 32-bit register.
    ///
    /// # Panics
    ///
    /// Panics if `offset + 4` exceeds the mapped aperture size.
    pub fn write32(&mut self, offset: usize, value: u32) {
        assert!(offset + 4 <= self.size, "Register offset out of bounds");
        // SAFETY: write_volatile necessary for MMIO - triggers hardware side effects.
        // ptr valid for self.size bytes, offset bounds checked, word aligned.
        unsafe {
            std::ptr::write_volatile(self.ptr.add(offset).cast::<u32>(), value);
        }
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        // SAFETY: ptr/size were returned by mmap in map(); Drop runs at most once
        // and no references outlive self.
        unsafe {
            let _ = munmap(self.ptr.cast(), self.size);
        }
        tracing::debug!("Unmapped IMC aperture");
    }
}

/// Extends the 32-bit hardware cycle counter to a monotonic 64-bit value.
///
/// The counter wraps roughly every 4.3 seconds at 1 GHz; a raw sample
/// lower than the previous one means exactly one wrap, provided samples
/// arrive at least once per wrap period. The harness samples around every
/// inference, far inside that bound.
#[derive(Debug, Default)]
struct WideCounter {
    base: u64,
    last_raw: u32,
}

impl WideCounter {
    fn extend(&mut self, raw: u32) -> u64 {
        if raw < self.last_raw {
            self.base += 1 << 32;
        }
        self.last_raw = raw;
        self.base + u64::from(raw)
    }
}

/// Crossbar backend over the real memory-mapped peripheral.
#[derive(Debug)]
pub struct MmioBackend {
    region: MappedRegion,
    counter: WideCounter,
}

impl MmioBackend {
    /// Map the peripheral aperture and wrap it as a backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the aperture cannot be opened or mapped.
    pub fn map(path: &Path) -> Result<Self> {
        Ok(Self {
            region: MappedRegion::map(path)?,
            counter: WideCounter::default(),
        })
    }
}

impl CrossbarBackend for MmioBackend {
    fn program_cell(&mut self, index: u8, value: u8) {
        // Two-register handshake: the PROG_ADDR write commits the cell.
        self.region.write32(regs::IMC_PROG_DATA, u32::from(value));
        self.region.write32(regs::IMC_PROG_ADDR, u32::from(index));
    }

    fn set_input(&mut self, v: [u8; TILE_DIM]) {
        let (lo, hi) = pack_input(v);
        self.region.write32(regs::IMC_VIN_LO, lo);
        self.region.write32(regs::IMC_VIN_HI, hi);
    }

    fn wait_settle(&mut self) {
        // Bounded busy-wait: each counter read is one bus transaction, so
        // SETTLE_CYCLES reads cover the analog settle window.
        for _ in 0..SETTLE_CYCLES {
            let _ = self.region.read32(regs::CYCLE_COUNTER);
        }
    }

    fn read_row(&mut self, row: usize) -> u32 {
        assert!(row < TILE_DIM, "result port index out of bounds");
        self.region.read32(regs::result(row))
    }

    fn cycles(&mut self) -> u64 {
        let raw = self.region.read32(regs::CYCLE_COUNTER);
        self.counter.extend(raw)
    }

    fn advance(&mut self, _n: u64) {
        // The hardware counter free-runs; host instructions are already
        // accounted for in real time.
    }

    fn write_byte(&mut self, byte: u8) {
        self.region.write32(regs::UART_TX, u32::from(byte));
    }

    fn backend_type(&self) -> BackendType {
        BackendType::Mmio
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_counter_survives_32bit_wrap() {
        // Deltas across a wrap must stay monotonic after widening.
        let mut c = WideCounter::default();
        let t0 = c.extend(u32::MAX - 100);
        let t1 = c.extend(50); // wrapped
        assert_eq!(t1 - t0, 151);
        assert_eq!(t1, u64::from(u32::MAX) + 51);

        let t2 = c.extend(50_000);
        assert!(t2 > t1);
    }

    #[test]
    fn wide_counter_is_identity_before_first_wrap() {
        let mut c = WideCounter::default();
        assert_eq!(c.extend(0), 0);
        assert_eq!(c.extend(1234), 1234);
        assert_eq!(c.extend(1234), 1234);
    }

    #[test]
    fn missing_aperture_is_device_not_found() {
        let err = MmioBackend::map(Path::new("/nonexistent/imc0")).unwrap_err();
        assert!(matches!(err, ImcError::DeviceNotFound { .. }));
    }

    /// Requires a mapped IMC peripheral (e.g. UIO node from the FPGA build).
    #[test]
    #[ignore]
    fn hardware_roundtrip() {
        let mut b = MmioBackend::map(Path::new("/dev/uio0")).expect("map aperture");
        b.program_cell(0, 200);
        b.set_input([1, 0, 0, 0, 0, 0, 0, 0]);
        b.wait_settle();
        assert_eq!(b.read_row(0), 200);
    }
}
