/// The MPU can address 256 bytes of memory.
pub const RAM_SIZE: usize = 256;

/// Byte-addressable memory. Addresses are `u8`, so an out-of-range access
/// cannot be expressed; unwritten locations read as zero.
#[derive(Clone, Debug)]
pub struct Ram {
    cells: [u8; RAM_SIZE],
}

impl Ram {
    pub fn new() -> Self {
        Ram {
            cells: [0; RAM_SIZE],
        }
    }

    pub fn read(&self, address: u8) -> u8 {
        self.cells[address as usize]
    }

    pub fn write(&mut self, address: u8, value: u8) {
        self.cells[address as usize] = value;
    }

    /// Overwrite the whole address space, zero-padding or truncating the
    /// input to exactly [`RAM_SIZE`] bytes.
    pub fn load(&mut self, bytes: &[u8]) {
        for (i, cell) in self.cells.iter_mut().enumerate() {
            *cell = bytes.get(i).copied().unwrap_or(0);
        }
    }

    /// Memory as a 16×16 grid, row-major, for display.
    pub fn grid(&self) -> [[u8; 16]; 16] {
        let mut grid = [[0; 16]; 16];
        for row in 0..16 {
            for col in 0..16 {
                grid[row][col] = self.cells[row * 16 + col];
            }
        }
        grid
    }
}

impl Default for Ram {
    fn default() -> Self {
        Ram::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unwritten_addresses_read_zero() {
        let ram = Ram::new();
        for addr in 0..=u8::MAX {
            assert_eq!(ram.read(addr), 0);
        }
    }

    #[test]
    fn write_then_read_round_trips_every_cell() {
        let mut ram = Ram::new();
        for addr in 0..=u8::MAX {
            ram.write(addr, addr.wrapping_mul(7));
        }
        for addr in 0..=u8::MAX {
            assert_eq!(ram.read(addr), addr.wrapping_mul(7));
        }
    }

    #[test]
    fn load_truncates_and_zero_pads() {
        let mut ram = Ram::new();
        ram.write(10, 0xAA);
        ram.load(&[1, 2, 3]);
        assert_eq!(ram.read(0), 1);
        assert_eq!(ram.read(2), 3);
        // Previously written cell past the program is zeroed.
        assert_eq!(ram.read(10), 0);

        let long = [0xEEu8; 300];
        ram.load(&long);
        assert_eq!(ram.read(255), 0xEE);
    }

    #[test]
    fn grid_is_row_major() {
        let mut ram = Ram::new();
        ram.write(0x12, 0xBE);
        let grid = ram.grid();
        assert_eq!(grid[1][2], 0xBE);
    }
}
