use crate::errors::{EngineError, Result};
use crate::numerals::numeral_grid;
use serde::{Deserialize, Serialize};
use station_types::{DisplayKey, Rgb};
use std::collections::HashMap;

pub const GRID_SIZE: usize = 8;

/// 8x8 on/off matrix shown on a station's LED panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BitGrid([[bool; GRID_SIZE]; GRID_SIZE]);

impl BitGrid {
    pub fn new(cells: [[bool; GRID_SIZE]; GRID_SIZE]) -> Self {
        Self(cells)
    }

    /// Build from 0/1 cells as entered on a dashboard; any non-zero cell is on
    pub fn from_bits(bits: [[u8; GRID_SIZE]; GRID_SIZE]) -> Self {
        Self(bits.map(|row| row.map(|cell| cell != 0)))
    }

    /// Inverse of `encode_rows`
    pub fn from_rows(rows: [u8; GRID_SIZE]) -> Self {
        Self(rows.map(|row| std::array::from_fn(|col| row & (0x80 >> col) != 0)))
    }

    /// Each row read as a binary number, left column is the most significant bit
    pub fn encode_rows(&self) -> [u8; GRID_SIZE] {
        self.0.map(|row| {
            row.iter()
                .fold(0u8, |acc, &cell| (acc << 1) | u8::from(cell))
        })
    }

    pub fn row(&self, row: usize) -> [bool; GRID_SIZE] {
        self.0[row]
    }

    pub fn cell(&self, row: usize, col: usize) -> bool {
        self.0[row][col]
    }

    pub fn toggle(&mut self, row: usize, col: usize) -> Result<()> {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return Err(EngineError::CellOutOfRange { row, col });
        }
        self.0[row][col] = !self.0[row][col];
        Ok(())
    }
}

/// Color and bitmap for one display key, with the row encoding kept in step with the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySetting {
    color: Rgb,
    grid: BitGrid,
    encoded_rows: [u8; GRID_SIZE],
}

impl DisplaySetting {
    pub fn new(color: Rgb, grid: BitGrid) -> Self {
        Self {
            color,
            encoded_rows: grid.encode_rows(),
            grid,
        }
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn grid(&self) -> &BitGrid {
        &self.grid
    }

    pub fn encoded_rows(&self) -> [u8; GRID_SIZE] {
        self.encoded_rows
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn set_grid(&mut self, grid: BitGrid) {
        self.grid = grid;
        self.encoded_rows = grid.encode_rows();
    }

    pub fn toggle_cell(&mut self, row: usize, col: usize) -> Result<()> {
        self.grid.toggle(row, col)?;
        self.encoded_rows = self.grid.encode_rows();
        Ok(())
    }
}

pub const DEFAULT_COLOR: Rgb = Rgb::new(200, 150, 35);

/// Plus sign shown by any key that was never configured
const DEFAULT_ROWS: [u8; GRID_SIZE] = [0x18, 0x18, 0x18, 0xFF, 0xFF, 0x18, 0x18, 0x18];

/// Display settings by key. Unconfigured keys read as the default setting;
/// digit keys carry the fixed numeral bitmaps and only their color can change.
#[derive(Debug, Clone)]
pub struct DisplaySettingTable {
    default: DisplaySetting,
    settings: HashMap<DisplayKey, DisplaySetting>,
}

impl Default for DisplaySettingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySettingTable {
    pub fn new() -> Self {
        let default = DisplaySetting::new(DEFAULT_COLOR, BitGrid::from_rows(DEFAULT_ROWS));
        let settings = (0..10u8)
            .map(|digit| {
                (
                    DisplayKey::Digit(digit),
                    DisplaySetting::new(DEFAULT_COLOR, numeral_grid(digit)),
                )
            })
            .collect();

        Self { default, settings }
    }

    pub fn get(&self, key: DisplayKey) -> &DisplaySetting {
        if key == DisplayKey::Default {
            return &self.default;
        }
        self.settings.get(&key).unwrap_or(&self.default)
    }

    pub fn numeral(&self, digit: u8) -> &DisplaySetting {
        self.get(DisplayKey::Digit(digit % 10))
    }

    pub fn set_color(&mut self, key: DisplayKey, color: Rgb) {
        self.entry(key).set_color(color);
    }

    pub fn set_grid(&mut self, key: DisplayKey, grid: BitGrid) -> Result<()> {
        if key.is_digit() {
            return Err(EngineError::ReadOnlyGrid(key));
        }
        self.entry(key).set_grid(grid);
        Ok(())
    }

    pub fn toggle_cell(&mut self, key: DisplayKey, row: usize, col: usize) -> Result<()> {
        if key.is_digit() {
            return Err(EngineError::ReadOnlyGrid(key));
        }
        self.entry(key).toggle_cell(row, col)
    }

    /// Editing an unconfigured key starts from a copy of the default
    fn entry(&mut self, key: DisplayKey) -> &mut DisplaySetting {
        if key == DisplayKey::Default {
            return &mut self.default;
        }
        let default = &self.default;
        self.settings.entry(key).or_insert_with(|| default.clone())
    }
}
