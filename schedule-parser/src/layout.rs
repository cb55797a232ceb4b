use crate::schema::Weekday;
use std::ops::RangeInclusive;

/// Positions of the schedule parts in the sheet template.
///
/// All indices are zero-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    /// Rows scanned for the academic year, semester and other free-text fields.
    pub metadata_rows: RangeInclusive<u32>,

    /// First column scanned for metadata.
    pub metadata_start_column: u32,

    /// Row holding the group names.
    pub groups_row: u32,

    /// First column scanned for group names.
    pub groups_start_column: u32,

    /// Number of columns owned by one group: subject, type, teacher and room.
    pub block_width: u32,

    /// Column with the day headers. The time column is the next one.
    pub day_column: u32,

    /// Maximum number of pairs on a regular day.
    pub max_pairs: u8,

    /// Maximum number of pairs on Saturday.
    pub saturday_max_pairs: u8,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            metadata_rows: 16..=24,
            metadata_start_column: 0,
            groups_row: 23,
            groups_start_column: 5,
            block_width: 4,
            day_column: 0,
            max_pairs: 7,
            saturday_max_pairs: 6,
        }
    }
}

impl SheetLayout {
    pub fn time_column(&self) -> u32 {
        self.day_column + 1
    }

    /// Bound of the pair counter for the given day.
    pub fn max_pairs_for(&self, weekday: Weekday) -> u8 {
        match weekday {
            Weekday::Saturday => self.saturday_max_pairs,
            _ => self.max_pairs,
        }
    }

    /// Row the walker starts from.
    pub fn data_start_row(&self) -> u32 {
        self.groups_row + 1
    }
}
