use regex::Regex;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::LazyLock;

/// First worksheet of the document with its merged regions.
#[derive(Clone, Debug)]
pub struct WorkSheet {
    pub data: calamine::Range<calamine::Data>,
    pub merges: Vec<calamine::Dimensions>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellPos {
    pub row: u32,
    pub column: u32,
}

fn format_column_index(index: u32) -> String {
    let quotient = index / 26;

    let char = char::from((65 + (index % 26)) as u8);

    if quotient > 0 {
        return format!("{}{}", format_column_index(quotient - 1), char);
    }

    char.to_string()
}

impl Display for CellPos {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "column {}, row {}",
            format_column_index(self.column),
            self.row + 1,
        ))
    }
}

impl CellPos {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl Deref for WorkSheet {
    type Target = calamine::Range<calamine::Data>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

fn contains(merge: &calamine::Dimensions, row: u32, column: u32) -> bool {
    (merge.start.0..=merge.end.0).contains(&row) && (merge.start.1..=merge.end.1).contains(&column)
}

impl WorkSheet {
    pub fn new(
        data: calamine::Range<calamine::Data>,
        merges: Vec<calamine::Dimensions>,
    ) -> Self {
        Self { data, merges }
    }

    /// Last row and column of the sheet, if it has any cells.
    pub fn bounds(&self) -> Option<(u32, u32)> {
        self.data.end()
    }

    /// Text of the cell with line breaks kept. Cells outside the sheet read as empty.
    pub fn get_raw_string_from_cell(&self, row: u32, column: u32) -> Option<String> {
        let cell_data = self.data.get_value((row, column))?.to_string();
        let trimmed = cell_data.trim();

        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Getting a line from the required cell.
    pub fn get_string_from_cell(&self, row: u32, column: u32) -> Option<String> {
        static SP_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

        let cell_data = self.get_raw_string_from_cell(row, column)?;

        Some(SP_RE.replace_all(&cell_data, " ").to_string())
    }

    /// Value of the cell as seen by a reader of the sheet.
    ///
    /// A cell covered by a merged region shows the value of the region anchor.
    pub fn get_resolved_string_from_cell(&self, row: u32, column: u32) -> Option<String> {
        match self.get_merge_at(row, column) {
            Some(merge) => self.get_string_from_cell(merge.start.0, merge.start.1),
            None => self.get_string_from_cell(row, column),
        }
    }

    /// Merged region covering the cell.
    pub fn get_merge_at(&self, row: u32, column: u32) -> Option<&calamine::Dimensions> {
        self.merges.iter().find(|merge| contains(merge, row, column))
    }
}
