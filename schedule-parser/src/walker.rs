use crate::layout::SheetLayout;
use crate::schema::Weekday;
use crate::schema::internal::{DayCellInfo, PairRowInfo};
use crate::worksheet::WorkSheet;
use regex::Regex;
use std::sync::LazyLock;

/// Position of the walker in the day column.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum DayState {
    /// Before the first day header, or after the last pair of a day.
    NoCurrentDay,

    /// Inside a day, `pair` slots of it already passed.
    InDay { day: DayCellInfo, pair: u8 },
}

/// Reading "ЧЕТВЕРГ 13.11" into the day of the week, day and month.
pub(crate) fn parse_day_header(text: &str) -> Option<(Weekday, u32, u32)> {
    static DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)(ПОНЕДЕЛЬНИК|ВТОРНИК|СРЕДА|ЧЕТВЕРГ|ПЯТНИЦА|СУББОТА)\s+(\d{1,2})\.(\d{1,2})")
            .unwrap()
    });

    let captures = DAY_RE.captures(text)?;

    let weekday = Weekday::from_label(&captures[1])?;
    let day = captures[2].parse::<u32>().ok()?;
    let month = captures[3].parse::<u32>().ok()?;

    Some((weekday, day, month))
}

/// Checking that the cell holds a lesson time range like "8.30-10.00".
pub(crate) fn is_time_range(text: &str) -> bool {
    static TIME_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"^\d+\.\d+\s*[-–]\s*\d+\.\d+").unwrap());

    TIME_RE.is_match(text)
}

/// Walks the rows below the group header and yields the lesson rows of every day.
///
/// Day and time cells are read without merge resolution, so a label merged over
/// several rows is seen once, at its top row.
pub(crate) struct DayWalker<'a> {
    worksheet: &'a WorkSheet,
    layout: &'a SheetLayout,
    state: DayState,
    row: u32,
    last_row: u32,
}

impl<'a> DayWalker<'a> {
    pub fn new(worksheet: &'a WorkSheet, layout: &'a SheetLayout) -> Self {
        let (row, last_row) = match worksheet.bounds() {
            Some((last_row, _)) => (layout.data_start_row(), last_row),
            // nothing to walk
            None => (1, 0),
        };

        Self {
            worksheet,
            layout,
            state: DayState::NoCurrentDay,
            row,
            last_row,
        }
    }

    pub fn state(&self) -> &DayState {
        &self.state
    }

    /// Processing a single row.
    ///
    /// Returns the row as a lesson slot when the current day is open and the time
    /// cell holds a time range. The pair counter is advanced after the slot is
    /// taken, and the day is closed once the counter reaches the day's bound.
    pub fn step(&mut self, row: u32) -> Option<PairRowInfo> {
        if let Some((weekday, day, month)) = self
            .worksheet
            .get_string_from_cell(row, self.layout.day_column)
            .and_then(|text| parse_day_header(&text))
        {
            self.state = DayState::InDay {
                day: DayCellInfo {
                    row,
                    weekday,
                    day,
                    month,
                },
                pair: 0,
            };

            return None;
        }

        let DayState::InDay { day, pair } = &mut self.state else {
            return None;
        };

        let time = self
            .worksheet
            .get_string_from_cell(row, self.layout.time_column())
            .filter(|text| is_time_range(text))?;

        let slot = PairRowInfo {
            row,
            time,
            day: day.clone(),
            number: *pair,
        };

        *pair += 1;

        if *pair >= self.layout.max_pairs_for(day.weekday) {
            self.state = DayState::NoCurrentDay;
        }

        Some(slot)
    }
}

impl Iterator for DayWalker<'_> {
    type Item = PairRowInfo;

    fn next(&mut self) -> Option<Self::Item> {
        while self.row <= self.last_row {
            let row = self.row;
            self.row += 1;

            if let Some(slot) = self.step(row) {
                return Some(slot);
            }
        }

        None
    }
}
