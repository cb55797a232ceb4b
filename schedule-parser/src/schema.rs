use chrono::NaiveDate;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize, Serializer};
use serde_repr::{Deserialize_repr, Serialize_repr};
use std::sync::Arc;
use utoipa::ToSchema;

pub(crate) mod internal {
    use crate::schema::{SheetMetadata, Weekday};

    /// Data cell storing the group name.
    #[derive(Clone, Debug, PartialEq)]
    pub struct GroupCellInfo {
        /// Column index of the first cell of the group block.
        pub column: u32,

        /// Group name extracted from the cell.
        pub name: String,
    }

    /// Row storing the day header.
    #[derive(Clone, Debug, PartialEq)]
    pub struct DayCellInfo {
        /// Row index.
        pub row: u32,

        /// Day of the week.
        pub weekday: Weekday,

        /// Day of the month.
        pub day: u32,

        /// Month.
        pub month: u32,
    }

    /// Row accepted by the walker as a lesson slot.
    #[derive(Clone, Debug, PartialEq)]
    pub struct PairRowInfo {
        /// Row index.
        pub row: u32,

        /// Text of the time cell.
        pub time: String,

        /// The day this row belongs to.
        pub day: DayCellInfo,

        /// Index of the pair within the day.
        pub number: u8,
    }

    /// Everything the builder needs to know about the target group.
    pub struct GroupTarget<'a> {
        pub name: &'a str,
        pub column: u32,
        pub metadata: &'a SheetMetadata,
    }
}

/// Day of the week as written in the day column of the sheet.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Display, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Weekday {
    #[display("ПОНЕДЕЛЬНИК")]
    Monday,

    #[display("ВТОРНИК")]
    Tuesday,

    #[display("СРЕДА")]
    Wednesday,

    #[display("ЧЕТВЕРГ")]
    Thursday,

    #[display("ПЯТНИЦА")]
    Friday,

    #[display("СУББОТА")]
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 6] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    /// Label of the day as it appears in the sheet.
    pub fn label(&self) -> &'static str {
        match self {
            Weekday::Monday => "ПОНЕДЕЛЬНИК",
            Weekday::Tuesday => "ВТОРНИК",
            Weekday::Wednesday => "СРЕДА",
            Weekday::Thursday => "ЧЕТВЕРГ",
            Weekday::Friday => "ПЯТНИЦА",
            Weekday::Saturday => "СУББОТА",
        }
    }

    /// Case-insensitive lookup by label.
    pub fn from_label(text: &str) -> Option<Self> {
        let upper = text.trim().to_uppercase();

        Self::ALL.into_iter().find(|day| day.label() == upper)
    }
}

/// Type of lesson.
#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug, Display, Serialize_repr, Deserialize_repr, ToSchema)]
#[repr(u8)]
pub enum LessonType {
    /// Лекция.
    #[display("Лекция")]
    Lecture = 0,

    /// Практика.
    #[display("Практика")]
    Practice,

    /// Лабораторная работа.
    #[display("Лабораторная")]
    Lab,

    /// Семинар.
    #[display("Семинар")]
    Seminar,
}

/// Free-text information about the sheet found above the group header.
#[derive(Clone, Hash, PartialEq, Eq, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SheetMetadata {
    /// Academic year in form "2025-2026".
    #[schema(examples("2025-2026"))]
    pub academic_year: String,

    /// Semester label as written in the sheet.
    #[schema(examples("1 полугодие"))]
    pub semester: String,

    /// Specialty line, if present.
    pub specialty: Option<String>,

    /// Education form, if present.
    #[schema(examples("очная"))]
    pub education_form: Option<String>,

    /// Institution line, if present.
    pub institution: Option<String>,
}

/// Group found in the header row and the block of columns it owns.
#[derive(Clone, Hash, PartialEq, Eq, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupColumnMapping {
    /// Group name.
    #[schema(examples("ИСПк-104-52-00"))]
    pub name: String,

    /// Index of the subject column; type, teacher and room follow it.
    pub column: u32,

    /// Row of the header the group was found in.
    pub row: u32,

    /// Metadata of the sheet.
    pub metadata: SheetMetadata,
}

/// The same group name above two different blocks.
#[derive(Clone, Hash, PartialEq, Eq, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupConflict {
    pub name: String,

    /// Column that was kept (the leftmost one).
    pub kept_column: u32,

    /// Column that was ignored.
    pub ignored_column: u32,
}

/// Result of scanning the header row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupLayout {
    /// Groups in scan order.
    pub mappings: Vec<GroupColumnMapping>,

    /// Names met more than once at different columns.
    pub conflicts: Vec<GroupConflict>,
}

impl GroupLayout {
    /// Group names in scan order.
    pub fn names(&self) -> Vec<String> {
        self.mappings.iter().map(|m| m.name.clone()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&GroupColumnMapping> {
        self.mappings.iter().find(|m| m.name == name)
    }
}

/// Everything read from the sheet before looking at a particular group.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetSkeleton {
    pub metadata: SheetMetadata,
    pub groups: GroupLayout,
}

#[derive(Clone, Hash, PartialEq, Eq, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    /// Name of the subject.
    #[schema(examples("Математика"))]
    pub subject: String,

    /// Time of the pair as written in the sheet.
    #[schema(examples("8.30-10.00"))]
    pub time: String,

    /// Teacher, or "Не указан".
    pub teacher: String,

    /// Classroom, or "Не указана".
    pub classroom: String,

    /// Date.
    pub date: NaiveDate,

    /// Type.
    #[serde(rename = "type")]
    pub lesson_type: LessonType,

    /// Group the entry belongs to.
    pub group: String,

    /// Day of the week label.
    #[schema(examples("ЧЕТВЕРГ"))]
    pub day_of_week: String,

    /// Index of the pair within the day, starting from zero.
    pub pair_number: u8,
}

/// Outcome of an import as seen by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImportResult {
    pub success: bool,

    /// Parsed entries, empty on failure.
    pub data: Vec<ScheduleEntry>,

    /// Human readable error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// All groups found in the sheet.
    pub groups: Vec<String>,
}

impl ImportResult {
    /// Converts a typed parse outcome into the caller-facing value.
    ///
    /// `groups` is used on success; errors carrying their own list use that one.
    pub fn from_outcome(
        outcome: Result<Vec<ScheduleEntry>, ImportError>,
        groups: Vec<String>,
    ) -> Self {
        match outcome {
            Ok(data) => Self {
                success: true,
                data,
                error: None,
                groups,
            },
            Err(error) => Self {
                success: false,
                data: Vec::new(),
                error: Some(error.to_string()),
                groups: error.groups().map(<[String]>::to_vec).unwrap_or(groups),
            },
        }
    }
}

#[derive(Clone, Debug, Display, Error, ToSchema)]
#[display("row {row}, column {column}")]
pub struct ErrorCellPos {
    pub row: u32,
    pub column: u32,
}

#[derive(Clone, Debug, Display, Error, ToSchema)]
#[display("'{data}' at {pos}")]
pub struct ErrorCell {
    pub pos: ErrorCellPos,
    pub data: String,
}

impl ErrorCell {
    pub fn new(row: u32, column: u32, data: String) -> Self {
        Self {
            pos: ErrorCellPos { row, column },
            data,
        }
    }
}

/// Failure of a single row. The row is skipped, the parse goes on.
#[derive(Clone, Debug, Display, Error)]
pub enum RowError {
    /// Day and month of the day header do not form a date in the resolved year.
    #[display("Day {day}.{month} does not exist in year {year} (row {row}).")]
    InvalidDate {
        row: u32,
        day: u32,
        month: u32,
        year: i32,
    },

    /// Academic year of the sheet is not in "Y1-Y2" form.
    #[display("Unable to read year from academic year {_0}.")]
    BadAcademicYear(ErrorCell),
}

#[derive(Clone, Debug, Display, Error)]
pub enum ImportError {
    /// Errors related to reading the spreadsheet file.
    #[display("{_0}: Failed to read spreadsheet file.")]
    BadSpreadsheet(Arc<calamine::Error>),

    /// Not a single sheet was found.
    #[display("No work sheets found.")]
    NoWorkSheets,

    /// There are no data on the boundaries of the sheet.
    #[display("There is no data on work sheet boundaries.")]
    UnknownWorkSheetRange,

    /// Requested group is absent from the header row.
    #[display("{}", group_not_found_message(requested, groups))]
    GroupNotFound {
        requested: String,
        groups: Vec<String>,
    },

    /// Group is present, but not a single lesson was read for it.
    #[display("No lessons were found for group \"{group}\". Check the structure of the file.")]
    NoEntries { group: String, groups: Vec<String> },
}

impl ImportError {
    /// Groups discovered before the failure, if the sheet got that far.
    pub fn groups(&self) -> Option<&[String]> {
        match self {
            ImportError::GroupNotFound { groups, .. } | ImportError::NoEntries { groups, .. } => {
                Some(groups)
            }
            _ => None,
        }
    }
}

fn group_not_found_message(requested: &str, groups: &[String]) -> String {
    let mut message = format!("Group \"{}\" not found.", requested);

    if let Some(closest) = crate::groups::closest_groups(requested, groups, 1).first() {
        message.push_str(&format!(" Did you mean \"{}\"?", closest));
    }

    if groups.is_empty() {
        message.push_str(" No groups were found in the file.");
    } else {
        message.push_str(&format!(" Available groups: {}.", groups.join(", ")));
    }

    message
}

impl Serialize for ImportError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ImportError::BadSpreadsheet(_) => serializer.serialize_str("BAD_SPREADSHEET"),
            ImportError::NoWorkSheets => serializer.serialize_str("NO_WORK_SHEETS"),
            ImportError::UnknownWorkSheetRange => {
                serializer.serialize_str("UNKNOWN_WORK_SHEET_RANGE")
            }
            ImportError::GroupNotFound { .. } => serializer.serialize_str("GROUP_NOT_FOUND"),
            ImportError::NoEntries { .. } => serializer.serialize_str("NO_ENTRIES"),
        }
    }
}
