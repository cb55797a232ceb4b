use crate::builder::build_entry;
use crate::schema::internal::GroupTarget;
use crate::schema::{ImportError, ImportResult, ScheduleEntry, SheetSkeleton};
use crate::walker::DayWalker;
use calamine::{Reader, Sheets, open_workbook_auto_from_rs};
use chrono::{Local, NaiveDate};
use std::io::Cursor;
use std::sync::Arc;

pub mod builder;
pub mod groups;
pub mod layout;
pub mod metadata;
pub mod schema;
mod walker;
pub mod worksheet;

pub use crate::layout::SheetLayout;
pub use crate::worksheet::WorkSheet;

/// Reporting a problem that does not stop the parse.
pub(crate) fn report_warning(message: &str) {
    log::warn!("{}", message);

    #[cfg(not(debug_assertions))]
    sentry::capture_message(message, sentry::Level::Warning);
}

fn bad_spreadsheet(error: calamine::Error) -> ImportError {
    ImportError::BadSpreadsheet(Arc::new(error))
}

/// Reading the first worksheet and its merged regions from the buffer.
///
/// XLSX, XLS, XLSB and ODS documents are accepted. Merged regions are only
/// known for XLSX and XLS.
pub fn open_worksheet(buffer: &[u8]) -> Result<WorkSheet, ImportError> {
    let cursor = Cursor::new(buffer.to_vec());
    let mut workbook = open_workbook_auto_from_rs(cursor).map_err(bad_spreadsheet)?;

    let worksheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(ImportError::NoWorkSheets)?;

    let data = workbook
        .worksheet_range(&worksheet_name)
        .map_err(bad_spreadsheet)?;

    if data.end().is_none() {
        return Err(ImportError::UnknownWorkSheetRange);
    }

    let merges = match &mut workbook {
        Sheets::Xlsx(xlsx) => {
            xlsx.load_merged_regions()
                .map_err(|e| bad_spreadsheet(calamine::Error::Xlsx(e)))?;

            xlsx.merged_regions_by_sheet(&worksheet_name)
                .into_iter()
                .map(|(_, _, dimensions)| dimensions.clone())
                .collect()
        }
        Sheets::Xls(xls) => xls.worksheet_merge_cells(&worksheet_name).unwrap_or_default(),
        _ => Vec::new(),
    };

    Ok(WorkSheet::new(data, merges))
}

/// Obtaining the metadata and the groups of the sheet.
pub fn parse_skeleton(worksheet: &WorkSheet, layout: &SheetLayout, today: NaiveDate) -> SheetSkeleton {
    let metadata = metadata::extract_metadata(worksheet, layout, today);
    let groups = groups::locate_groups(worksheet, layout, &metadata);

    SheetSkeleton { metadata, groups }
}

/// Reading the lessons of one group.
///
/// Rows that fail to convert are reported and skipped.
pub fn parse_group(
    worksheet: &WorkSheet,
    skeleton: &SheetSkeleton,
    group: &str,
    layout: &SheetLayout,
) -> Result<Vec<ScheduleEntry>, ImportError> {
    let group = group.trim();

    let mapping = skeleton
        .groups
        .find(group)
        .ok_or_else(|| ImportError::GroupNotFound {
            requested: group.to_string(),
            groups: skeleton.groups.names(),
        })?;

    let target = GroupTarget {
        name: &mapping.name,
        column: mapping.column,
        metadata: &mapping.metadata,
    };

    let mut entries: Vec<ScheduleEntry> = Vec::new();

    for slot in DayWalker::new(worksheet, layout) {
        match build_entry(worksheet, &slot, &target) {
            Ok(Some(entry)) => entries.push(entry),
            Ok(None) => {}
            Err(error) => report_warning(&format!(
                "Skipping pair {} of {} for group '{}': {}",
                slot.number, slot.day.weekday, target.name, error
            )),
        }
    }

    log::debug!("Parsed {} lessons for group '{}'.", entries.len(), target.name);

    if entries.is_empty() {
        return Err(ImportError::NoEntries {
            group: mapping.name.clone(),
            groups: skeleton.groups.names(),
        });
    }

    Ok(entries)
}

/// Reading the lessons of one group from an in-memory sheet.
pub fn parse_worksheet(
    worksheet: &WorkSheet,
    group: &str,
    layout: &SheetLayout,
    today: NaiveDate,
) -> Result<Vec<ScheduleEntry>, ImportError> {
    let skeleton = parse_skeleton(worksheet, layout, today);

    parse_group(worksheet, &skeleton, group, layout)
}

/// Reading a spreadsheet from the buffer and converting the lessons of a group.
///
/// # Arguments
///
/// * `buffer`: spreadsheet data.
/// * `group`: name of the group as written in the header row.
/// * `layout`: positions of the template parts.
/// * `today`: date used when the sheet does not name the academic year.
pub fn parse_xlsx_with(
    buffer: &[u8],
    group: &str,
    layout: &SheetLayout,
    today: NaiveDate,
) -> ImportResult {
    let worksheet = match open_worksheet(buffer) {
        Ok(worksheet) => worksheet,
        Err(error) => {
            log::warn!("Unable to open spreadsheet: {}", error);

            return ImportResult::from_outcome(Err(error), Vec::new());
        }
    };

    let skeleton = parse_skeleton(&worksheet, layout, today);
    let outcome = parse_group(&worksheet, &skeleton, group, layout);

    ImportResult::from_outcome(outcome, skeleton.groups.names())
}

/// [`parse_xlsx_with`] with the default layout and today's date.
pub fn parse_xlsx(buffer: &[u8], group: &str) -> ImportResult {
    parse_xlsx_with(buffer, group, &SheetLayout::default(), Local::now().date_naive())
}

/// Reading the groups and metadata of a spreadsheet without parsing lessons.
pub fn list_groups_with(
    buffer: &[u8],
    layout: &SheetLayout,
    today: NaiveDate,
) -> Result<SheetSkeleton, ImportError> {
    let worksheet = open_worksheet(buffer)?;

    Ok(parse_skeleton(&worksheet, layout, today))
}

/// [`list_groups_with`] with the default layout and today's date.
pub fn list_groups(buffer: &[u8]) -> Result<SheetSkeleton, ImportError> {
    list_groups_with(buffer, &SheetLayout::default(), Local::now().date_naive())
}

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils {
    use crate::schema::SheetMetadata;
    use crate::worksheet::WorkSheet;
    use calamine::{Data, Dimensions, Range};
    use chrono::NaiveDate;
    use rust_xlsxwriter::{Format, Workbook};

    /// Date used by tests that depend on the calendar.
    pub fn test_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    pub fn test_metadata() -> SheetMetadata {
        SheetMetadata {
            academic_year: "2025-2026".to_string(),
            semester: "1 полугодие".to_string(),
            specialty: None,
            education_form: None,
            institution: None,
        }
    }

    /// Sheet assembled cell by cell.
    #[derive(Clone, Default)]
    pub struct SheetBuilder {
        cells: Vec<(u32, u32, String)>,
        merges: Vec<Dimensions>,
    }

    impl SheetBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn text(mut self, row: u32, column: u32, text: &str) -> Self {
            self.cells.push((row, column, text.to_string()));
            self
        }

        /// Merging an inclusive region; its value is the text of the top-left cell.
        pub fn merge(mut self, first_row: u32, first_column: u32, last_row: u32, last_column: u32) -> Self {
            self.merges
                .push(Dimensions::new((first_row, first_column), (last_row, last_column)));
            self
        }

        pub fn build(&self) -> WorkSheet {
            let last_row = self
                .cells
                .iter()
                .map(|(row, _, _)| *row)
                .chain(self.merges.iter().map(|merge| merge.end.0))
                .max()
                .unwrap_or(0);
            let last_column = self
                .cells
                .iter()
                .map(|(_, column, _)| *column)
                .chain(self.merges.iter().map(|merge| merge.end.1))
                .max()
                .unwrap_or(0);

            let mut data = Range::new((0, 0), (last_row, last_column));

            for (row, column, text) in &self.cells {
                data.set_value((*row, *column), Data::String(text.clone()));
            }

            WorkSheet::new(data, self.merges.clone())
        }

        /// Writing the sheet as an XLSX document.
        pub fn to_xlsx(&self) -> Vec<u8> {
            let mut workbook = Workbook::new();
            let worksheet = workbook.add_worksheet();
            let format = Format::new();

            for merge in &self.merges {
                let text = self
                    .cells
                    .iter()
                    .find(|(row, column, _)| (*row, *column) == merge.start)
                    .map(|(_, _, text)| text.as_str())
                    .unwrap_or("");

                worksheet
                    .merge_range(
                        merge.start.0,
                        merge.start.1 as u16,
                        merge.end.0,
                        merge.end.1 as u16,
                        text,
                        &format,
                    )
                    .expect("merge range");
            }

            for (row, column, text) in &self.cells {
                if self.merges.iter().any(|merge| merge.start == (*row, *column)) {
                    continue;
                }

                worksheet
                    .write_string(*row, *column as u16, text.as_str())
                    .expect("write cell");
            }

            workbook.save_to_buffer().expect("save workbook")
        }
    }

    /// A week of the college template with three blocks of groups.
    ///
    /// * `ИСПк-104-52-00` and `ИСПк-105-52-00` share the block at column 5;
    /// * `ДОк-202-52-00` owns the block at column 9;
    /// * `ПКС-101-52-00` owns the empty block at column 13.
    pub fn sample_sheet() -> SheetBuilder {
        SheetBuilder::new()
            .text(16, 0, "КОГПОАУ «Вятский колледж профессионального образования»")
            .text(18, 0, "Расписание занятий на 1 полугодие 2025-2026 учебного года")
            .text(19, 0, "Специальность 09.02.07 Информационные системы и программирование")
            .text(20, 0, "Форма обучения: очная")
            // group header
            .text(23, 5, "Группа ИСПк-104-52-00\nИСПк-105-52-00")
            .merge(23, 5, 23, 8)
            .text(23, 9, "Группа ДОк-202-52-00")
            .merge(23, 9, 23, 12)
            .text(23, 13, "Группа ПКС-101-52-00")
            .merge(23, 13, 23, 16)
            .text(24, 0, "День")
            .text(24, 1, "Время")
            .text(24, 5, "Дисциплина")
            .text(24, 6, "Вид занятия")
            .text(24, 7, "Преподаватель")
            .text(24, 8, "Ауд.")
            // thursday
            .text(25, 0, "ЧЕТВЕРГ   13.11")
            .text(26, 1, "8.30-10.00")
            .text(26, 5, "Математика")
            .text(26, 6, "Лекция")
            .text(26, 7, "Иванов И.И.")
            .text(26, 8, "204")
            .text(26, 9, "Педагогика")
            .text(26, 10, "Семинар")
            .text(26, 11, "Петрова А.А.")
            .text(26, 12, "101")
            .text(27, 1, "10.10-11.40")
            .text(27, 5, "Информатика")
            .merge(27, 5, 28, 5)
            .text(27, 6, "Лаб.")
            .merge(27, 6, 28, 6)
            .text(27, 7, "Смирнов П.П.")
            .merge(27, 7, 28, 7)
            .text(27, 8, "312")
            .merge(27, 8, 28, 8)
            .text(27, 9, "Выходной день")
            .merge(27, 9, 28, 12)
            .text(28, 1, "11.50-13.20")
            .text(29, 1, "13.40-15.10")
            // saturday
            .text(30, 0, "СУББОТА 15.11")
            .text(31, 1, "8.30-10.00")
            .text(31, 5, "Физкультура")
            .text(31, 9, "Психология")
            .text(31, 10, "Практика")
            .text(31, 11, "Сидоров В.В.")
            .text(31, 12, "12")
            .text(32, 1, "10.10-11.40")
            .text(32, 5, "День самост. подгот.")
    }

    /// [`sample_sheet`] written as an XLSX document.
    pub fn sample_workbook() -> Vec<u8> {
        sample_sheet().to_xlsx()
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::schema::LessonType;
    use crate::test_utils::{SheetBuilder, sample_sheet, sample_workbook, test_today};

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn parse(group: &str) -> ImportResult {
        parse_xlsx_with(&sample_workbook(), group, &SheetLayout::default(), test_today())
    }

    #[test]
    fn read() {
        let result = parse("ИСПк-104-52-00");

        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.error, None);
        assert_eq!(
            result.groups,
            vec![
                "ИСПк-104-52-00",
                "ИСПк-105-52-00",
                "ДОк-202-52-00",
                "ПКС-101-52-00"
            ]
        );

        let data = &result.data;
        assert_eq!(data.len(), 4);

        assert_eq!(data[0].subject, "Математика");
        assert_eq!(data[0].date, date(2025, 11, 13));
        assert_eq!(data[0].day_of_week, "ЧЕТВЕРГ");
        assert_eq!(data[0].pair_number, 0);
        assert_eq!(data[0].classroom, "204");

        // double pair from a vertical merge
        assert_eq!(data[1].subject, "Информатика");
        assert_eq!(data[1].lesson_type, LessonType::Lab);
        assert_eq!(data[1].pair_number, 1);
        assert_eq!(data[2].subject, "Информатика");
        assert_eq!(data[2].teacher, "Смирнов П.П.");
        assert_eq!(data[2].time, "11.50-13.20");
        assert_eq!(data[2].pair_number, 2);

        assert_eq!(data[3].subject, "Физкультура");
        assert_eq!(data[3].date, date(2025, 11, 15));
        assert_eq!(data[3].day_of_week, "СУББОТА");
        assert_eq!(data[3].teacher, "Не указан");
        assert_eq!(data[3].classroom, "Не указана");
        assert_eq!(data[3].pair_number, 0);
    }

    #[test]
    fn aliases_read_the_same_block() {
        let first = parse("ИСПк-104-52-00");
        let second = parse("ИСПк-105-52-00");

        assert_eq!(first.data.len(), second.data.len());
        assert!(second.data.iter().all(|entry| entry.group == "ИСПк-105-52-00"));
        assert_eq!(first.data[1].subject, second.data[1].subject);
    }

    #[test]
    fn day_off_is_skipped() {
        let result = parse("ДОк-202-52-00");

        assert!(result.success);
        assert_eq!(
            result
                .data
                .iter()
                .map(|entry| entry.subject.as_str())
                .collect::<Vec<_>>(),
            vec!["Педагогика", "Психология"]
        );
        assert_eq!(result.data[0].lesson_type, LessonType::Seminar);
        assert_eq!(result.data[1].lesson_type, LessonType::Practice);
    }

    #[test]
    fn parsing_is_repeatable() {
        let buffer = sample_workbook();
        let layout = SheetLayout::default();

        let first = parse_xlsx_with(&buffer, "ИСПк-104-52-00", &layout, test_today());
        let second = parse_xlsx_with(&buffer, "ИСПк-104-52-00", &layout, test_today());

        assert_eq!(
            serde_json::to_string(&first.data).unwrap(),
            serde_json::to_string(&second.data).unwrap()
        );
    }

    #[test]
    fn unknown_group() {
        let result = parse("ИСП-104-52-00");

        assert!(!result.success);
        assert!(result.data.is_empty());
        assert_eq!(result.groups.len(), 4);

        let skeleton = list_groups_with(&sample_workbook(), &SheetLayout::default(), test_today())
            .unwrap();
        assert_eq!(result.groups, skeleton.groups.names());

        let error = result.error.unwrap();
        assert!(error.contains("Did you mean \"ИСПк-104-52-00\"?"), "{}", error);
    }

    #[test]
    fn group_without_lessons() {
        let worksheet = sample_sheet().build();
        let error = parse_worksheet(
            &worksheet,
            "ПКС-101-52-00",
            &SheetLayout::default(),
            test_today(),
        )
        .unwrap_err();

        assert!(matches!(error, ImportError::NoEntries { ref group, .. } if group == "ПКС-101-52-00"));
        assert_eq!(error.groups().map(<[String]>::len), Some(4));

        let result = parse("ПКС-101-52-00");
        assert!(!result.success);
        assert_eq!(result.groups.len(), 4);
    }

    #[test]
    fn bad_buffer() {
        let result = parse_xlsx_with(
            b"definitely not a spreadsheet",
            "ИСПк-104-52-00",
            &SheetLayout::default(),
            test_today(),
        );

        assert!(!result.success);
        assert!(result.error.is_some());
        assert!(result.groups.is_empty());

        assert!(matches!(
            open_worksheet(b""),
            Err(ImportError::BadSpreadsheet(_))
        ));
    }

    #[test]
    fn metadata_is_read_from_workbook() {
        let skeleton = list_groups_with(&sample_workbook(), &SheetLayout::default(), test_today())
            .unwrap();

        assert_eq!(skeleton.metadata.academic_year, "2025-2026");
        assert_eq!(skeleton.metadata.semester, "1 полугодие");
        assert_eq!(skeleton.metadata.education_form.as_deref(), Some("очная"));
        assert_eq!(skeleton.groups.mappings[2].column, 9);
    }

    #[test]
    fn calendar_year_without_metadata() {
        let worksheet = SheetBuilder::new()
            .text(23, 5, "Группа ИСПк-104-52-00")
            .text(25, 0, "ЧЕТВЕРГ 13.11")
            .text(26, 1, "8.30-10.00")
            .text(26, 5, "Математика")
            .build();
        let layout = SheetLayout::default();

        let autumn = parse_worksheet(&worksheet, "ИСПк-104-52-00", &layout, date(2025, 10, 1))
            .unwrap();
        assert_eq!(autumn[0].date, date(2025, 11, 13));

        let spring = parse_worksheet(&worksheet, "ИСПк-104-52-00", &layout, date(2026, 3, 1))
            .unwrap();
        assert_eq!(spring[0].date, date(2027, 11, 13));
    }

    #[test]
    fn skipped_slots_still_count() {
        let worksheet = SheetBuilder::new()
            .text(23, 5, "Группа ИСПк-104-52-00")
            .text(25, 0, "ЧЕТВЕРГ 13.11")
            .text(26, 1, "8.30-10.00")
            .text(26, 5, "Выходной день")
            .text(27, 1, "10.10-11.40")
            .text(28, 1, "11.50-13.20")
            .text(28, 5, "Физика")
            .build();

        let entries = parse_worksheet(
            &worksheet,
            "ИСПк-104-52-00",
            &SheetLayout::default(),
            test_today(),
        )
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subject, "Физика");
        assert_eq!(entries[0].pair_number, 2);
        assert_eq!(entries[0].time, "11.50-13.20");
    }

    #[test]
    fn broken_day_does_not_stop_the_parse() {
        let worksheet = SheetBuilder::new()
            .text(18, 0, "На 1 полугодие 2025-2026 учебного года")
            .text(23, 5, "Группа ИСПк-104-52-00")
            .text(25, 0, "ПОНЕДЕЛЬНИК 31.02")
            .text(26, 1, "8.30-10.00")
            .text(26, 5, "Математика")
            .text(27, 0, "ВТОРНИК 11.11")
            .text(28, 1, "8.30-10.00")
            .text(28, 5, "Физика")
            .build();

        let entries = parse_worksheet(
            &worksheet,
            "ИСПк-104-52-00",
            &SheetLayout::default(),
            test_today(),
        )
        .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].subject, "Физика");
        assert_eq!(entries[0].date, date(2025, 11, 11));
    }

    #[test]
    fn custom_layout() {
        let worksheet = SheetBuilder::new()
            .text(2, 4, "Группа ИСПк-104-52-00")
            .text(3, 1, "СРЕДА 12.11")
            .text(4, 2, "8.30-10.00")
            .text(4, 4, "Математика")
            .build();
        let layout = SheetLayout {
            metadata_rows: 0..=1,
            groups_row: 2,
            groups_start_column: 3,
            day_column: 1,
            ..SheetLayout::default()
        };

        let entries = parse_worksheet(&worksheet, " ИСПк-104-52-00 ", &layout, test_today())
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].day_of_week, "СРЕДА");
        assert_eq!(entries[0].date, date(2025, 11, 12));
    }
}
