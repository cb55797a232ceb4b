use crate::schema::internal::{GroupTarget, PairRowInfo};
use crate::schema::{ErrorCell, LessonType, RowError, ScheduleEntry};
use crate::worksheet::WorkSheet;
use chrono::NaiveDate;

/// Subject texts that mark a day without lessons.
const PLACEHOLDERS: [&str; 4] = [
    "День самост. подгот.",
    "Выходной день",
    "самостоятельной подготовки",
    "выходной",
];

const NO_TEACHER: &str = "Не указан";
const NO_CLASSROOM: &str = "Не указана";

/// Checking the subject against the "day off" placeholders.
pub fn is_placeholder(subject: &str) -> bool {
    PLACEHOLDERS
        .iter()
        .any(|placeholder| subject.contains(placeholder))
}

// noinspection GrazieInspection
/// Obtaining the lesson type from the text of the type cell.
pub fn guess_lesson_type(text: &str) -> LessonType {
    let lower = text.to_lowercase();

    if lower.contains("лекция") {
        LessonType::Lecture
    } else if lower.contains("практика") || lower.contains("пр. занятие") {
        LessonType::Practice
    } else if lower.contains("лабораторная") || lower.contains("лаб.") {
        LessonType::Lab
    } else if lower.contains("семинар") {
        LessonType::Seminar
    } else {
        LessonType::Lecture
    }
}

/// Calendar year of a day in the given academic year.
///
/// The first semester takes the first year of "Y1-Y2", any other takes the second.
pub fn resolve_year(academic_year: &str, semester: &str) -> Option<i32> {
    let (start, end) = academic_year.split_once('-')?;

    let year = if semester.contains('1') { start } else { end };

    year.trim().parse::<i32>().ok()
}

/// Date of the slot's day in the academic year of the group's sheet.
pub(crate) fn resolve_date(slot: &PairRowInfo, group: &GroupTarget) -> Result<NaiveDate, RowError> {
    let metadata = group.metadata;

    let year = resolve_year(&metadata.academic_year, &metadata.semester).ok_or_else(|| {
        RowError::BadAcademicYear(ErrorCell::new(
            slot.row,
            group.column,
            metadata.academic_year.clone(),
        ))
    })?;

    NaiveDate::from_ymd_opt(year, slot.day.month, slot.day.day).ok_or(RowError::InvalidDate {
        row: slot.day.row,
        day: slot.day.day,
        month: slot.day.month,
        year,
    })
}

/// Building the entry of the target group for a lesson row.
///
/// Returns `Ok(None)` when the group has no lesson in this slot.
pub(crate) fn build_entry(
    worksheet: &WorkSheet,
    slot: &PairRowInfo,
    group: &GroupTarget,
) -> Result<Option<ScheduleEntry>, RowError> {
    let row = slot.row;
    let cell = |offset: u32| worksheet.get_resolved_string_from_cell(row, group.column + offset);

    let subject = match cell(0) {
        Some(subject) if !is_placeholder(&subject) => subject,
        _ => return Ok(None),
    };

    let date = resolve_date(slot, group)?;

    Ok(Some(ScheduleEntry {
        subject,
        time: slot.time.clone(),
        teacher: cell(2).unwrap_or_else(|| NO_TEACHER.to_string()),
        classroom: cell(3).unwrap_or_else(|| NO_CLASSROOM.to_string()),
        date,
        lesson_type: guess_lesson_type(&cell(1).unwrap_or_default()),
        group: group.name.to_string(),
        day_of_week: slot.day.weekday.label().to_string(),
        pair_number: slot.number,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{SheetMetadata, Weekday};
    use crate::schema::internal::DayCellInfo;
    use crate::test_utils::{SheetBuilder, test_metadata};

    fn target(metadata: &SheetMetadata) -> GroupTarget<'_> {
        GroupTarget {
            name: "ИСПк-104-52-00",
            column: 5,
            metadata,
        }
    }

    fn slot(row: u32, day: u32, month: u32) -> PairRowInfo {
        PairRowInfo {
            row,
            time: "8.30-10.00".to_string(),
            day: DayCellInfo {
                row: row - 1,
                weekday: Weekday::Thursday,
                day,
                month,
            },
            number: 2,
        }
    }

    #[test]
    fn lesson_types() {
        assert_eq!(guess_lesson_type("Лекция"), LessonType::Lecture);
        assert_eq!(guess_lesson_type("ПРАКТИКА"), LessonType::Practice);
        assert_eq!(guess_lesson_type("пр. занятие"), LessonType::Practice);
        assert_eq!(guess_lesson_type("Лабораторная работа"), LessonType::Lab);
        assert_eq!(guess_lesson_type("лаб."), LessonType::Lab);
        assert_eq!(guess_lesson_type("Семинар"), LessonType::Seminar);
        assert_eq!(guess_lesson_type("Консультация"), LessonType::Lecture);
        assert_eq!(guess_lesson_type(""), LessonType::Lecture);
    }

    #[test]
    fn placeholders() {
        assert!(is_placeholder("Выходной день"));
        assert!(is_placeholder("День самост. подгот."));
        assert!(is_placeholder("День самостоятельной подготовки"));
        assert!(is_placeholder("Праздничный выходной"));
        assert!(!is_placeholder("ВЫХОДНОЙ"));
        assert!(!is_placeholder("Математика"));
    }

    #[test]
    fn date_follows_semester() {
        let mut metadata = test_metadata();

        assert_eq!(
            resolve_date(&slot(30, 13, 11), &target(&metadata)).unwrap(),
            NaiveDate::from_ymd_opt(2025, 11, 13).unwrap()
        );

        metadata.semester = "2 полугодие".to_string();
        assert_eq!(
            resolve_date(&slot(30, 13, 11), &target(&metadata)).unwrap(),
            NaiveDate::from_ymd_opt(2026, 11, 13).unwrap()
        );

        assert_eq!(resolve_year("2025-2026", "1 семестр"), Some(2025));
        assert_eq!(resolve_year("2025", "1 полугодие"), None);
    }

    #[test]
    fn unreadable_academic_year_is_a_row_error() {
        let mut metadata = test_metadata();
        metadata.academic_year = "2025/2026".to_string();

        assert!(matches!(
            resolve_date(&slot(30, 13, 11), &target(&metadata)),
            Err(RowError::BadAcademicYear(_))
        ));
    }

    #[test]
    fn builds_an_entry() {
        let sheet = SheetBuilder::new()
            .text(30, 5, "Математика")
            .text(30, 6, "пр. занятие")
            .text(30, 7, "Иванов И.И.")
            .text(30, 8, "204")
            .build();
        let metadata = test_metadata();
        let target = target(&metadata);

        let entry = build_entry(&sheet, &slot(30, 13, 11), &target)
            .unwrap()
            .unwrap();

        assert_eq!(entry.subject, "Математика");
        assert_eq!(entry.lesson_type, LessonType::Practice);
        assert_eq!(entry.teacher, "Иванов И.И.");
        assert_eq!(entry.classroom, "204");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2025, 11, 13).unwrap());
        assert_eq!(entry.group, "ИСПк-104-52-00");
        assert_eq!(entry.day_of_week, "ЧЕТВЕРГ");
        assert_eq!(entry.pair_number, 2);
        assert_eq!(entry.time, "8.30-10.00");
    }

    #[test]
    fn missing_fields_use_placeholders() {
        let sheet = SheetBuilder::new().text(30, 5, "Физкультура").build();
        let metadata = test_metadata();
        let target = target(&metadata);

        let entry = build_entry(&sheet, &slot(30, 13, 11), &target)
            .unwrap()
            .unwrap();

        assert_eq!(entry.teacher, "Не указан");
        assert_eq!(entry.classroom, "Не указана");
        assert_eq!(entry.lesson_type, LessonType::Lecture);
    }

    #[test]
    fn merged_subject_is_shared() {
        let sheet = SheetBuilder::new()
            .text(30, 1, "Общая лекция")
            .merge(30, 1, 30, 8)
            .build();
        let metadata = test_metadata();
        let target = target(&metadata);

        let entry = build_entry(&sheet, &slot(30, 13, 11), &target)
            .unwrap()
            .unwrap();

        assert_eq!(entry.subject, "Общая лекция");
        assert_eq!(entry.teacher, "Общая лекция");
    }

    #[test]
    fn day_off_and_empty_rows_are_skipped() {
        let sheet = SheetBuilder::new()
            .text(30, 5, "Выходной день")
            .text(30, 7, "Иванов И.И.")
            .build();
        let metadata = test_metadata();
        let target = target(&metadata);

        assert_eq!(build_entry(&sheet, &slot(30, 13, 11), &target).unwrap(), None);
        assert_eq!(build_entry(&sheet, &slot(31, 13, 11), &target).unwrap(), None);
    }

    #[test]
    fn impossible_date_is_a_row_error() {
        let sheet = SheetBuilder::new().text(30, 5, "Математика").build();
        let metadata = test_metadata();
        let target = target(&metadata);

        let error = build_entry(&sheet, &slot(30, 31, 2), &target).unwrap_err();

        assert!(matches!(
            error,
            RowError::InvalidDate {
                day: 31,
                month: 2,
                year: 2025,
                ..
            }
        ));
    }
}
