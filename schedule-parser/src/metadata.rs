use crate::layout::SheetLayout;
use crate::schema::SheetMetadata;
use crate::worksheet::WorkSheet;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

/// Semester used when the sheet names the year but not the half.
const FIRST_SEMESTER: &str = "1 полугодие";
const SECOND_SEMESTER: &str = "2 полугодие";

/// Academic year and semester found in a single cell.
struct YearMatch {
    academic_year: String,
    semester: String,
}

/// "На 1 полугодие 2025-2026 учебного года".
fn match_full_year(text: &str) -> Option<YearMatch> {
    static FULL_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)на\s+(\d+)\s*(полугодие|семестр)\s+(\d{4})\s*[-–]\s*(\d{4})\s+учебного\s+года")
            .unwrap()
    });

    let captures = FULL_RE.captures(text)?;

    Some(YearMatch {
        academic_year: format!("{}-{}", &captures[3], &captures[4]),
        semester: format!("{} {}", &captures[1], captures[2].to_lowercase()),
    })
}

/// "2025-2026 учебный год".
fn match_short_year(text: &str) -> Option<YearMatch> {
    static SHORT_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)(\d{4})\s*[-–]\s*(\d{4})\s+учебный\s+год").unwrap()
    });

    let captures = SHORT_RE.captures(text)?;

    Some(YearMatch {
        academic_year: format!("{}-{}", &captures[1], &captures[2]),
        semester: FIRST_SEMESTER.to_string(),
    })
}

/// Value of a "Форма обучения: очная" cell.
fn match_education_form(text: &str) -> Option<String> {
    const LABEL: &str = "Форма обучения";

    let index = text.find(LABEL)?;
    let value = text[index + LABEL.len()..].trim_matches(|c: char| c == ':' || c.is_whitespace());

    if value.is_empty() {
        Some(text.to_string())
    } else {
        Some(value.to_string())
    }
}

fn match_institution(text: &str) -> Option<String> {
    let lower = text.to_lowercase();

    if lower.contains("колледж") || lower.contains("университет") {
        Some(text.to_string())
    } else {
        None
    }
}

fn match_specialty(text: &str) -> Option<String> {
    static CODE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\b\d{2}\.\d{2}\.\d{2}\b").unwrap());

    CODE_RE.is_match(text).then(|| text.to_string())
}

/// Academic year and semester derived from the calendar.
///
/// September and later belong to the first half of the year.
pub fn default_year(today: NaiveDate) -> (String, String) {
    let year = today.year();
    let semester = if today.month() >= 9 {
        FIRST_SEMESTER
    } else {
        SECOND_SEMESTER
    };

    (format!("{}-{}", year, year + 1), semester.to_string())
}

/// Scanning the rows above the group header for free-text information.
///
/// # Arguments
///
/// * `worksheet`: document.
/// * `layout`: positions of the template parts.
/// * `today`: date used when the sheet does not name the academic year.
pub fn extract_metadata(worksheet: &WorkSheet, layout: &SheetLayout, today: NaiveDate) -> SheetMetadata {
    let mut full_year: Option<YearMatch> = None;
    let mut short_year: Option<YearMatch> = None;
    let mut specialty: Option<String> = None;
    let mut education_form: Option<String> = None;
    let mut institution: Option<String> = None;

    let last_column = worksheet.bounds().map_or(0, |(_, column)| column);

    for row in layout.metadata_rows.clone() {
        for column in layout.metadata_start_column..=last_column {
            let Some(text) = worksheet.get_string_from_cell(row, column) else {
                continue;
            };

            if full_year.is_none() {
                full_year = match_full_year(&text);
            }

            if short_year.is_none() {
                short_year = match_short_year(&text);
            }

            if education_form.is_none() {
                education_form = match_education_form(&text);
            }

            if institution.is_none() {
                institution = match_institution(&text);
            }

            if specialty.is_none() {
                specialty = match_specialty(&text);
            }
        }
    }

    let (academic_year, semester) = match full_year.or(short_year) {
        Some(found) => (found.academic_year, found.semester),
        None => {
            log::debug!("Academic year not found in the sheet, using the calendar.");

            default_year(today)
        }
    };

    SheetMetadata {
        academic_year,
        semester,
        specialty,
        education_form,
        institution,
    }
}
