use crate::layout::SheetLayout;
use crate::schema::internal::GroupCellInfo;
use crate::schema::{GroupColumnMapping, GroupConflict, GroupLayout, SheetMetadata};
use crate::worksheet::{CellPos, WorkSheet};
use regex::Regex;
use std::sync::LazyLock;

/// Extracting a group name from one line of a header cell.
///
/// Recognises "Группа ДОк-202-52-00" and a bare group code.
pub fn extract_group_name(line: &str) -> Option<String> {
    static LABELED_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)Группа\s+([^\s,;]+)").unwrap());
    static CODE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"[А-ЯЁ]{2,}к?-\d{3}-\d{2}-\d{2}").unwrap());

    if let Some(captures) = LABELED_RE.captures(line) {
        return Some(captures[1].to_string());
    }

    CODE_RE.find(line).map(|m| m.as_str().to_string())
}

/// All group names listed in one header cell, one per line.
fn parse_group_cell(text: &str, column: u32) -> Vec<GroupCellInfo> {
    let mut groups: Vec<GroupCellInfo> = Vec::new();

    for line in text.lines() {
        let Some(name) = extract_group_name(line) else {
            continue;
        };

        if groups.iter().any(|group| group.name == name) {
            continue;
        }

        groups.push(GroupCellInfo { column, name });
    }

    groups
}

/// Scanning the header row for groups and their column blocks.
///
/// Every name in one cell shares that cell's column. A name met again further
/// right keeps its first column and the repeat is reported as a conflict.
pub fn locate_groups(
    worksheet: &WorkSheet,
    layout: &SheetLayout,
    metadata: &SheetMetadata,
) -> GroupLayout {
    let mut result = GroupLayout::default();

    let last_column = match worksheet.bounds() {
        Some((_, column)) => column,
        None => return result,
    };

    let row = layout.groups_row;
    let mut column = layout.groups_start_column;

    while column <= last_column {
        let found = match worksheet.get_raw_string_from_cell(row, column) {
            Some(text) => parse_group_cell(&text, column),
            None => Vec::new(),
        };

        // A cell without a group name (a column label, a stray note) does not
        // open a block, so only the next column is checked.
        let step = if found.is_empty() {
            1
        } else {
            layout.block_width.max(1)
        };

        for group in found {
            match result.find(&group.name) {
                Some(existing) => {
                    let conflict = GroupConflict {
                        name: group.name,
                        kept_column: existing.column,
                        ignored_column: group.column,
                    };

                    crate::report_warning(&format!(
                        "Group '{}' is listed twice in the header: kept {}, ignored {}.",
                        conflict.name,
                        CellPos::new(row, conflict.kept_column),
                        CellPos::new(row, conflict.ignored_column),
                    ));

                    result.conflicts.push(conflict);
                }
                None => result.mappings.push(GroupColumnMapping {
                    name: group.name,
                    column: group.column,
                    row,
                    metadata: metadata.clone(),
                }),
            }
        }

        let Some(next) = column.checked_add(step) else {
            break;
        };

        column = next;
    }

    result
}

/// Groups whose names look like the requested one, closest first.
///
/// A group qualifies when it contains the request ignoring case or is within a
/// few edits of it.
pub fn closest_groups(requested: &str, groups: &[String], limit: usize) -> Vec<String> {
    const MAX_DISTANCE: usize = 4;

    let requested_lower = requested.trim().to_lowercase();

    if requested_lower.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &String)> = groups
        .iter()
        .filter_map(|group| {
            let group_lower = group.to_lowercase();
            let distance = strsim::levenshtein(&requested_lower, &group_lower);

            if group_lower.contains(&requested_lower) || distance <= MAX_DISTANCE {
                Some((distance, group))
            } else {
                None
            }
        })
        .collect();

    scored.sort_by_key(|(distance, _)| *distance);

    scored
        .into_iter()
        .take(limit)
        .map(|(_, group)| group.clone())
        .collect()
}
