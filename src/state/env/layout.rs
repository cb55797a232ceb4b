use schedule_parser::SheetLayout;
use std::env;

/// Sheet template positions, overridable from the environment.
///
/// Rows and columns are one-based in the environment, the way they are read in
/// a spreadsheet editor.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutEnvData {
    pub sheet: SheetLayout,
}

impl LayoutEnvData {
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let number = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u32>().ok());
        let index = |name: &str| number(name).and_then(|v| v.checked_sub(1));
        let count = |name: &str| {
            number(name)
                .filter(|v| *v > 0)
                .and_then(|v| u8::try_from(v).ok())
        };

        let defaults = SheetLayout::default();

        let metadata_first = index("SCHEDULE_METADATA_FIRST_ROW")
            .unwrap_or(*defaults.metadata_rows.start());
        let metadata_last = index("SCHEDULE_METADATA_LAST_ROW")
            .unwrap_or(*defaults.metadata_rows.end())
            .max(metadata_first);

        Self {
            sheet: SheetLayout {
                metadata_rows: metadata_first..=metadata_last,
                metadata_start_column: index("SCHEDULE_METADATA_START_COLUMN")
                    .unwrap_or(defaults.metadata_start_column),
                groups_row: index("SCHEDULE_GROUPS_ROW").unwrap_or(defaults.groups_row),
                groups_start_column: index("SCHEDULE_GROUPS_START_COLUMN")
                    .unwrap_or(defaults.groups_start_column),
                block_width: count("SCHEDULE_BLOCK_WIDTH")
                    .map(u32::from)
                    .unwrap_or(defaults.block_width),
                day_column: index("SCHEDULE_DAY_COLUMN").unwrap_or(defaults.day_column),
                max_pairs: count("SCHEDULE_MAX_PAIRS").unwrap_or(defaults.max_pairs),
                saturday_max_pairs: count("SCHEDULE_SATURDAY_MAX_PAIRS")
                    .unwrap_or(defaults.saturday_max_pairs),
            },
        }
    }
}

impl Default for LayoutEnvData {
    fn default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let env = LayoutEnvData::from_lookup(|_| None);

        assert_eq!(env.sheet, SheetLayout::default());
    }

    #[test]
    fn one_based_overrides() {
        let env = LayoutEnvData::from_lookup(|name| match name {
            "SCHEDULE_GROUPS_ROW" => Some("3".to_string()),
            "SCHEDULE_GROUPS_START_COLUMN" => Some("4".to_string()),
            "SCHEDULE_DAY_COLUMN" => Some("2".to_string()),
            "SCHEDULE_METADATA_FIRST_ROW" => Some("1".to_string()),
            "SCHEDULE_METADATA_LAST_ROW" => Some("2".to_string()),
            "SCHEDULE_SATURDAY_MAX_PAIRS" => Some("5".to_string()),
            _ => None,
        });

        assert_eq!(env.sheet.groups_row, 2);
        assert_eq!(env.sheet.groups_start_column, 3);
        assert_eq!(env.sheet.day_column, 1);
        assert_eq!(env.sheet.metadata_rows, 0..=1);
        assert_eq!(env.sheet.saturday_max_pairs, 5);
        assert_eq!(env.sheet.max_pairs, 7);
    }

    #[test]
    fn block_width_is_bounded() {
        let env = LayoutEnvData::from_lookup(|name| match name {
            "SCHEDULE_BLOCK_WIDTH" => Some("4294967295".to_string()),
            _ => None,
        });
        assert_eq!(env.sheet.block_width, 4);

        let env = LayoutEnvData::from_lookup(|name| match name {
            "SCHEDULE_BLOCK_WIDTH" => Some("3".to_string()),
            _ => None,
        });
        assert_eq!(env.sheet.block_width, 3);
    }

    #[test]
    fn invalid_values_keep_defaults() {
        let env = LayoutEnvData::from_lookup(|name| match name {
            "SCHEDULE_GROUPS_ROW" => Some("0".to_string()),
            "SCHEDULE_BLOCK_WIDTH" => Some("wide".to_string()),
            "SCHEDULE_MAX_PAIRS" => Some("300".to_string()),
            "SCHEDULE_SATURDAY_MAX_PAIRS" => Some("0".to_string()),
            _ => None,
        });

        assert_eq!(env.sheet, SheetLayout::default());
    }
}
