//! Channel vocabulary of the monitoring exports and the grouping rules
//! that map raw channel labels onto canonical groups.

/// Column holding the raw channel label on each article row.
pub const CHANNEL_COLUMN: &str = "Mecra";
/// Derived column appended to the merged dataset.
pub const GROUP_COLUMN: &str = "Mecra Grubu";
/// Audience reach metric column.
pub const REACH_COLUMN: &str = "Erişim";
/// Advertising-equivalency metric column.
pub const AD_EQUIV_COLUMN: &str = "Reklam Eşdeğeri (TL)";
/// Per-group article count header in the summary sheet.
pub const COUNT_COLUMN: &str = "Haber Adedi";
/// Group label of the totals row.
pub const TOTAL_LABEL: &str = "Toplam";

pub const WRITTEN_PRESS: &str = "Yazılı Basın";
pub const INTERNET: &str = "İnternet";
pub const TV: &str = "TV";
pub const OTHER: &str = "Diğer";

/// Map a raw channel label to its canonical group.
///
/// Substring matches are case-sensitive and checked in a fixed precedence
/// order. Labels matching none of the rules pass through trimmed, so the
/// group set is open beyond the three reserved media categories. Rows whose
/// channel cell is literally missing never reach this function; they are
/// dropped by the pipeline first.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return OTHER.to_string();
    }
    if raw.contains("Elektronik Basın") {
        return INTERNET.to_string();
    }
    if raw.contains("Görsel Basın") {
        return TV.to_string();
    }
    if raw.contains("Yazılı Basın") {
        return WRITTEN_PRESS.to_string();
    }
    trimmed.to_string()
}

/// Display priority for the summary table: press, then digital, then
/// broadcast, then everything else. Ties among "everything else" keep
/// their first-seen order (the caller must sort stably).
pub fn display_priority(group: &str) -> u8 {
    match group {
        WRITTEN_PRESS => 0,
        INTERNET => 1,
        TV => 2,
        _ => 3,
    }
}
