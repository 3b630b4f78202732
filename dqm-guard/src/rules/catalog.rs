//! Built-in rules for crop collection sheets.
//!
//! Used when a run is started without any rules. The catalog covers:
//!
//! - range checks: every percentage column lies within `[0, 100]`, an empty
//!   cell reading as 0
//! - progressive checks: a later sowing or harvest area is not smaller than
//!   the earlier one (rows where the later area is zero or blank are skipped,
//!   an empty earlier area reads as 0)
//! - the limit check: the latest nonzero sowing area (Sowing 3, else 2, else
//!   1) does not exceed the agriculture area
//! - the Sowing 2 / ACR consistency check

use crate::core::ColumnType;
use crate::rules::{RowRule, Rule, RuleSet};

/// Sowing 1 area column.
pub const SOWING_1_AREA: &str = "Sowing 1 Area (ha)";
/// Sowing 2 area column (no space before the digit in the source sheets).
pub const SOWING_2_AREA: &str = "Sowing2 Area (ha)";
/// Sowing 3 area column.
pub const SOWING_3_AREA: &str = "Sowing 3 Area (ha)";
/// Sowing 2 annotation column.
pub const SOWING_2_ACR: &str = "Sowing 2 ACR";
/// Agriculture area column.
pub const AGRICULTURE_AREA: &str = "Total Agriculture Area (ha)";

const PERCENTAGE_COLUMNS: [(&str, &str); 8] = [
    ("Sowing 1 %", "Sowing 1 Percentage"),
    ("Sowing 2 %", "Sowing 2 Percentage"),
    ("Sowing 3 %", "Sowing 3 Percentage"),
    ("Crop Area %", "Crop  Area Percentage K025"),
    ("Harvest 1 %", "Harvest 1 Area Percentage"),
    ("Harvest 2 %", "Harvest 2 Area Percentage"),
    ("Harvest 3 %", "Harvest 3 Area Percentage"),
    ("Harvest 4 %", "Harvest 4 Area Percentage"),
];

const PROGRESSIVE_COLUMNS: [(&str, &str, &str, &str); 5] = [
    ("Sowing 2", SOWING_2_AREA, "Sowing 1", SOWING_1_AREA),
    ("Sowing 3", SOWING_3_AREA, "Sowing 2", SOWING_2_AREA),
    ("Harvest 2", "Harvest 2 Area(ha)", "Harvest 1", "Harvest 1 Area(ha)"),
    ("Harvest 3", "Harvest 3 Area (ha)", "Harvest 2", "Harvest 2 Area(ha)"),
    ("Harvest 4", "Harvest 4 Area (ha)", "Harvest 3", "Harvest 3 Area (ha)"),
];

/// Headers of the standard collection sheet, in order.
pub const MANDATORY_HEADERS: [&str; 29] = [
    "FPO Code",
    "State",
    "District",
    "Subdistrict",
    "Village",
    "RID",
    "Total Geographical Area (ha)",
    "Total Agriculture Area (ha)",
    "Sowing 1 Area (ha)",
    "Sowing 1 Percentage",
    "Sowing2 Area (ha)",
    "Sowing 2 Percentage",
    "Sowing 2 ACR",
    "Sowing 3 Area (ha)",
    "Sowing 3 Percentage",
    "Major crops",
    "Crop  Area (ha) K025",
    "Crop  Area Percentage K025",
    "Crop Area Risk",
    "Harvest 1 Area(ha)",
    "Harvest 1 Area Percentage",
    "Harvest 2 Area(ha)",
    "Harvest 2 Area Percentage",
    "Harvest 2 Area Risk",
    "Harvest 3 Area (ha)",
    "Harvest 3 Area Percentage",
    "Harvest 4 Area (ha)",
    "Harvest 4 ACR",
    "Harvest 4 Area Percentage",
];

/// The built-in rule set.
///
/// ```rust
/// use dqm_guard::rules::catalog::standard_rules;
///
/// let rules = standard_rules();
/// assert!(rules.iter().all(|rule| !rule.is_aggregate()));
/// assert!(rules.iter().any(|rule| rule.display_name() == "Sowing 2 Consistency"));
/// ```
pub fn standard_rules() -> RuleSet {
    let mut rules = Vec::new();
    let mut next_id = 1;
    let mut push = |rule: RowRule, name: String, message: String| {
        rules.push(Rule::row(next_id, rule).with_name(name).with_message(message));
        next_id += 1;
    };

    for (label, column) in PERCENTAGE_COLUMNS {
        push(
            number(RowRule::new(column, "between", "0,100").empty_as_zero()),
            format!("{label} Range"),
            format!("{label} outside [0, 100]"),
        );
    }

    for (later_label, later, earlier_label, earlier) in PROGRESSIVE_COLUMNS {
        push(
            number(
                RowRule::new(later, "gte", earlier)
                    .against_column()
                    .skip_if_zero()
                    .empty_as_zero(),
            ),
            format!("{later_label} >= {earlier_label}"),
            format!("{later_label} < {earlier_label}"),
        );
    }

    push(
        number(
            RowRule::new(latest_sowing_columns(), "lte", AGRICULTURE_AREA)
                .against_column()
                .first_non_zero()
                .skip_if_zero()
                .empty_as_zero(),
        ),
        "Agri Area >= Latest Sowing".to_string(),
        "Agri Area < Latest Sowing Area".to_string(),
    );

    push(
        RowRule::new(SOWING_2_AREA, "consistency", SOWING_2_ACR).against_column(),
        "Sowing 2 Consistency".to_string(),
        "Sowing 2/ACR Mismatch: If Sowing 2 != 0, ACR must exist. If Sowing 2 == 0, ACR must be blank."
            .to_string(),
    );

    RuleSet { rules }
}

/// Sowing area columns, latest first.
fn latest_sowing_columns() -> String {
    [SOWING_3_AREA, SOWING_2_AREA, SOWING_1_AREA].join(",")
}

fn number(rule: RowRule) -> RowRule {
    rule.with_value_type(ColumnType::Number)
}
