use std::fmt::Write as _;
use std::path::Path;

pub const FEATURES: [&str; 4] = ["Current_Ratio", "Debt_Ratio", "ROA", "Asset_Turnover"];

/// Deterministic Feature Table where distress follows a high debt ratio and
/// a negative return on assets.
pub fn feature_table_csv(rows: usize) -> String {
    let mut text = String::from("Company,Category,Year,");
    text.push_str(&FEATURES.join(","));
    text.push_str(",Financial_Status\n");
    for i in 0..rows {
        let distressed = i % 3 == 0;
        let wobble = (i % 7) as f32 * 0.03;
        let (current, debt, roa) = if distressed {
            (0.6 + wobble, 0.85 - wobble, -0.05 - wobble)
        } else {
            (1.8 + wobble, 0.35 + wobble, 0.08 + wobble)
        };
        let turnover = 0.5 + (i % 5) as f32 * 0.2;
        let _ = writeln!(
            text,
            "Company_{i},{},{},{current},{debt},{roa},{turnover},{}",
            ["Retail", "Energy", "Tech"][i % 3],
            2015 + (i % 8),
            u8::from(distressed)
        );
    }
    text
}

pub fn write_feature_table(path: &Path, rows: usize) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create table parent dirs");
    }
    std::fs::write(path, feature_table_csv(rows)).expect("write feature table");
}
