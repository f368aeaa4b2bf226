use viastack::rules::RuleTable;

use crate::Sky130Pdk;

impl Sky130Pdk {
    /// The via1 through via4 rules bundled with this crate.
    pub fn default_via_rules() -> RuleTable {
        RuleTable::from_csv(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/data/via_rules.csv"
        )))
        .expect("bundled SKY130 via rules should be valid")
    }
}
