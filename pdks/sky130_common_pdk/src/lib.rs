use viastack::pdk::Pdk;
use viastack::rules::RuleTable;

pub mod constants;
pub mod via;

/// The SkyWater 130nm process, as seen by Magic's `sky130A` technology.
///
/// Magic names the metals `metal1`..`metal5` (`m1`..`m5`) and the vias
/// `via1`..`via4` (`v1`..`v4`), which matches the default [`Pdk`] naming.
#[derive(Debug, Clone, Default)]
pub struct Sky130Pdk {
    /// Replaces the built-in via rules, eg. for a variant with different pitches.
    rules: Option<RuleTable>,
}

impl Sky130Pdk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a PDK that uses `rules` instead of the built-in via rules.
    pub fn with_rules(rules: RuleTable) -> Self {
        Self { rules: Some(rules) }
    }
}

impl Pdk for Sky130Pdk {
    fn name(&self) -> &'static str {
        "sky130_common"
    }

    fn process(&self) -> &'static str {
        "sky130"
    }

    fn tech_name(&self) -> &'static str {
        constants::MAGIC_TECH
    }

    fn via_rules(&self) -> RuleTable {
        match &self.rules {
            Some(rules) => rules.clone(),
            None => Self::default_via_rules(),
        }
    }
}
