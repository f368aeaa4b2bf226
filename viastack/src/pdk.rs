//! Process design kit integration.

use crate::rules::RuleTable;

/// Which spelling of a Magic layer name to use.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum LayerForm {
    /// Abbreviated names accepted by Magic's `paint` command (eg. `m2`, `v1`).
    Short,
    /// Full names used in `.mag` layer sections (eg. `metal2`, `via1`).
    Long,
}

pub trait Pdk {
    fn name(&self) -> &'static str;

    fn process(&self) -> &'static str;

    /// The Magic technology name written into `.mag` headers.
    fn tech_name(&self) -> &'static str;

    /// The via rules of this process.
    fn via_rules(&self) -> RuleTable;

    /// The Magic name of metal layer `idx` (1-based).
    fn metal_layer(&self, idx: usize, form: LayerForm) -> String {
        match form {
            LayerForm::Short => format!("m{idx}"),
            LayerForm::Long => format!("metal{idx}"),
        }
    }

    /// The Magic name of via layer `idx`, which connects metal `idx` and metal `idx + 1`.
    fn via_layer(&self, idx: usize, form: LayerForm) -> String {
        match form {
            LayerForm::Short => format!("v{idx}"),
            LayerForm::Long => format!("via{idx}"),
        }
    }
}
