//! Magic command script encoding.

use serde::{Deserialize, Serialize};

use super::Encode;
use crate::pack::LayerPlacement;
use crate::pdk::{LayerForm, Pdk};

/// Paints each via layer with Magic's box and `paint` commands.
///
/// The cursor box starts and ends every layer at the origin, so layers can
/// be emitted back to back.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MagicScript;

impl Encode for MagicScript {
    fn extension(&self) -> &'static str {
        "tcl"
    }

    fn encode(&self, placements: &[LayerPlacement], pdk: &dyn Pdk) -> Vec<String> {
        let mut commands = Vec::new();
        for p in placements {
            let pitch = p.rule.min_pitch;
            let size = p.rule.min_via_size;
            let via = pdk.via_layer(p.via_layer, LayerForm::Short);

            commands.push(format!("box size {} {}", p.dims.w(), p.dims.h()));
            commands.push(format!(
                "paint {}",
                pdk.metal_layer(p.bot_metal(), LayerForm::Short)
            ));
            commands.push(format!(
                "paint {}",
                pdk.metal_layer(p.top_metal(), LayerForm::Short)
            ));

            commands.push(format!("box size {size} {size}"));
            commands.push(format!("move u {}", p.offset.y));
            commands.push(format!("move r {}", p.offset.x));

            for _ in 0..p.count_y {
                for _ in 0..p.count_x {
                    commands.push(format!("paint {via}"));
                    commands.push(format!("move r {pitch}"));
                }
                commands.push(format!("move l {}", pitch * p.count_x as i64));
                commands.push(format!("move u {pitch}"));
            }

            commands.push(format!(
                "move d {}",
                pitch * p.count_y as i64 + p.offset.y
            ));
            commands.push(format!("move l {}", p.offset.x));
        }
        commands
    }
}
