//! Magic `.mag` layout encoding.

use serde::{Deserialize, Serialize};

use super::Encode;
use crate::geom::Rect;
use crate::pack::LayerPlacement;
use crate::pdk::{LayerForm, Pdk};

/// Writes the stack as a static Magic layout.
///
/// Layer sections are ordered from the topmost metal down to the bottommost
/// metal, with each via layer between the two metals it connects. Every
/// rectangle is in absolute coordinates with the metal boxes anchored at the
/// origin.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct MagFile;

#[derive(Debug, Default)]
struct Sections {
    sections: Vec<(String, Vec<Rect>)>,
}

impl Sections {
    fn add(&mut self, layer: String, rect: Rect) {
        let i = match self.sections.iter().position(|(name, _)| *name == layer) {
            Some(i) => i,
            None => {
                self.sections.push((layer, Vec::new()));
                self.sections.len() - 1
            }
        };
        let rects = &mut self.sections[i].1;
        if !rects.contains(&rect) {
            rects.push(rect);
        }
    }
}

impl Encode for MagFile {
    fn extension(&self) -> &'static str {
        "mag"
    }

    fn encode(&self, placements: &[LayerPlacement], pdk: &dyn Pdk) -> Vec<String> {
        let mut sections = Sections::default();
        for p in placements {
            let metal = p.metal_rect();
            sections.add(pdk.metal_layer(p.top_metal(), LayerForm::Long), metal);
            let via = pdk.via_layer(p.via_layer, LayerForm::Long);
            for rect in p.via_rects() {
                sections.add(via.clone(), rect);
            }
            sections.add(pdk.metal_layer(p.bot_metal(), LayerForm::Long), metal);
        }

        let mut lines = vec![
            "magic".to_string(),
            format!("tech {}", pdk.tech_name()),
            "timestamp 0".to_string(),
        ];
        for (layer, rects) in sections.sections {
            lines.push(format!("<< {layer} >>"));
            lines.extend(rects.into_iter().map(|r| {
                format!(
                    "rect {} {} {} {}",
                    r.left(),
                    r.bottom(),
                    r.right(),
                    r.top()
                )
            }));
        }
        lines.push("<< end >>".to_string());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::tests::{stack, TestPdk};

    #[test]
    fn two_layer_stack() {
        let stack = stack(1, 3, 200, 60);
        let body = MagFile.encode(stack.placements(), &TestPdk);

        let mut expected = vec![
            "magic",
            "tech testtech",
            "timestamp 0",
            "<< metal3 >>",
            "rect 0 0 200 60",
            "<< via2 >>",
        ]
        .into_iter()
        .map(String::from)
        .collect::<Vec<_>>();
        for i in 0..5 {
            expected.push(format!("rect {} 17 {} 43", 7 + 40 * i, 33 + 40 * i));
        }
        expected.push("<< metal2 >>".to_string());
        expected.push("rect 0 0 200 60".to_string());
        expected.push("<< via1 >>".to_string());
        for i in 0..6 {
            expected.push(format!("rect {} 17 {} 43", 7 + 32 * i, 33 + 32 * i));
        }
        expected.push("<< metal1 >>".to_string());
        expected.push("rect 0 0 200 60".to_string());
        expected.push("<< end >>".to_string());

        assert_eq!(body, expected);
    }

    #[test]
    fn shared_metal_box_is_not_repeated() {
        // via2 sizes the box to 36x102; via1 keeps it, so metal2 holds a single rect.
        let stack = stack(1, 3, 10, 10);
        let body = MagFile.encode(stack.placements(), &TestPdk);

        let sections = body
            .iter()
            .filter(|line| line.starts_with("<<"))
            .cloned()
            .collect::<Vec<_>>();
        assert_eq!(
            sections,
            vec![
                "<< metal3 >>",
                "<< via2 >>",
                "<< metal2 >>",
                "<< via1 >>",
                "<< metal1 >>",
                "<< end >>"
            ]
        );

        let metal2 = body
            .iter()
            .skip_while(|line| *line != "<< metal2 >>")
            .skip(1)
            .take_while(|line| line.starts_with("rect"))
            .count();
        assert_eq!(metal2, 1);
    }
}
