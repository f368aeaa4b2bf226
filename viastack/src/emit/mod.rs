//! Conversion of packed via stacks into Magic artifacts.
//!
//! Two encodings are available:
//!
//! * [`MagicScript`] produces Magic commands that paint the stack with a
//!   moving cursor box. All moves are relative.
//! * [`MagFile`] produces a static `.mag` layout with absolute rectangles,
//!   anchored at the origin.
//!
//! Both consume the same [`LayerPlacement`]s, so adding an encoding does not
//! touch the packer.

use std::fmt::Display;
use std::str::FromStr;

use arcstr::ArcStr;
use enum_dispatch::enum_dispatch;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::geom::Dims;
use crate::pack::{LayerPlacement, ViaStack};
use crate::pdk::Pdk;

pub mod mag;
pub mod script;

pub use mag::MagFile;
pub use script::MagicScript;

/// A trait implemented by via stack encodings.
#[enum_dispatch]
pub trait Encode {
    /// The file extension of artifacts in this encoding, without a leading dot.
    fn extension(&self) -> &'static str;

    /// Encodes placements, ordered from the topmost via layer down, as text records.
    fn encode(&self, placements: &[LayerPlacement], pdk: &dyn Pdk) -> Vec<String>;
}

/// An enumeration of supported encodings.
#[enum_dispatch(Encode)]
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    MagicScript,
    MagFile,
}

impl Default for Encoding {
    #[inline]
    fn default() -> Self {
        Self::MagFile(MagFile)
    }
}

impl FromStr for Encoding {
    type Err = ErrorSource;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "script" | "magic-script" | "tcl" => Ok(Self::MagicScript(MagicScript)),
            "mag" | "magic" | "layout" => Ok(Self::MagFile(MagFile)),
            _ => Err(ErrorSource::UnsupportedEncoding(s.to_string())),
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MagicScript(_) => write!(f, "script"),
            Self::MagFile(_) => write!(f, "mag"),
        }
    }
}

/// A named, encoded via stack.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct Artifact {
    /// The canonical name; see [`artifact_name`].
    pub name: ArcStr,
    /// The file extension, without a leading dot.
    pub extension: ArcStr,
    /// The encoded records, one per line.
    pub body: Vec<String>,
}

impl Artifact {
    /// The artifact name with its extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }

    /// The body as newline-terminated text.
    pub fn contents(&self) -> String {
        let mut out = self.body.iter().join("\n");
        out.push('\n');
        out
    }
}

/// The canonical name of a via stack between `start_layer` and `end_layer` with final size `dims`.
pub fn artifact_name(start_layer: usize, end_layer: usize, dims: Dims) -> ArcStr {
    arcstr::format!(
        "viaM{}M{}W{}H{}",
        start_layer,
        end_layer,
        dims.w(),
        dims.h()
    )
}

/// Encodes a packed via stack.
pub fn emit(stack: &ViaStack, encoding: &Encoding, pdk: &dyn Pdk) -> Artifact {
    Artifact {
        name: artifact_name(stack.start_layer(), stack.end_layer(), stack.final_dims()),
        extension: ArcStr::from(encoding.extension()),
        body: encoding.encode(stack.placements(), pdk),
    }
}

/// Encodes a packed via stack using the encoding called `encoding`.
pub fn emit_named(stack: &ViaStack, encoding: &str, pdk: &dyn Pdk) -> Result<Artifact> {
    let encoding = with_err_context(encoding.parse::<Encoding>(), || ErrorContext::Emit {
        name: artifact_name(stack.start_layer(), stack.end_layer(), stack.final_dims())
            .to_string(),
    })?;
    Ok(emit(stack, &encoding, pdk))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pack::{pack, ViaRequest};
    use crate::rules::{LayerRule, RuleTable};

    pub(crate) struct TestPdk;

    impl Pdk for TestPdk {
        fn name(&self) -> &'static str {
            "test"
        }
        fn process(&self) -> &'static str {
            "test"
        }
        fn tech_name(&self) -> &'static str {
            "testtech"
        }
        fn via_rules(&self) -> RuleTable {
            RuleTable::new(vec![
                LayerRule::new(26, 32, 3),
                LayerRule::new(26, 40, 5),
                LayerRule::new(32, 40, 5),
                LayerRule::new(118, 160, 12),
            ])
            .unwrap()
        }
    }

    pub(crate) fn stack(start: usize, end: usize, w: i64, h: i64) -> ViaStack {
        pack(&ViaRequest::new(start, end, w, h), &TestPdk.via_rules()).unwrap()
    }

    #[test]
    fn name_uses_final_dims() {
        let stack = stack(1, 5, 10, 10);
        let artifact = emit(&stack, &Encoding::default(), &TestPdk);
        assert_eq!(artifact.name, "viaM1M5W142H420");
        assert_eq!(artifact.file_name(), "viaM1M5W142H420.mag");
    }

    #[test]
    fn emission_is_idempotent() {
        for encoding in [Encoding::from(MagicScript), Encoding::from(MagFile)] {
            let a = emit(&stack(1, 3, 200, 60), &encoding, &TestPdk);
            let b = emit(&stack(1, 3, 200, 60), &encoding, &TestPdk);
            assert_eq!(a, b);
            assert_eq!(a.name, "viaM1M3W200H60");
        }
    }

    #[test]
    fn parses_encoding_names() {
        assert_eq!(
            "script".parse::<Encoding>().unwrap(),
            Encoding::MagicScript(MagicScript)
        );
        assert_eq!(" MAG ".parse::<Encoding>().unwrap(), Encoding::MagFile(MagFile));

        let err = emit_named(&stack(1, 2, 40, 40), "gds", &TestPdk).unwrap_err();
        assert!(matches!(err.source(), ErrorSource::UnsupportedEncoding(e) if e == "gds"));

        let artifact = emit_named(&stack(1, 2, 40, 40), "tcl", &TestPdk).unwrap();
        assert_eq!(artifact.extension, "tcl");
    }

    #[test]
    fn contents_are_newline_terminated() {
        let artifact = Artifact {
            name: arcstr::literal!("x"),
            extension: arcstr::literal!("tcl"),
            body: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(artifact.contents(), "a\nb\n");
    }
}
