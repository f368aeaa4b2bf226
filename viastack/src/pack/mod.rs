//! Via array packing.
//!
//! The packer walks a via stack from the topmost via layer down to the
//! bottommost one. Each layer may grow the working box so that at least one
//! legal via fits; the grown box is carried down as the floor for the layers
//! below it, so the box never shrinks within a request.

use std::fmt::Display;
use std::str::FromStr;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::{with_err_context, ErrorContext, ErrorSource, Result};
use crate::geom::{Dims, Dir, Point, Rect};
use crate::log::{self, Log};
use crate::rules::{LayerRule, RuleTable};


/// A request for a via stack between two metal layers.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ViaRequest {
    /// The bottom metal layer (1-based).
    pub start_layer: usize,
    /// The top metal layer (1-based).
    pub end_layer: usize,
    /// The requested metal box.
    pub dims: Dims,
}

impl ViaRequest {
    pub fn new(start_layer: usize, end_layer: usize, width: i64, height: i64) -> Self {
        Self {
            start_layer,
            end_layer,
            dims: Dims::new(width, height),
        }
    }

    /// Creates a request from user-entered width and height strings.
    ///
    /// Fails with [`ErrorSource::InvalidDimensions`] if either value is not a positive integer.
    pub fn parse(start_layer: usize, end_layer: usize, width: &str, height: &str) -> Result<Self> {
        let width = parse_dim("width", width)?;
        let height = parse_dim("height", height)?;
        Ok(Self::new(start_layer, end_layer, width, height))
    }

    /// Checks the request against the given rule table.
    pub fn validate(&self, rules: &RuleTable) -> Result<()> {
        if self.start_layer >= self.end_layer {
            return Err(ErrorSource::InvalidLayerRange {
                start: self.start_layer,
                end: self.end_layer,
            }
            .into());
        }
        if self.start_layer < 1 {
            return Err(ErrorSource::UnknownLayer(self.start_layer).into());
        }
        if self.end_layer > rules.num_metals() {
            return Err(ErrorSource::UnknownLayer(self.end_layer).into());
        }
        if self.dims.w() <= 0 || self.dims.h() <= 0 {
            return Err(ErrorSource::InvalidDimensions(format!(
                "width and height must be positive (got {})",
                self.dims
            ))
            .into());
        }
        Ok(())
    }

    /// The via layers traversed by this request, topmost first.
    pub fn via_layers(&self) -> impl Iterator<Item = usize> {
        (self.start_layer..self.end_layer).rev()
    }
}

fn parse_dim(name: &str, value: &str) -> Result<i64> {
    let parsed = value.trim().parse::<i64>().map_err(|_| {
        ErrorSource::InvalidDimensions(format!("{name} `{value}` is not an integer"))
    })?;
    if parsed <= 0 {
        return Err(ErrorSource::InvalidDimensions(format!(
            "{name} must be positive (got {parsed})"
        ))
        .into());
    }
    Ok(parsed)
}

/// Decides how to grow a box that can only hold a single via.
///
/// Only applies when both axes are smaller than
/// [`LayerRule::two_via_extent`] after the single-via correction.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default, Serialize, Deserialize)]
pub enum GrowthPolicy {
    /// Grow the wider axis to exactly the two-via extent.
    ///
    /// The axis is chosen from the box carried into the layer, before any
    /// correction. Square boxes grow vertically.
    #[default]
    LargerAxisToThreshold,
    /// Grow the wider axis by one pitch.
    GrowByPitch,
    /// Never grow beyond the single-via correction.
    Disabled,
}

impl FromStr for GrowthPolicy {
    type Err = ErrorSource;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "larger-axis" | "threshold" => Ok(Self::LargerAxisToThreshold),
            "grow-by-pitch" | "pitch" => Ok(Self::GrowByPitch),
            "disabled" | "none" => Ok(Self::Disabled),
            _ => Err(ErrorSource::InvalidArgs(format!(
                "unknown growth policy `{s}`"
            ))),
        }
    }
}

impl Display for GrowthPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LargerAxisToThreshold => write!(f, "larger-axis"),
            Self::GrowByPitch => write!(f, "grow-by-pitch"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// The via array drawn on one via layer.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct LayerPlacement {
    /// The via layer; connects metal `via_layer` to metal `via_layer + 1`.
    pub via_layer: usize,
    /// The rule the array was sized with.
    pub rule: LayerRule,
    /// The box carried into this layer, before any correction.
    pub carried: Dims,
    /// The corrected metal box.
    pub dims: Dims,
    /// Number of vias along the x axis.
    pub count_x: usize,
    /// Number of vias along the y axis.
    pub count_y: usize,
    /// Lower-left corner of the first via, relative to the metal box.
    pub offset: Point,
}

impl LayerPlacement {
    #[inline]
    pub fn bot_metal(&self) -> usize {
        self.via_layer
    }

    #[inline]
    pub fn top_metal(&self) -> usize {
        self.via_layer + 1
    }

    /// The metal box, anchored at the origin.
    #[inline]
    pub fn metal_rect(&self) -> Rect {
        self.dims.into_rect()
    }

    /// The via cells in row-major order, starting from the lower-left via.
    pub fn via_rects(&self) -> Vec<Rect> {
        let pitch = self.rule.min_pitch;
        let size = Dims::square(self.rule.min_via_size);
        let mut rects = Vec::with_capacity(self.count_x * self.count_y);
        for j in 0..self.count_y as i64 {
            for i in 0..self.count_x as i64 {
                let corner = self.offset + Point::new(i * pitch, j * pitch);
                rects.push(Rect::from_corner_dims(corner, size));
            }
        }
        rects
    }

    /// Returns `true` if the via array lies within the metal box with at least
    /// the minimum border on every side.
    ///
    /// Checks the array bounds directly, so it never enumerates the vias.
    pub fn fits(&self) -> bool {
        let rule = &self.rule;
        let axis_fits = |extent: i64, offset: i64, count: usize| -> bool {
            let Ok(count) = i64::try_from(count) else {
                return false;
            };
            if count < 1 || offset < rule.min_border {
                return false;
            }
            (count - 1)
                .checked_mul(rule.min_pitch)
                .and_then(|span| span.checked_add(offset))
                .and_then(|span| span.checked_add(rule.min_via_size))
                .map_or(false, |end| end <= extent - rule.min_border)
        };
        axis_fits(self.dims.w(), self.offset.x, self.count_x)
            && axis_fits(self.dims.h(), self.offset.y, self.count_y)
    }
}

/// A packed via stack.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ViaStack {
    request: ViaRequest,
    /// Ordered from the topmost via layer to the bottommost.
    placements: Vec<LayerPlacement>,
}

impl ViaStack {
    #[inline]
    pub fn request(&self) -> &ViaRequest {
        &self.request
    }

    #[inline]
    pub fn placements(&self) -> &[LayerPlacement] {
        &self.placements
    }

    #[inline]
    pub fn start_layer(&self) -> usize {
        self.request.start_layer
    }

    #[inline]
    pub fn end_layer(&self) -> usize {
        self.request.end_layer
    }

    /// The box of the last processed (bottommost) layer.
    ///
    /// Since growth is monotonic, this is the largest box in the stack.
    pub fn final_dims(&self) -> Dims {
        self.placements
            .last()
            .map(|p| p.dims)
            .unwrap_or(self.request.dims)
    }

    /// Serializes the stack geometry to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Log for ViaStack {
    fn log(&self) {
        log::info!(
            "packed via stack M{}-M{}: requested {}, final {}",
            self.start_layer(),
            self.end_layer(),
            self.request.dims,
            self.final_dims()
        );
        for p in self.placements.iter() {
            log::debug!(
                "  via{} (M{}-M{}): box {}, {}x{} vias at ({}, {})",
                p.via_layer,
                p.bot_metal(),
                p.top_metal(),
                p.dims,
                p.count_x,
                p.count_y,
                p.offset.x,
                p.offset.y
            );
        }
    }
}

/// Packs via arrays for a via stack using a fixed rule table and growth policy.
#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned")]
pub struct Packer {
    rules: RuleTable,
    #[builder(default)]
    policy: GrowthPolicy,
}

impl Packer {
    #[inline]
    pub fn builder() -> PackerBuilder {
        PackerBuilder::default()
    }

    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            policy: GrowthPolicy::default(),
        }
    }

    #[inline]
    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    #[inline]
    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    pub fn pack(&self, request: &ViaRequest) -> Result<ViaStack> {
        pack_with_policy(request, &self.rules, self.policy)
    }
}

/// Packs a via stack with the default [`GrowthPolicy`].
pub fn pack(request: &ViaRequest, rules: &RuleTable) -> Result<ViaStack> {
    pack_with_policy(request, rules, GrowthPolicy::default())
}

/// Packs a via stack, processing via layers from the top down.
pub fn pack_with_policy(
    request: &ViaRequest,
    rules: &RuleTable,
    policy: GrowthPolicy,
) -> Result<ViaStack> {
    request.validate(rules)?;

    let mut dims = request.dims;
    let mut placements = Vec::with_capacity(request.end_layer - request.start_layer);

    for via_layer in request.via_layers() {
        let rule = with_err_context(rules.rule_for(via_layer), || ErrorContext::Pack {
            via_layer,
        })?;
        let placement = with_err_context(pack_layer(via_layer, rule, dims, policy), || {
            ErrorContext::Pack { via_layer }
        })?;
        debug_assert!(placement.fits());
        dims = placement.dims;
        placements.push(placement);
    }

    let stack = ViaStack {
        request: *request,
        placements,
    };
    stack.log();
    Ok(stack)
}

/// Sizes the via array of a single layer, starting from the carried box.
///
/// Fails with [`ErrorSource::InvalidDimensions`] if the box is too large for
/// the rule arithmetic.
fn pack_layer(
    via_layer: usize,
    rule: &LayerRule,
    carried: Dims,
    policy: GrowthPolicy,
) -> Result<LayerPlacement> {
    let overflow = || {
        ErrorSource::InvalidDimensions(format!(
            "box {carried} is too large for the via{via_layer} rules"
        ))
    };

    let wide = carried.wider_dir();
    let mut dims = carried;

    let single = rule.single_via_extent().ok_or_else(overflow)?;
    for dir in [Dir::Horiz, Dir::Vert] {
        let extent = dims.dim_mut(dir);
        if *extent < single {
            *extent = single;
        }
    }

    let double = rule.two_via_extent().ok_or_else(overflow)?;
    if dims.w() < double && dims.h() < double {
        let extent = dims.dim_mut(wide);
        match policy {
            GrowthPolicy::LargerAxisToThreshold => *extent = double,
            GrowthPolicy::GrowByPitch => {
                *extent = extent.checked_add(rule.min_pitch).ok_or_else(overflow)?
            }
            GrowthPolicy::Disabled => {}
        }
    }

    if dims != carried {
        log::debug!("via{via_layer}: grew box from {carried} to {dims}");
    }

    let nx = rule.via_count(dims.w()).ok_or_else(overflow)?;
    let ny = rule.via_count(dims.h()).ok_or_else(overflow)?;
    let offset = Point::new(
        rule.centering_offset(dims.w(), nx).ok_or_else(overflow)?,
        rule.centering_offset(dims.h(), ny).ok_or_else(overflow)?,
    );

    Ok(LayerPlacement {
        via_layer,
        rule: *rule,
        carried,
        dims,
        count_x: usize::try_from(nx).map_err(|_| overflow())?,
        count_y: usize::try_from(ny).map_err(|_| overflow())?,
        offset,
    })
}
