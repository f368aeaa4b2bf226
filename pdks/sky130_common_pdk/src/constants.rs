//! SKY130 via rules in Magic `sky130A` lambda units.

pub const MAGIC_TECH: &str = "sky130A";

pub const VIA1_WIDTH: i64 = 26;
pub const VIA1_PITCH: i64 = 32;
pub const VIA1_BORDER: i64 = 3;

pub const VIA2_WIDTH: i64 = 26;
pub const VIA2_PITCH: i64 = 40;
pub const VIA2_BORDER: i64 = 5;

pub const VIA3_WIDTH: i64 = 32;
pub const VIA3_PITCH: i64 = 40;
pub const VIA3_BORDER: i64 = 5;

pub const VIA4_WIDTH: i64 = 118;
pub const VIA4_PITCH: i64 = 160;
pub const VIA4_BORDER: i64 = 12;

pub const NUM_METALS: usize = 5;
