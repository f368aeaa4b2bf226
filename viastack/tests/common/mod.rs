use sky130_common_pdk::Sky130Pdk;
use viastack::pack::{pack, ViaRequest, ViaStack};
use viastack::pdk::Pdk;

pub fn sky130_stack(start: usize, end: usize, w: i64, h: i64) -> ViaStack {
    pack(
        &ViaRequest::new(start, end, w, h),
        &Sky130Pdk::new().via_rules(),
    )
    .unwrap()
}
