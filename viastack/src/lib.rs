//! DRC-aware via stack generation.
//!
//! A [`ViaRequest`](pack::ViaRequest) names a range of metal layers and a
//! requested bounding box. The [packer](pack) sizes a legal via array for
//! every via layer in the range, and the [emitters](emit) turn the result
//! into Magic artifacts.

pub mod deps;
pub mod emit;
pub mod error;
pub mod geom;
pub mod io;
pub mod pack;
pub mod pdk;
pub mod rules;

pub(crate) mod log;
