//! Frame assets: image types, PNG decoding and the themed frame registry.

pub(crate) mod decode;
pub(crate) mod frames;
pub(crate) mod store;
