pub mod asset_store;
pub mod catalog;
pub mod codec;
pub mod gallery;
pub mod pipeline;
pub mod variant_set;
