pub mod form;
pub mod list;
pub mod manage;
pub mod types;
pub mod upload;

pub use types::*;

pub use list::{list_pictures, picture_facets};
pub use manage::{delete_picture, delete_picture_json};
pub use upload::{create_picture, update_picture, update_picture_form};
