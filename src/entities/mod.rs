pub mod prelude;

pub mod pictures;
