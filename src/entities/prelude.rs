pub use super::pictures::Entity as Pictures;
