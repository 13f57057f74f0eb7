pub mod draft;
pub mod profile;
