pub mod files;
pub mod status;
pub mod upload;
