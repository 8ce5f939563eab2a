pub mod assets;
pub mod certification;
pub mod image;
