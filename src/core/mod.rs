pub mod clock;
pub mod document;
pub mod entry;
pub mod line;
