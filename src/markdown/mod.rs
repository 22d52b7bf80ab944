pub mod parser;
pub mod writer;

pub use parser::MarkdownParser;
pub use writer::MarkdownWriter;
