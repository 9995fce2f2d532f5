// Grant report pipeline.
// Implements: grant text parsing, report tree building, DOCX serialization.
// Content logic (builder) never touches a file format; backends never decide content.

pub mod builder;
pub mod document;
pub mod docx;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod render;

pub use render::ReportRenderer;
