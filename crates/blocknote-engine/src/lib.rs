pub mod collaborators;
pub mod editing;
pub mod io;
pub mod models;
pub mod render;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use collaborators::*;
pub use editing::*;
pub use io::*;
pub use models::*;
pub use render::{
    ActivityEntry, Heading, PulldownMarkdown, RenderOutput, RenderedBlock, TemplateEngine,
    TemplateError, extract_headings, render_store,
};
