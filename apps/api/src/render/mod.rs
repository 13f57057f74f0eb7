// Markup generation: section fragments and assembled page containers.
// Pure functions only; pagination decisions come from `layout`.

pub mod assembler;
pub mod escape;
pub mod sections;

pub use assembler::{assemble_pages, AssembleOptions};
pub use sections::{render_sections, SectionFragments};
