// Section Registry: render order and visibility of CV sections.

pub mod registry;

pub use registry::{Section, SectionRegistry, SectionType};
