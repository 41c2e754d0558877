//! XML text helpers shared by the element loader and serializer.

mod escape;

pub use escape::{escape_xml, push_escaped, resolve_entity};
