pub mod builders;
pub mod extension;
pub mod parser;
pub mod types;

pub use crate::extension::{
    default_registry, CallingProduction, Extension, ExtensionData, ExtensionId, ExtensionPayload,
    ForeignData, Registry,
};
pub use crate::parser::ParseResult;
pub use crate::types::*;
