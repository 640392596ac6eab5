//! Public library API for descriptor-driven validation and conversion of structured data.

/// Descriptor tables, the conversion interpreter, and the converter facade.
pub mod convert;
