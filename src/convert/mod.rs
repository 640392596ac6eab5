mod codec;
mod converter;
mod descriptor;
mod error;
mod path;
mod props;
mod table;
mod timestamp;
mod transform;

/// Text notations and the parse/render steps around conversion.
pub use codec::{InputFormat, parse_text, render_text};
/// Table-backed decode/encode facade.
pub use converter::Converter;
/// Descriptor language.
pub use descriptor::{Descriptor, FieldDescriptor, ObjectDescriptor, ObjectId, Primitive};
/// Error and result aliases.
pub use error::{ConversionError, ConvertError, Result};
/// Field path breadcrumbs carried by conversion errors.
pub use path::{FieldPath, PathStep};
/// Field-name mapping cache and direction selector.
pub use props::{Direction, FieldMap, FieldMapping, PropertyCache};
/// Named descriptor table and its builder.
pub use table::{DescriptorTable, DescriptorTableBuilder};
/// Timestamp parsing for the date descriptor.
pub use timestamp::Timestamp;
/// Conversion options.
pub use transform::ConvertOptions;
