mod builtin;
mod bytes;
mod cache;
mod compile;
mod compression;
mod dict;
mod dump;
mod error;
mod factory;
mod file;
mod global;
mod header;
mod json;
mod path;
mod resources;
mod saved;
mod value;
mod visit;

/// Built-in resource types.
pub use builtin::{DictFactory, DictResource, FileFactory, FileResource};
/// Byte cursor and writer used by the pack codec.
pub use bytes::{Cursor, PackWriter};
/// Cache path and validation helpers.
pub use cache::{default_cache_path, is_resource_cache_updated, load_cached_resources};
/// Resource description compiler.
pub use compile::{
	CacheMode, CompileOptions, LoadContext, LoadResourcesResult, Localizer, RES_DEBUG, RES_FILES, RES_ID_SYMBOLS, RES_NAMESPACE, RES_OUTPUT_FILES,
	RES_SOURCE, load_resources_from_dict, load_resources_from_file, load_resources_from_json, make_symbol_from_name,
};
/// Saved payload compression.
pub use compression::{Compression, compress_bytes, decode_bytes};
/// Dict document type.
pub use dict::{DICT_MAGIC, Dict, Location, PackStruct};
/// Binary extraction visitor.
pub use dump::{DumpOptions, clean_file_name, extract_binaries};
/// Error and result aliases.
pub use error::{PackError, Result};
/// Factory protocol and registry.
pub use factory::{FactoryRegistry, ResourceFactory, ResourceObject};
/// Pack file IO.
pub use file::{PackFile, combine_packs, encode_pack, read_pack, write_pack};
/// Current snapshot holder.
pub use global::GlobalResources;
/// Rust source emitters.
pub use header::{write_header_source, write_symbol_source};
/// JSON text conversion.
pub use json::{json_parse, json_write};
/// Deep path parser types.
pub use path::{DictPath, PathStep};
/// Runtime resource container.
pub use resources::{ResourceHandle, ResourceObjects};
/// Saved payload types.
pub use saved::{SavedData, SavedKind};
/// Value model.
pub use value::{DictValue, FromValue, Value, ValueKind};
/// Tree visitor.
pub use visit::{DictVisitor, VisitContext, VisitStep, Visited, descend_dict, descend_value, transform_tree, visit_dict};

pub(crate) use compile::{RES_PREFIX, RES_TYPE};
pub(crate) use value::format_number;
