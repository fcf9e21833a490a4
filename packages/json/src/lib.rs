//! odwire-json: OData JSON format back-end
//!
//! Implements the `odwire-core` hook surface for the OData JSON format:
//! payload structure, control annotations (`@odata.context`, `@odata.type`,
//! `@odata.id`, paging links), delta entries, and base64 binary values.
//! Output buffers in memory and reaches the caller-supplied sink on flush.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use odwire_core::edm::{EdmModel, EdmStructuredType, NavigationSource};
//! use odwire_core::payload::ResourceSet;
//! use odwire_core::writer::{ODataWriter, WriterDescriptor, WriterSettings};
//! use odwire_json::{JsonFormatBackend, JsonWriterOptions};
//!
//! let model = Arc::new(
//!     EdmModel::new("Container")
//!         .with_type(EdmStructuredType::entity("NS.Customer"))
//!         .with_source(NavigationSource::entity_set("Customers", "NS.Customer")),
//! );
//! let backend = JsonFormatBackend::new(
//!     Box::new(Vec::<u8>::new()),
//!     JsonWriterOptions::new(),
//! );
//! let mut writer = ODataWriter::new(
//!     model,
//!     WriterSettings::response(),
//!     WriterDescriptor::resource_set(Some("Customers")),
//!     Box::new(backend),
//! );
//! writer.start_resource_set(ResourceSet::new())?;
//! writer.end()?;
//! # Ok::<(), odwire_core::error::WriteError>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

mod backend;
mod metadata;
mod text;

pub use backend::{AsyncJsonFormatBackend, JsonFormatBackend, JsonWriterOptions};
pub use metadata::ContextUrlBuilder;
pub use text::JsonTextWriter;
