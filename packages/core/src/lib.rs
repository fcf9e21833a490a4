//! odwire-core: push-based OData payload writer engine
//!
//! A stateful writer driver: callers stream high-level write calls (start
//! resource set, start resource, start nested link, write primitive, end)
//! and the engine validates every transition against an entity data model
//! and the protocol rules. Byte production is delegated to a format
//! back-end through the [`writer::FormatBackend`] /
//! [`writer::AsyncFormatBackend`] hook traits; the JSON back-end lives in
//! the `odwire-json` crate.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use odwire_core::edm::{EdmModel, EdmProperty, EdmStructuredType, NavigationSource};
//! use odwire_core::payload::{Resource, ResourceSet};
//! use odwire_core::writer::{ODataWriter, WriterDescriptor, WriterSettings};
//! # fn backend() -> Box<dyn odwire_core::writer::FormatBackend> { unimplemented!() }
//!
//! let model = Arc::new(
//!     EdmModel::new("Container")
//!         .with_type(
//!             EdmStructuredType::entity("NS.Customer")
//!                 .with_key(["Id"])
//!                 .with_property(EdmProperty::structural("Id", "Edm.Int32")),
//!         )
//!         .with_source(NavigationSource::entity_set("Customers", "NS.Customer")),
//! );
//! let mut writer = ODataWriter::new(
//!     model,
//!     WriterSettings::response(),
//!     WriterDescriptor::resource_set(Some("Customers")),
//!     backend(),
//! );
//! writer.start_resource_set(ResourceSet::new())?;
//! writer.start_resource(Resource::new().with_property("Id", 1.into()))?;
//! writer.end()?;
//! writer.end()?;
//! # Ok::<(), odwire_core::error::WriteError>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod edm;
pub mod error;
pub mod payload;
pub mod uri;
pub mod validation;
pub mod writer;

pub use error::{WriteError, WriteErrorKind, WriteResult};
pub use writer::{ODataWriter, WriterDescriptor, WriterSettings};
