//! wirebind: declarative binding, validation, and patching for typed
//! records.
//!
//! Converts wire-format payloads (URL-encoded form data, JSON, XML) into
//! strongly-typed values through a single declarative contract: each
//! destination type describes its fields once (wire names, value kinds,
//! validation rules, custom messages) and the engine decodes, coerces,
//! and validates any of the three formats against that description. A
//! companion subsystem applies RFC 6902 patch documents to an
//! already-bound value and re-runs the same checks.
//!
//! # Example
//!
//! ```
//! use std::sync::OnceLock;
//! use serde::{Deserialize, Serialize};
//! use wirebind::schema::{Described, FieldDescriptor, ScalarKind, TypeDescriptor, TypeTag};
//!
//! #[derive(Debug, Default, Serialize, Deserialize)]
//! #[serde(default)]
//! struct Signup {
//!     name: String,
//!     age: i64,
//! }
//!
//! impl Described for Signup {
//!     fn descriptor() -> &'static TypeDescriptor {
//!         static DESC: OnceLock<TypeDescriptor> = OnceLock::new();
//!         DESC.get_or_init(|| {
//!             TypeDescriptor::new("Signup")
//!                 .field(
//!                     FieldDescriptor::new("name", TypeTag::Scalar(ScalarKind::String))
//!                         .rules("required,minlength=2")
//!                         .expect("Signup.name rules"),
//!                 )
//!                 .field(
//!                     FieldDescriptor::new("age", TypeTag::Scalar(ScalarKind::Integer))
//!                         .rules("min=18")
//!                         .expect("Signup.age rules"),
//!                 )
//!         })
//!     }
//! }
//!
//! let bound = wirebind::bind_form::<Signup>(b"name=Ada&age=36").unwrap();
//! assert!(bound.is_valid());
//! assert_eq!(bound.value.name, "Ada");
//!
//! let bound = wirebind::bind_form::<Signup>(b"name=A&age=12").unwrap();
//! let fields: Vec<_> = bound.errors.iter().map(|e| e.field.as_str()).collect();
//! assert_eq!(fields, vec!["name", "age"]);
//! ```

pub mod assign;
pub mod bind;
pub mod decode;
pub mod error;
pub mod patch;
pub mod schema;
pub mod validate;

pub use bind::{bind, bind_form, bind_json, bind_xml, Bind, Bound};
pub use decode::Format;
pub use error::{BindError, MetadataError};
pub use patch::{apply_patch, apply_patch_request, PatchError, JSON_PATCH_MEDIA_TYPE};
pub use validate::{validate, ValidationError, ValidationErrors};
