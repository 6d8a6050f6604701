//! Named, parameterized prompt definitions.
//!
//! - **Template**: [`Template`] entity, placeholder formatting, record round-trip
//! - **Built-ins**: the six templates every store starts with
//! - **Store**: [`TemplateStore`]: CRUD, filter, search, JSON persistence

mod builtin;
pub mod store;
pub mod template;

pub use builtin::default_templates;
pub use store::{LoadReport, TemplateFilter, TemplateStore};
pub use template::{DEFAULT_STYLE, ParamValue, Parameters, Template, TemplateError};
