//! Dialect conversion between PostgreSQL and Oracle.
//!
//! Three layers, each usable on its own:
//!
//! - [`convert_type`]: column type names ([`typemap`])
//! - [`convert_value`]: scalar value tokens ([`value`])
//! - [`convert_insert`] and script rendering ([`render`])
//!
//! Conversion tables are defined as matched pairs: every forward type mapping
//! has an inverse that resolves to a representative canonical type (several
//! source types may collapse to one target type; the round trip lands in the
//! same equivalence class, not necessarily the identical literal).

mod render;
mod typemap;
mod value;

pub use render::{
    convert_insert, missing_records_file_name, render_missing_records_script,
    render_table_script, script_file_name, sequence_ddl, sequence_name,
};
pub use typemap::convert_type;
pub use value::convert_value;
