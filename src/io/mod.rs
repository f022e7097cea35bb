//! Mesh input and output in the native text format.

pub mod text;

pub use text::{read_mesh, read_mesh_str, write_mesh, write_mesh_string};
