/*!
Topology module

This module defines the GUI-facing topology provider interface and concrete implementations.

Structure:
- `source`: the async `TopologySource` trait and `TopologyError`.
- `http`: `ApiSource`, the `/api/nodes_and_edges` endpoint.
- `file`: `FileSource`, a JSON snapshot in the same wire format.
- `netbox`: `NetboxSource`, which queries NetBox directly and hands the records to `builder`.
- `source_spec`: the configured choice of source.
*/

pub mod builder;
pub mod file;
pub mod http;
pub mod netbox;
pub mod source;
pub mod source_spec;

pub use source::TopologyResult;
pub use source_spec::SourceSpec;
