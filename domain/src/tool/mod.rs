//! Tool domain module
//!
//! Declarative contracts of the functions a model may call, and the calls
//! that survive validation against them.
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │ ToolSet      │───▶│ raw payload  │───▶│ FunctionCall │
//! │ (schemas)    │    │ (model text) │    │ (validated)  │
//! └──────────────┘    └──────────────┘    └──────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`ToolSchema`]: name, description, typed parameters, required list
//! - [`ToolParameter`] / [`ParamType`]: one parameter and its coercion class
//! - [`ToolSet`]: ordered, name-unique collection of schemas
//! - [`FunctionCall`]: a validated `{name, arguments}` pair
//!
//! Schemas serialize to the JSON Schema shape callers supply
//! (`{"name", "description", "parameters": {"type": "object", "properties", "required"}}`)
//! and round-trip without losing keywords the domain does not read.

pub mod call;
pub mod entities;
pub mod set;
mod wire;

pub use call::FunctionCall;
pub use entities::{ParamType, ToolParameter, ToolSchema};
pub use set::ToolSet;
