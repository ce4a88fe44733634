//! Core data types for the console parameter tree
//!
//! - [`NodeData`]: current value of a value-holding node
//! - [`NodeDefinition`]: metadata record describing a node
//! - [`ConsoleEvent`]: what the read loop yields to the application

mod data;
mod definition;

pub use data::NodeData;
pub use definition::{FloatEnumItem, NodeDefinition, NodeType, NodeUnit, StringEnumItem};

/// One decoded event from the console stream
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleEvent {
    /// A node's value changed (or was reported for the first time)
    NodeData { id: u32, data: NodeData },
    /// A node-definition record arrived
    NodeDefinition(NodeDefinition),
    /// The console finished answering an enumeration request
    RequestEnd,
}
