//! Node skimming
//!
//! Walks the nodes of a document using only their length prefixes. A node
//! body is treated as a list of child nodes when the prefixes inside it tile
//! the body exactly; otherwise it is reported as opaque data.

use netgore_protocol::{Result, ValueReader, NODE_LENGTH_BITS};

const NODE_NAME: &str = "Node";

/// One node found while skimming
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    /// Bit offset of the length prefix, relative to the enclosing body
    pub offset: usize,
    /// Body length in bits
    pub body_bits: usize,
    /// Child nodes, when the body looked like a list of nodes
    pub children: Vec<NodeSummary>,
}

impl NodeSummary {
    /// Total number of nodes in this subtree, this one included
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(NodeSummary::node_count).sum::<usize>()
    }
}

/// Skim the nodes at the reader's level, descending at most `max_depth`
/// levels into bodies made of nodes
///
/// Stops once fewer bits remain than a length prefix needs, which leaves any
/// byte padding at the end of a document unread.
pub fn skim(reader: &mut ValueReader, max_depth: usize) -> Result<Vec<NodeSummary>> {
    let mut nodes = Vec::new();

    while reader.remaining_bits() >= NODE_LENGTH_BITS as usize {
        let offset = reader.position();
        let mut body = reader.read_node(NODE_NAME)?;
        let body_bits = body.bit_len();

        let children = if max_depth > 0 && is_node_list(&body) {
            skim(&mut body, max_depth - 1)?
        } else {
            Vec::new()
        };

        nodes.push(NodeSummary {
            offset,
            body_bits,
            children,
        });
    }

    Ok(nodes)
}

/// True if the body is one or more nodes whose prefixes account for every bit
pub fn is_node_list(body: &ValueReader) -> bool {
    let mut probe = body.clone();
    let mut count = 0;

    while probe.remaining_bits() > 0 {
        if probe.remaining_bits() < NODE_LENGTH_BITS as usize {
            return false;
        }
        if probe.skip_node(NODE_NAME).is_err() {
            return false;
        }
        count += 1;
    }

    count > 0
}
