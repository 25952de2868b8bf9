//! NetGore Inspect
//!
//! Skims the nodes of value documents on disk and logs their layout.
//!
//! ```text
//! netgore-inspect <file>...
//! ```

mod skim;

use std::path::Path;

use netgore_config::{IoConfig, DEFAULT_CONFIG_PATH};
use netgore_protocol::ValueReader;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::skim::{skim, NodeSummary};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Config first so its log level can seed the filter
    let config_result = IoConfig::load_default();
    let config = match &config_result {
        Ok(config) => config.clone(),
        Err(_) => IoConfig::default(),
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match config_result {
        Ok(_) => info!("Loaded configuration from {}", DEFAULT_CONFIG_PATH),
        Err(e) => {
            warn!("Failed to load {}: {}", DEFAULT_CONFIG_PATH, e);
            warn!("Using default configuration");
        }
    }
    config.display();

    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        error!("Usage: netgore-inspect <file>...");
        return Err("no input files".into());
    }

    let mut failed = 0;
    for path in &paths {
        if let Err(e) = inspect_file(Path::new(path), &config) {
            error!("{}: {}", path, e);
            failed += 1;
        }
    }

    if failed > 0 {
        return Err(format!("{} of {} file(s) could not be inspected", failed, paths.len()).into());
    }
    Ok(())
}

fn inspect_file(path: &Path, config: &IoConfig) -> netgore_protocol::Result<()> {
    let mut reader = ValueReader::open_file(path, config.enum_mode())?;
    let total_bits = reader.bit_len();
    let nodes = skim(&mut reader, config.inspect_depth)?;

    info!(
        "{}: {} top-level node(s), {} node(s) total, {} bits",
        path.display(),
        nodes.len(),
        nodes.iter().map(NodeSummary::node_count).sum::<usize>(),
        total_bits
    );
    for (index, node) in nodes.iter().enumerate() {
        log_node(node, index, 1);
    }

    let unread = reader.remaining_bits();
    if unread >= 8 {
        warn!("{}: {} trailing bits are not part of any node", path.display(), unread);
    }
    Ok(())
}

fn log_node(node: &NodeSummary, index: usize, depth: usize) {
    let indent = "  ".repeat(depth);
    if node.children.is_empty() {
        info!(
            "{}[{}] @{}: {} bits",
            indent, index, node.offset, node.body_bits
        );
    } else {
        info!(
            "{}[{}] @{}: {} bits, {} child node(s)",
            indent,
            index,
            node.offset,
            node.body_bits,
            node.children.len()
        );
    }

    for (child_index, child) in node.children.iter().enumerate() {
        log_node(child, child_index, depth + 1);
    }
}
