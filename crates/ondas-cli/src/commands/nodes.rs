//! Node type listing command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use ondas_nodes::{NodeDescriptor, NodeKind, ParamSpec};

#[derive(Args)]
pub struct NodesArgs {
    /// Show details for a specific node type
    #[arg(value_name = "TYPE")]
    node_type: Option<String>,

    /// Print descriptors as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: NodesArgs) -> anyhow::Result<()> {
    if let Some(id) = &args.node_type {
        let kind = NodeKind::from_id(&id.to_ascii_lowercase())
            .ok_or_else(|| anyhow::anyhow!("Unknown node type: {}", id))?;
        let descriptor = kind.descriptor();

        if args.json {
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
        } else {
            print_details(&descriptor);
        }
        return Ok(());
    }

    let descriptors: Vec<NodeDescriptor> =
        NodeKind::ALL.iter().map(NodeKind::descriptor).collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&descriptors)?);
        return Ok(());
    }

    println!("Available Node Types");
    println!("====================");
    println!();
    for descriptor in &descriptors {
        println!("  {:15} - {}", descriptor.id, descriptor.description);
    }
    println!();
    println!("Use 'ondas nodes <type>' for detailed param info.");

    Ok(())
}

fn print_details(descriptor: &NodeDescriptor) {
    println!("{} ({})", descriptor.name, descriptor.id);
    println!("{}", "=".repeat(descriptor.name.len() + descriptor.id.len() + 3));
    println!();
    println!("{}", descriptor.description);
    println!();
    println!("Inputs: {}  Outputs: {}", descriptor.inputs, descriptor.outputs);
    println!();

    if descriptor.params.is_empty() {
        println!("No connectable params.");
        return;
    }

    println!("Params:");
    println!();
    println!("  {:14}  {:10}  {}", "Name", "Default", "Range");
    println!("  {:14}  {:10}  {}", "----", "-------", "-----");
    for param in descriptor.params {
        let default = format!("{}{}", param.default, param.unit.suffix());
        println!(
            "  {:14}  {:10}  {}",
            param.name,
            default,
            format_range(param)
        );
    }
    println!();
    println!("Connect to a param with: to = \"<id>.{}\"", descriptor.params[0].name);
}

fn format_range(param: &ParamSpec) -> String {
    if param.min == f32::MIN && param.max == f32::MAX {
        "unbounded".to_string()
    } else {
        format!("{} to {}", param.min, param.max)
    }
}
