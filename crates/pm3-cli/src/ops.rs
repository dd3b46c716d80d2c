//! `pm3 ops`: the dispatch tables of both contracts.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use serde_json::json;

use pm3_custody::{CustodyConfig, PackageContract};
use pm3_ledger::{Chaincode, OperationInfo};
use pm3_registry::{RegistryConfig, RoleAuthContract};

/// Arguments for `pm3 ops`.
#[derive(Args, Debug, Default)]
pub struct OpsArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Execute the ops subcommand.
pub fn run_ops(args: &OpsArgs, out: &mut impl Write) -> Result<u8> {
    let registry = RegistryConfig::default();
    let custody = PackageContract::new(&CustodyConfig::default(), &registry);
    let roleauth = RoleAuthContract::new(&registry);
    let chaincodes: [&dyn Chaincode; 2] = [&custody, &roleauth];

    if args.json {
        let tables: Vec<_> = chaincodes
            .iter()
            .map(|cc| json!({ "chaincode": cc.name(), "operations": cc.operations() }))
            .collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&tables)?)?;
        return Ok(0);
    }

    for cc in chaincodes {
        writeln!(out, "{}", cc.name())?;
        for op in cc.operations() {
            write_row(out, &op)?;
        }
        writeln!(out)?;
    }
    Ok(0)
}

fn write_row(out: &mut impl Write, op: &OperationInfo) -> std::io::Result<()> {
    let permission = op.permission.map(|p| p.as_str()).unwrap_or("-");
    writeln!(out, "  {:<32} {:<3} {}", op.name, op.mode.as_str(), permission)
}
