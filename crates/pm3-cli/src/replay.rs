//! # Scenario Replay
//!
//! `pm3 replay <scenario.yaml>` stands up a fresh in-memory ledger with
//! `roleauth` and `pm3package` installed and runs a scripted list of
//! transactions against it, one JSON receipt per line on stdout.
//!
//! ```yaml
//! clock: "2026-01-01T00:00:00Z"
//! steps:
//!   - org: PM3MSP
//!     contract: roleauth
//!     function: Bootstrap
//!   - org: OrgA
//!     function: CreatePackage
//!     args: [PKG-1]
//!     transient:
//!       pii: { name: "Ada", phone: "+44 20 7946 0000" }
//!       packageDetails: { ... }
//!   - org: OrgA
//!     function: ReadPackageDetailsAndPII
//!     args: [PKG-1]
//!     query: true
//!     save: storeObject
//!   - org: OrgA
//!     function: ExecuteTransfer
//!     args: [PKG-1, 6f9619ff-8b86-d011-b42d-00c04fc964ff]
//!     transient:
//!       storeObject: $storeObject
//!     advance: 30
//!     expect: Expired
//! ```
//!
//! `contract` defaults to `pm3package`. `query: true` evaluates without
//! committing. `advance` moves the ledger clock forward before the step
//! runs. `save` keeps the step's JSON payload under a name, and a transient
//! value `$name` substitutes it. `expect` names the error kind the step
//! must fail with; any other outcome counts as a failure.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;
use serde_json::{json, Value};

use pm3_core::{OrgId, Timestamp};
use pm3_custody::CHAINCODE_NAME;
use pm3_ledger::{BroadcastMessage, Broadcaster, ContractError, MemoryLedger, Proposal, Receipt};

use crate::broadcast::TracingBroadcaster;
use crate::network::{build_ledger, NetworkArgs};

/// Arguments for `pm3 replay`.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Scenario file (YAML).
    pub scenario: PathBuf,

    /// Stop at the first step whose outcome differs from its expectation.
    #[arg(long)]
    pub fail_fast: bool,

    #[command(flatten)]
    pub network: NetworkArgs,
}

/// A scripted list of transactions.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Pinned ledger time at the start of the run.
    #[serde(default)]
    pub clock: Option<Timestamp>,
    pub steps: Vec<Step>,
}

/// One transaction of a scenario.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub org: OrgId,
    #[serde(default = "default_contract")]
    pub contract: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default)]
    pub transient: BTreeMap<String, Value>,
    #[serde(default)]
    pub query: bool,
    /// Seconds to advance the ledger clock before running.
    #[serde(default)]
    pub advance: Option<i64>,
    /// Name under which to keep the JSON payload.
    #[serde(default)]
    pub save: Option<String>,
    /// Error kind the step must fail with.
    #[serde(default)]
    pub expect: Option<String>,
}

fn default_contract() -> String {
    CHAINCODE_NAME.to_string()
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }
}

/// Execute the replay subcommand.
pub fn run_replay(args: &ReplayArgs, out: &mut impl Write) -> Result<u8> {
    let scenario = Scenario::load(&args.scenario)?;
    let (registry, custody) = args.network.load()?;
    let ledger = build_ledger(&registry, &custody);
    if let Some(clock) = scenario.clock {
        ledger.set_time(clock);
    }

    let mut replay = Replay::new(ledger, TracingBroadcaster);
    let mut failures = 0usize;
    for (index, step) in scenario.steps.iter().enumerate() {
        let line = replay.run_step(index + 1, step)?;
        let passed = line["passed"].as_bool().unwrap_or(false);
        writeln!(out, "{line}")?;
        if !passed {
            failures += 1;
            if args.fail_fast {
                break;
            }
        }
    }

    tracing::info!(
        steps = scenario.steps.len(),
        failures,
        height = replay.ledger.height(),
        "replay finished"
    );
    Ok(if failures == 0 { 0 } else { 1 })
}

// ─── Runner ──────────────────────────────────────────────────────────

/// Replay state: the ledger, saved payloads and the event sink.
pub struct Replay<B> {
    ledger: MemoryLedger,
    saved: BTreeMap<String, Value>,
    broadcaster: B,
}

impl<B: Broadcaster> Replay<B> {
    pub fn new(ledger: MemoryLedger, broadcaster: B) -> Self {
        Self {
            ledger,
            saved: BTreeMap::new(),
            broadcaster,
        }
    }

    pub fn ledger(&self) -> &MemoryLedger {
        &self.ledger
    }

    /// Run one step and describe its outcome as a JSON object.
    ///
    /// Contract errors are outcomes, not failures of the replay itself;
    /// only a malformed step returns `Err`.
    pub fn run_step(&mut self, number: usize, step: &Step) -> Result<Value> {
        if let Some(secs) = step.advance {
            self.ledger
                .advance_time(secs)
                .with_context(|| format!("step {number}: cannot advance the clock by {secs}s"))?;
        }
        let proposal = self.proposal(step)?;
        tracing::debug!(step = number, ?proposal, "submitting");

        let outcome = if step.query {
            self.ledger.evaluate(&proposal).map(|payload| (payload, None))
        } else {
            self.ledger.submit(&proposal).map(|receipt| {
                self.forward(&receipt);
                let committed = json!({ "txId": receipt.tx_id, "block": receipt.block });
                (receipt.payload, Some((committed, receipt.event)))
            })
        };

        let mut line = json!({
            "step": number,
            "org": step.org,
            "contract": step.contract,
            "function": step.function,
        });
        let passed = match outcome {
            Ok((payload, committed)) => {
                let payload = decode_payload(&payload);
                if let Some(name) = &step.save {
                    self.saved.insert(name.clone(), payload.clone());
                }
                if let Some((tx, event)) = committed {
                    line["tx"] = tx;
                    if let Some(event) = event {
                        line["event"] = json!({
                            "name": event.name,
                            "payload": decode_payload(&event.payload),
                        });
                    }
                }
                line["payload"] = payload;
                step.expect.is_none()
            }
            Err(err) => {
                let passed = step.expect.as_deref() == Some(err.kind().as_str());
                line["error"] = describe(&err);
                passed
            }
        };
        if let Some(expected) = &step.expect {
            line["expect"] = json!(expected);
        }
        line["passed"] = json!(passed);
        Ok(line)
    }

    fn proposal(&self, step: &Step) -> Result<Proposal> {
        let mut proposal = Proposal::new(step.org.clone(), &step.contract, &step.function)
            .args(step.args.iter().cloned());
        for (name, value) in &step.transient {
            let value = self.resolve(value)?;
            proposal = proposal.transient_json(name, value);
        }
        Ok(proposal)
    }

    fn resolve<'a>(&'a self, value: &'a Value) -> Result<&'a Value> {
        match value.as_str().and_then(|s| s.strip_prefix('$')) {
            Some(name) => match self.saved.get(name) {
                Some(saved) => Ok(saved),
                None => bail!("no saved payload named {name:?}"),
            },
            None => Ok(value),
        }
    }

    fn forward(&self, receipt: &Receipt) {
        let Some(event) = &receipt.event else {
            return;
        };
        let delivered = BroadcastMessage::from_event(event)
            .and_then(|message| self.broadcaster.broadcast(&message));
        if let Err(e) = delivered {
            tracing::warn!(tx_id = %receipt.tx_id, event = %event.name, error = %e, "broadcast failed");
        }
    }
}

/// JSON payloads are embedded as JSON, everything else as a string.
fn decode_payload(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

fn describe(err: &ContractError) -> Value {
    json!({ "kind": err.kind().as_str(), "message": err.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use pm3_ledger::BroadcastError;

    #[derive(Default)]
    struct Collect(RefCell<Vec<BroadcastMessage>>);

    impl Broadcaster for &Collect {
        fn broadcast(&self, message: &BroadcastMessage) -> Result<(), BroadcastError> {
            self.0.borrow_mut().push(message.clone());
            Ok(())
        }
    }

    fn step(yaml: &str) -> Step {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn ledger() -> MemoryLedger {
        build_ledger(&Default::default(), &Default::default())
    }

    #[test]
    fn contract_defaults_to_custody() {
        let s = step("{ org: OrgA, function: PackageExists, args: [PKG-1] }");
        assert_eq!(s.contract, "pm3package");
        assert!(!s.query);
    }

    #[test]
    fn unknown_step_fields_are_rejected() {
        assert!(serde_yaml::from_str::<Step>("{ org: OrgA, function: X, colour: red }").is_err());
    }

    #[test]
    fn committed_steps_report_tx_and_event() {
        let sink = Collect::default();
        let mut replay = Replay::new(ledger(), &sink);
        let line = replay
            .run_step(1, &step("{ org: PM3MSP, contract: roleauth, function: Bootstrap }"))
            .unwrap();
        assert_eq!(line["passed"], true);
        assert_eq!(line["tx"]["block"], 1);
        assert_eq!(line["event"]["name"], "RegistryBootstrapped");

        let messages = sink.0.borrow();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].datatype.name, "roleauth.RegistryBootstrapped");
    }

    #[test]
    fn expected_errors_pass_and_unexpected_ones_fail() {
        let mut replay = Replay::new(ledger(), TracingBroadcaster);
        let read = "{ org: OrgA, function: ReadBlockchainPackage, args: [PKG-9], query: true";

        let line = replay.run_step(1, &step(&format!("{read}, expect: NotFound }}"))).unwrap();
        assert_eq!(line["passed"], true);
        assert_eq!(line["error"]["kind"], "NotFound");

        let line = replay.run_step(2, &step(&format!("{read} }}"))).unwrap();
        assert_eq!(line["passed"], false);

        let line = replay
            .run_step(3, &step("{ org: OrgA, function: PackageExists, args: [PKG-9], query: true, expect: NotFound }"))
            .unwrap();
        assert_eq!(line["payload"], false);
        assert_eq!(line["passed"], false);
    }

    #[test]
    fn out_of_range_clock_advance_is_a_replay_error() {
        let mut replay = Replay::new(ledger(), TracingBroadcaster);
        replay.ledger().set_time(Timestamp::parse("2026-01-01T00:00:00Z").unwrap());
        let s = step("{ org: OrgA, function: PackageExists, args: [PKG-1], advance: 9223372036854775807 }");
        let err = replay.run_step(1, &s).unwrap_err();
        assert!(format!("{err:#}").contains("cannot advance the clock"), "{err:#}");
        assert_eq!(replay.ledger().now().to_iso8601(), "2026-01-01T00:00:00Z");
    }

    #[test]
    fn unknown_saved_name_is_a_replay_error() {
        let mut replay = Replay::new(ledger(), TracingBroadcaster);
        let s = step("{ org: OrgA, function: ExecuteTransfer, transient: { storeObject: $missing } }");
        assert!(replay.run_step(1, &s).is_err());
    }
}
