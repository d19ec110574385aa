//! `runtime-cli` — the command-line surface described in spec.md §6.2:
//! `run`/`repl` over the library's `run_text`, plus `verify-snapshot` and
//! `sign-snapshot` over `.svms` bundles. Mirrors the teacher's own
//! clap-derive CLI shape (one subcommand enum, `anyhow::Result` at the
//! top, `tracing` for diagnostics).

use std::fs;
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use meta_runtime::config::{OutputFormat, RuntimeConfig, SnapshotDigestAlgo};
use meta_runtime::node::json::to_json;
use meta_runtime::plan::Route;
use meta_runtime::scheduler::HaltReason;
use meta_runtime::session::Session;
use meta_runtime::vm::{self, bytecode, signing, snapshot};
use meta_runtime::{run_text, RunOutcome};

#[derive(Parser)]
#[command(name = "runtime-cli", about = "Deterministic neuro-symbolic reasoning runtime CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to a TOML config file; falls back to config.toml/config.local.toml/env.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable JSON log output.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Runs a single turn and prints the record.
    Run {
        text: String,

        #[arg(long)]
        enable_contradictions: bool,
        #[arg(long, conflicts_with = "enable_contradictions")]
        disable_contradictions: bool,

        #[arg(long, value_enum, default_value_t = FormatArg::Text)]
        format: FormatArg,

        #[arg(long)]
        include_meta: bool,
        #[arg(long)]
        include_stats: bool,
        #[arg(long)]
        include_explanation: bool,
        #[arg(long)]
        include_report: bool,
        #[arg(long)]
        include_lc_meta: bool,

        #[arg(long)]
        expect_meta_digest: Option<String>,
        #[arg(long)]
        expect_code_digest: Option<String>,

        #[arg(long, value_enum, default_value_t = CalcModeArg::Full)]
        calc_mode: CalcModeArg,
    },
    /// Interactive read-eval-print loop, one turn per line.
    Repl {
        #[arg(long)]
        enable_contradictions: bool,
    },
    /// Verifies an `.svms` snapshot's digest (and signature, if present).
    VerifySnapshot {
        path: PathBuf,
        #[arg(long, value_enum, default_value_t = DigestAlgoArg::Blake2b256)]
        algo: DigestAlgoArg,
    },
    /// Signs an `.svms` snapshot's digest with a caller-supplied Ed25519 key.
    SignSnapshot {
        path: PathBuf,
        /// Path to a file holding the raw 32-byte secret key.
        #[arg(long)]
        key_file: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
    Both,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Both => OutputFormat::Both,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum CalcModeArg {
    Full,
    PlanOnly,
}

#[derive(Clone, Copy, ValueEnum)]
enum DigestAlgoArg {
    Blake2b256,
    Blake3,
}

impl From<DigestAlgoArg> for SnapshotDigestAlgo {
    fn from(a: DigestAlgoArg) -> Self {
        match a {
            DigestAlgoArg::Blake2b256 => SnapshotDigestAlgo::Blake2b256,
            DigestAlgoArg::Blake3 => SnapshotDigestAlgo::Blake3,
        }
    }
}

fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    match &cli.config {
        Some(path) => RuntimeConfig::load_from(path).context("loading config from --config"),
        None => RuntimeConfig::load().context("loading config"),
    }
    .or_else(|_| Ok(RuntimeConfig::default()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    meta_runtime::telemetry::init_with(cli.json_logs);

    match &cli.command {
        Command::Run {
            text,
            enable_contradictions,
            disable_contradictions,
            format,
            include_meta,
            include_stats,
            include_explanation,
            include_report,
            include_lc_meta,
            expect_meta_digest,
            expect_code_digest,
            calc_mode,
        } => {
            let mut config = load_config(&cli)?;
            if *enable_contradictions {
                config.scheduler.enable_contradictions = true;
            }
            if *disable_contradictions {
                config.scheduler.enable_contradictions = false;
            }
            config.output.format = (*format).into();
            config.output.include_meta = *include_meta;
            config.output.include_stats = *include_stats;
            config.output.include_explanation = *include_explanation;
            config.output.include_report = *include_report;
            config.output.include_lc_meta = *include_lc_meta;

            let session = Session::new(config);
            let outcome = run_turn(text, session, *calc_mode)?;
            print_outcome(&outcome, &load_config(&cli)?);

            if let Some(expected) = expect_meta_digest {
                if meta_digest(&outcome) != *expected {
                    bail!("meta digest mismatch: expected {expected}, got {}", meta_digest(&outcome));
                }
            }
            if let Some(expected) = expect_code_digest {
                let plan_digest = outcome.meta_summary_plan_digest();
                if plan_digest != *expected {
                    bail!("code digest mismatch: expected {expected}, got {plan_digest}");
                }
            }
            Ok(())
        }
        Command::Repl { enable_contradictions } => run_repl(&cli, *enable_contradictions),
        Command::VerifySnapshot { path, algo } => verify_snapshot_file(path, (*algo).into()),
        Command::SignSnapshot { path, key_file, output } => sign_snapshot_file(path, key_file, output.as_deref()),
    }
}

/// Runs one turn. `PlanOnly` mode runs only the classified plan's VM program
/// against a fresh ISR and halts with `PLAN_EXECUTED`, skipping the Φ-loop
/// (spec.md §6.2).
fn run_turn(text: &str, mut session: Session, calc_mode: CalcModeArg) -> Result<RunOutcome> {
    match calc_mode {
        CalcModeArg::Full => Ok(run_text(text, Some(session))),
        CalcModeArg::PlanOnly => {
            let trimmed = text.trim().to_string();
            let route_result = meta_runtime::router::classify(&trimmed, &session);
            let plan = route_result.calc_plan.clone();
            let budget = session.config.scheduler.step_budget;
            let enable_contradictions = session.config.scheduler.enable_contradictions;
            let mut vm = vm::Vm::new(&mut session.isr, &plan.constants, enable_contradictions, budget);
            vm.run(&plan.program).context("plan-only VM execution failed")?;
            let calc = meta_runtime::summary::verify_calc_exec(&session.isr, &plan, &session.config);
            let meta_summary =
                meta_runtime::summary::build(&trimmed, &route_result, &session.isr, HaltReason::PlanExecuted, &calc);
            Ok(RunOutcome {
                answer: session.isr.answer.clone(),
                quality: session.isr.quality,
                halt_reason: HaltReason::PlanExecuted,
                isr: session.isr,
                trace: session.trace,
                meta_summary,
                calc_result: calc,
            })
        }
    }
}

fn meta_digest(outcome: &RunOutcome) -> String {
    outcome
        .meta_summary
        .fields()
        .and_then(|fs| fs.iter().find(|(k, _)| k.as_ref() == "meta_digest").map(|(_, v)| v.clone()))
        .and_then(|v| v.as_text().map(str::to_string))
        .unwrap_or_default()
}

trait PlanDigestExt {
    fn meta_summary_plan_digest(&self) -> String;
}

impl PlanDigestExt for RunOutcome {
    fn meta_summary_plan_digest(&self) -> String {
        self.meta_summary
            .fields()
            .and_then(|fs| fs.iter().find(|(k, _)| k.as_ref() == "phi_plan_digest").map(|(_, v)| v.clone()))
            .and_then(|v| v.as_text().map(str::to_string))
            .unwrap_or_default()
    }
}

fn print_outcome(outcome: &RunOutcome, config: &RuntimeConfig) {
    match config.output.format {
        OutputFormat::Text => println!("{}", outcome.answer.as_text().unwrap_or_default()),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&to_json(&outcome.meta_summary)).unwrap_or_default()),
        OutputFormat::Both => {
            println!("{}", outcome.answer.as_text().unwrap_or_default());
            println!("{}", serde_json::to_string_pretty(&to_json(&outcome.meta_summary)).unwrap_or_default());
        }
    }

    if config.output.include_stats {
        println!(
            "stats: route={} halt={} quality={:.3} trace_steps={}",
            outcome.calc_result.plan_route,
            outcome.halt_reason.as_str(),
            outcome.quality,
            outcome.trace.steps.len()
        );
    }
    if config.output.include_explanation {
        for step in &outcome.trace.steps {
            println!(
                "  [{}] {} ({}) dQ={:+.3} dRel={:+} ctx={}",
                step.order, step.label, step.category(), step.delta_quality, step.delta_relations, step.context_size
            );
        }
    }
    if config.output.include_report {
        println!(
            "report: consistent={} answer_fingerprint={} snapshot_digest={}",
            outcome.calc_result.consistent, outcome.calc_result.answer_fingerprint, outcome.calc_result.snapshot_digest
        );
    }
    if config.output.include_lc_meta {
        if let Some(fields) = outcome.meta_summary.fields() {
            if let Some((_, lang)) = fields.iter().find(|(k, _)| k.as_ref() == "lang") {
                println!("lc_meta: lang={}", lang.as_text().unwrap_or_default());
            }
        }
    }
}

fn run_repl(cli: &Cli, enable_contradictions: bool) -> Result<()> {
    let mut config = load_config(cli)?;
    config.scheduler.enable_contradictions = enable_contradictions;

    let mut rl = DefaultEditor::new().context("initializing readline editor")?;
    loop {
        match rl.readline("runtime> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);
                if matches!(trimmed, ":quit" | ":q" | ":exit") {
                    break;
                }
                let session = Session::new(config.clone());
                let outcome = run_text(trimmed, Some(session));
                print_outcome(&outcome, &config);
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("readline error"),
        }
    }
    Ok(())
}

fn verify_snapshot_file(path: &PathBuf, algo: SnapshotDigestAlgo) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let snap = snapshot::from_json_str(&raw).context("parsing snapshot JSON")?;
    let ok = snapshot::verify_snapshot(&snap, algo).context("verifying snapshot")?;
    if ok {
        println!("OK: {} digest={} version={}", path.display(), snap.digest, snap.version);
        Ok(())
    } else {
        bail!("snapshot verification failed for {}", path.display());
    }
}

fn sign_snapshot_file(path: &PathBuf, key_file: &PathBuf, output: Option<&std::path::Path>) -> Result<()> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let mut snap = snapshot::from_json_str(&raw).context("parsing snapshot JSON")?;

    let key_bytes = fs::read(key_file).with_context(|| format!("reading key file {}", key_file.display()))?;
    let key_arr: [u8; 32] = key_bytes
        .as_slice()
        .try_into()
        .context("key file must hold exactly 32 raw bytes")?;
    let key = signing::signing_key_from_bytes(&key_arr);

    let digest_raw = hex::decode(&snap.digest).context("decoding stored digest as hex")?;
    let block = signing::sign_digest(&digest_raw, &key);
    snap.signature = Some(block);

    let encoded = snapshot::to_json_string(&snap).context("re-encoding signed snapshot")?;
    match output {
        Some(out) => fs::write(out, encoded).with_context(|| format!("writing {}", out.display()))?,
        None => fs::write(path, encoded).with_context(|| format!("writing {}", path.display()))?,
    }
    println!("signed {}", path.display());
    Ok(())
}

#[allow(dead_code)]
fn disassemble_program(program: &[meta_runtime::vm::opcode::Instruction]) -> String {
    meta_runtime::vm::asm::disassemble(program)
}

#[allow(dead_code)]
fn encode_bytecode(program: &[meta_runtime::vm::opcode::Instruction]) -> Vec<u8> {
    bytecode::encode(program, 1, 0)
}

#[allow(dead_code)]
fn route_name(route: Route) -> &'static str {
    route.as_str()
}

#[allow(dead_code)]
fn flush_stdout() {
    let _ = std::io::stdout().flush();
}
