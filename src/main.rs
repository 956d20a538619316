//! Thin command-line front end over the memedit engine

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use memedit::config::Config;
use memedit::{Address, MemIo, MemScanner, OpType, Pid, ScanType, ScanValue};
use tracing::{info, Level};

#[derive(FromArgs, Debug)]
#[argh(description = "scan, filter and edit the live memory of another Linux process")]
struct MemEdit {
    /// path to a TOML config file
    #[argh(option, short = 'c', default = "String::from(\"memedit.toml\")")]
    config: String,

    #[argh(subcommand)]
    cmd: Command,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand)]
enum Command {
    Ps(PsCmd),
    Scan(ScanCmd),
    Read(ReadCmd),
    Write(WriteCmd),
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "ps", description = "list candidate target processes")]
struct PsCmd {
    /// only processes whose command line contains this pattern
    #[argh(positional)]
    pattern: Option<String>,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "scan", description = "scan a process for a value")]
struct ScanCmd {
    /// target process id
    #[argh(option, short = 'p')]
    pid: Pid,

    /// value to search for
    #[argh(positional)]
    value: String,

    /// scan type: int8, int16, int32, float32 or float64
    #[argh(option, short = 't', default = "String::from(\"int32\")")]
    scan_type: String,

    /// comparison operator (default =)
    #[argh(option, short = 'o', default = "String::from(\"=\")")]
    op: String,

    /// restrict the scan to start:end (hex addresses)
    #[argh(option)]
    scope: Option<String>,

    /// print at most this many matches
    #[argh(option, default = "20")]
    limit: usize,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "read", description = "read one typed value")]
struct ReadCmd {
    /// target process id
    #[argh(option, short = 'p')]
    pid: Pid,

    /// address to read (hex)
    #[argh(positional)]
    address: String,

    /// scan type to decode as
    #[argh(option, short = 't', default = "String::from(\"int32\")")]
    scan_type: String,
}

#[derive(FromArgs, Debug)]
#[argh(subcommand, name = "write", description = "write one typed value")]
struct WriteCmd {
    /// target process id
    #[argh(option, short = 'p')]
    pid: Pid,

    /// address to write (hex)
    #[argh(positional)]
    address: String,

    /// value to write
    #[argh(positional)]
    value: String,

    /// scan type to encode as
    #[argh(option, short = 't', default = "String::from(\"int32\")")]
    scan_type: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let args: MemEdit = argh::from_env();
    let config = Config::load(&args.config).context("loading configuration")?;

    match args.cmd {
        Command::Ps(cmd) => run_ps(cmd),
        Command::Scan(cmd) => run_scan(cmd, &config),
        Command::Read(cmd) => run_read(cmd),
        Command::Write(cmd) => run_write(cmd),
    }
}

fn run_ps(cmd: PsCmd) -> Result<()> {
    let processes = match cmd.pattern {
        Some(pattern) => memedit::process::find_processes(&pattern)?,
        None => memedit::process::list_processes()?,
    };
    for p in processes {
        println!("{:>8}  {}", p.pid, p.cmdline);
    }
    Ok(())
}

fn run_scan(cmd: ScanCmd, config: &Config) -> Result<()> {
    let scan_type: ScanType = cmd.scan_type.parse()?;
    let op: OpType = cmd.op.parse()?;
    let value = ScanValue::parse(&cmd.value, scan_type)?;

    let mut scanner = MemScanner::with_pid(cmd.pid);
    scanner.set_max_threads(config.scanner.max_threads);
    scanner.set_chunk_size(config.scanner.chunk_size);
    if let Some(scope) = &cmd.scope {
        let (start, end) = scope
            .split_once(':')
            .with_context(|| format!("scope '{}' is not start:end", scope))?;
        scanner.set_scope_start(start.parse::<Address>()?);
        scanner.set_scope_end(end.parse::<Address>()?);
    }

    info!(pid = cmd.pid, %scan_type, %op, "scanning");
    let matches = scanner.scan(&value.to_bytes(), scan_type, op)?;
    info!(matches = matches.len(), "scan finished");

    for element in matches.iter().take(cmd.limit) {
        let decoded = element
            .recall_value()
            .map(|v| v.to_string())
            .unwrap_or_default();
        println!(
            "{}  {}  ({})",
            element.address(),
            decoded,
            hex::encode(element.remembered())
        );
    }
    if matches.len() > cmd.limit {
        println!("... and {} more", matches.len() - cmd.limit);
    }
    Ok(())
}

fn run_read(cmd: ReadCmd) -> Result<()> {
    let scan_type: ScanType = cmd.scan_type.parse()?;
    let address: Address = cmd.address.parse()?;

    let io = MemIo::with_pid(cmd.pid);
    let value = io.read_value(address, scan_type)?;
    println!("{}  {}  ({})", address, value, hex::encode(value.to_bytes()));
    Ok(())
}

fn run_write(cmd: WriteCmd) -> Result<()> {
    let scan_type: ScanType = cmd.scan_type.parse()?;
    let address: Address = cmd.address.parse()?;
    let value = ScanValue::parse(&cmd.value, scan_type)?;

    if cmd.pid == 0 {
        bail!("a target pid is required");
    }
    let io = MemIo::with_pid(cmd.pid);
    io.write_value(address, value)?;
    info!(pid = cmd.pid, %address, "wrote {}", value);
    Ok(())
}
