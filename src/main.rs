use std::fs;
use std::path::PathBuf;
use std::thread::sleep;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{bail, IntoDiagnostic, Result};

use mpu8::output::{self, Base};
use mpu8::{error, Cpu};

/// mpu8 is an assembler and simulator for an educational 8-bit MPU.
#[derive(Parser)]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Quickly provide a `.asm` file to run
    path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble an `.asm` file and run it until HALT
    Run {
        /// `.asm` file to run
        name: PathBuf,
        /// Pace execution at this many instruction cycles per second
        #[arg(short, long)]
        clock: Option<f64>,
        /// Stop after this many cycles even if the program never halts
        #[arg(short, long)]
        limit: Option<u64>,
        /// Display register and memory values in decimal instead of hex
        #[arg(long)]
        dec: bool,
        /// Produce minimal output, suited for blackbox tests
        #[arg(short, long)]
        minimal: bool,
    },
    /// Check an `.asm` file without running it
    Check {
        /// File to check
        name: PathBuf,
    },
}

struct RunOpts {
    clock: Option<f64>,
    limit: Option<u64>,
    base: Base,
    minimal: bool,
}

fn main() -> Result<()> {
    use MsgColor::*;
    let args = Args::parse();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new() //
                .context_lines(mpu8::DIAGNOSTIC_CONTEXT_LINES)
                .build(),
        )
    }))?;

    if let Some(command) = args.command {
        match command {
            Command::Run {
                name,
                clock,
                limit,
                dec,
                minimal,
            } => {
                let base = if dec { Base::Dec } else { Base::Hex };
                run(
                    &name,
                    RunOpts {
                        clock,
                        limit,
                        base,
                        minimal,
                    },
                )
            }
            Command::Check { name } => {
                file_message(Green, "Checking", &name);
                let src = fs::read_to_string(&name).into_diagnostic()?;
                let _ = assemble(&src)?;
                message(Green, "Success", "no errors found!");
                Ok(())
            }
        }
    } else if let Some(path) = args.path {
        run(
            &path,
            RunOpts {
                clock: None,
                limit: None,
                base: Base::Hex,
                minimal: false,
            },
        )
    } else {
        println!("\n~ mpu8 v{VERSION} ~");
        println!("{}", LOGO.truecolor(137, 220, 235).bold());
        println!("{SHORT_INFO}");
        Ok(())
    }
}

#[allow(unused)]
enum MsgColor {
    Green,
    Cyan,
    Red,
}

fn file_message(color: MsgColor, left: &str, right: &PathBuf) {
    let right = format!("target {}", right.display());
    message(color, left, &right);
}

fn message<S>(color: MsgColor, left: S, right: S)
where
    S: Colorize + std::fmt::Display,
{
    let left = match color {
        MsgColor::Green => left.green(),
        MsgColor::Cyan => left.cyan(),
        MsgColor::Red => left.red(),
    };
    println!("{left:>12} {right}");
}

fn run(name: &PathBuf, opts: RunOpts) -> Result<()> {
    if !opts.minimal {
        file_message(MsgColor::Green, "Assembling", name);
    }
    let src = fs::read_to_string(name).into_diagnostic()?;
    let image = assemble(&src)?;

    let period = match opts.clock {
        Some(hz) if hz > 0.0 => Some(Duration::from_secs_f64(1.0 / hz)),
        Some(_) => bail!("Clock frequency must be positive"),
        None => None,
    };

    let mut cpu = Cpu::new();
    cpu.set_instructions(&image);
    cpu.reset();
    cpu.set_enabled(true);

    if !opts.minimal {
        message(MsgColor::Green, "Running", "assembled image");
    }

    // Strict cycle order: no fetch starts before the prior execute is done.
    let mut cycles: u64 = 0;
    while cpu.is_enabled() {
        cpu.fetch();
        cpu.decode();
        cpu.execute();
        cycles += 1;
        if opts.limit.is_some_and(|limit| cycles >= limit) && cpu.is_enabled() {
            cpu.set_enabled(false);
            if !opts.minimal {
                message(MsgColor::Red, "Stopped", "cycle limit reached");
            }
        }
        if let Some(period) = period {
            sleep(period);
        }
    }

    output::print_summary(&cpu, opts.base, opts.minimal);
    if !opts.minimal {
        file_message(MsgColor::Green, "Completed", name);
    }
    Ok(())
}

/// Assemble source text, converting the core's error classification into a
/// printable diagnostic.
fn assemble(src: &str) -> Result<mpu8::Image> {
    mpu8::assemble(src).map_err(|e| error::report(e, src))
}

const LOGO: &str = r#"
             _____
  _ __  _ __|___  |
 | '  \| '_ \ _| ()|
 |_|_|_| .__/(_)___/
       |_|"#;

const SHORT_INFO: &str = r"
Welcome to mpu8, an assembler and simulator for a tiny educational
8-bit processor with registers A, B and OUT and 256 bytes of memory.
Please use `-h` or `--help` to access the usage instructions.
";

const VERSION: &str = env!("CARGO_PKG_VERSION");
