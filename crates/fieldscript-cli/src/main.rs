mod listing;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fieldscript_bytecode::DecodeError;
use fieldscript_decoder::{DecodedScript, Decoder, ErrorPolicy};
use fieldscript_vm::{Directive, Host, HostError, Runner};

use crate::listing::parse_listing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Abort,
    Skip,
}

impl From<PolicyArg> for ErrorPolicy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Abort => ErrorPolicy::Abort,
            PolicyArg::Skip => ErrorPolicy::Skip,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "fieldscript", version, about = "Decode and run field-script listings")]
struct Cli {
    /// Listing file, one token per line
    path: PathBuf,

    /// What to do when an instruction fails to decode
    #[arg(short = 'p', long = "policy", value_enum, env = "FIELDSCRIPT_POLICY", default_value_t = PolicyArg::Abort)]
    policy: PolicyArg,

    /// Print the decoded script as JSON
    #[arg(long = "json", default_value_t = false)]
    json: bool,

    /// Run the decoded instructions and print each directive
    #[arg(short = 'r', long = "run", default_value_t = false)]
    run: bool,

    /// Do not print the disassembly
    #[arg(short = 'q', long = "quiet", default_value_t = false)]
    quiet: bool,
}

/// Host that prints directives instead of driving a game.
struct PrintHost;

impl Host for PrintHost {
    fn signal(&mut self, directive: Directive) -> Result<(), HostError> {
        info!(%directive, "directive");
        println!("{} {}", "->".cyan(), directive);
        Ok(())
    }
}

fn render_error(kind: &str, source: &str, msg: &str, line: Option<usize>) {
    eprintln!("{}: {}", kind.red().bold(), msg.red());
    if let Some(line) = line {
        eprintln!("  --> line {}", line);
        if let Some(src_line) = source.lines().nth(line.saturating_sub(1)) {
            let line_num_str = format!("{:3} | ", line);
            eprintln!("     |");
            eprintln!("{}{}", line_num_str.bright_black(), src_line);
            eprintln!("     |");
        }
    }
}

fn suggest(err: &DecodeError) {
    match err {
        DecodeError::StackUnderflow { needed, .. } => eprintln!(
            "{}",
            format!("Help: this opcode pops {} operand(s); check the pushes before it.", needed).yellow()
        ),
        DecodeError::InvalidOperand { .. } => {
            eprintln!("{}", "Help: this opcode only accepts PSHN_L constants as operands.".yellow())
        }
        DecodeError::UnknownOpcode { .. } => {
            eprintln!("{}", "Help: the rest of the script cannot be decoded past an unknown opcode.".yellow())
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("FIELDSCRIPT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn print_script(script: &DecodedScript) {
    for (i, instr) in script.instructions.iter().enumerate() {
        println!("{}  {}", format!("{:04}", i).bright_black(), instr);
    }
    if script.leftover > 0 {
        println!("{}", format!("; {} operand(s) left on the stack", script.leftover).bright_black());
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let src = match fs::read_to_string(&cli.path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!(
                "{}: {}",
                "error".red().bold(),
                format!("Failed to read {}: {}", cli.path.display(), e).red()
            );
            return ExitCode::FAILURE;
        }
    };

    let listing = match parse_listing(&src) {
        Ok(l) => l,
        Err(e) => {
            render_error("Listing error", &src, &e.msg, Some(e.line));
            return ExitCode::FAILURE;
        }
    };

    let mut decoder = Decoder::new(cli.policy.into());
    let script = match decoder.decode(&listing.tokens) {
        Ok(s) => s,
        Err(e) => {
            render_error("Decode error", &src, &e.source.to_string(), listing.line_of(e.index));
            suggest(&e.source);
            return ExitCode::FAILURE;
        }
    };

    for diag in &script.diagnostics {
        let line = listing.line_of(diag.index).unwrap_or(0);
        eprintln!("{}: line {}: {}", "skipped".yellow().bold(), line, diag.error);
    }

    if cli.json {
        match serde_json::to_string_pretty(&script) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), format!("Failed to serialize: {}", e).red());
                return ExitCode::FAILURE;
            }
        }
    } else if !cli.quiet {
        print_script(&script);
    }

    if cli.run {
        if let Err(e) = Runner::new().run(&script.instructions, &mut PrintHost) {
            eprintln!("{}: {}", "Run error".red().bold(), e.to_string().red());
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
