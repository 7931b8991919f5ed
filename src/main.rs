use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(about = "Interpreter for the BIT programming language")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a program, reading bits from stdin.
    Run(RunArgs),
    /// Print the token stream of a program.
    Tokens(FileArgs),
    /// Print a program in canonical form.
    List(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    file: String,
    /// Treat THE JUMP REGISTER on the right-hand side of EQUALS as an error.
    #[arg(long)]
    strict: bool,
}

#[derive(Debug, Args)]
struct FileArgs {
    file: String,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to open {0}: {1}")]
    Open(String, std::io::Error),
    #[error(transparent)]
    Bit(#[from] bit::Error),
}

fn main() {
    let args = Cli::parse();

    let result = match &args.command {
        Command::Run(args) => run_command(args),
        Command::Tokens(args) => tokens_command(args),
        Command::List(args) => list_command(args),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn read_source(file: &str) -> Result<String, CliError> {
    std::fs::read_to_string(file).map_err(|e| CliError::Open(file.to_string(), e))
}

fn load(args: &RunArgs) -> Result<bit::ast::Program, CliError> {
    let source = read_source(&args.file)?;
    let config = bit::Config {
        strict: args.strict,
    };
    let program = bit::load(&source, &config)?;
    for warning in &program.warnings {
        eprintln!("warning: {warning}");
    }
    Ok(program)
}

fn run_command(args: &RunArgs) -> Result<(), CliError> {
    let program = load(args)?;
    let mut interpreter = bit::interpreter::Interpreter::default();
    interpreter
        .interpret(&program)
        .map_err(bit::Error::from)?;
    Ok(())
}

fn tokens_command(args: &FileArgs) -> Result<(), CliError> {
    let source = read_source(&args.file)?;
    let tokens = bit::tokenizer::tokens(&source).map_err(bit::Error::from)?;
    let mut line = 0;
    for token in tokens {
        if token.span.start_line != line {
            print!("{:4} ", token.span.start_line);
            line = token.span.start_line;
        } else {
            print!("   | ");
        }
        println!("{:<4} {}", token.span.start_column, token.token_type);
    }
    Ok(())
}

fn list_command(args: &RunArgs) -> Result<(), CliError> {
    let program = load(args)?;
    print!("{program}");
    Ok(())
}
