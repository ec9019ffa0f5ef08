use clap::Parser;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use peek_error::Result;
use smarty_peek::{OutputOptions, PeekOptions, SearchOptions, run_main};

#[derive(Parser, Debug)]
#[command(
    name = "smarty-peek",
    about = "smarty-peek: what is this Smarty variable, and where was it assigned?",
    version
)]
pub struct Cli {
    /// Template expression or variable path, e.g. '{$user.name}' or 'user'
    #[arg(value_name = "EXPR")]
    expression: String,

    /// Byte offset in EXPR of the reference to resolve
    #[arg(long, value_name = "COL")]
    column: Option<usize>,

    #[command(flatten)]
    search: SearchOptions,

    #[command(flatten)]
    output: OutputOptions,
}

pub fn run(args: Cli) -> Result<()> {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
    }

    let mut opts = PeekOptions::new(args.expression)
        .with_search(args.search)
        .with_output(args.output);
    if let Some(column) = args.column {
        opts = opts.with_column(column);
    }

    match run_main(&opts) {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "smarty-peek failed");
            Err(err)
        }
    }
}

pub fn main() -> Result<()> {
    let args = Cli::parse();
    run(args)
}
