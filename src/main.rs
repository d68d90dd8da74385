#![allow(missing_docs)]

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "respack", about = "Resource description compiler and pack tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	/// Compile a JSON resource description into a pack.
	Build(cmd::build::Args),
	/// Merge several packs into one.
	Combine(cmd::combine::Args),
	/// Print the entries and tree of a pack.
	Dump(cmd::dump::Args),
	/// Extract typed resources of a pack to files.
	Dumpbin(cmd::dumpbin::Args),
}

fn main() {
	let cli = match Cli::try_parse() {
		Ok(cli) => cli,
		Err(err) if err.use_stderr() => {
			let _ = err.print();
			std::process::exit(cmd::USAGE_EXIT_CODE);
		}
		Err(err) => err.exit(),
	};

	if let Err(err) = run(cli) {
		eprintln!("error: {err}");
		std::process::exit(err.exit_code());
	}
}

fn run(cli: Cli) -> cmd::CmdResult<()> {
	match cli.command {
		Commands::Build(args) => cmd::build::run(args),
		Commands::Combine(args) => cmd::combine::run(args),
		Commands::Dump(args) => cmd::dump::run(args),
		Commands::Dumpbin(args) => cmd::dumpbin::run(args),
	}
}
