use ruuvitag_form::cli::{self, Command, Config};
use ruuvitag_form::{HttpFetcher, run_with_io};
use std::ffi::OsString;
use std::io::Write;
use std::panic::{self, PanicHookInfo};

/// Exit codes for the application
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;

/// Report a command line problem the way `getopt` based tools do.
fn usage_error(prog: &str, message: &str) -> i32 {
    eprintln!("{}", cli::usage_message(prog, message));
    EXIT_USAGE
}

fn print_help(prog: &str) -> i32 {
    match writeln!(std::io::stdout(), "{}", cli::help_text(prog)) {
        Ok(()) => EXIT_SUCCESS,
        Err(error) => {
            eprintln!("{}: {}", prog, error);
            EXIT_ERROR
        }
    }
}

/// Fetch and render the tags, returning the process exit code.
async fn run(prog: &str, config: Config) -> i32 {
    let fetcher = match HttpFetcher::new() {
        Ok(fetcher) => fetcher,
        Err(error) => {
            eprintln!("{}: {}", prog, error);
            return EXIT_ERROR;
        }
    };

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    match run_with_io(&config, &fetcher, &mut stdout, &mut stderr).await {
        Ok(()) => EXIT_SUCCESS,
        Err(why) if why.is_usage() => usage_error(prog, &why.to_string()),
        Err(why) => {
            eprintln!("{}: {}", prog, why);
            EXIT_ERROR
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set up panic hook so a crash still reports a plain failure exit code
    panic::set_hook(Box::new(move |info: &PanicHookInfo| {
        eprintln!("Panic! {}", info);
        std::process::exit(EXIT_ERROR);
    }));

    let args: Vec<OsString> = std::env::args_os().collect();
    let prog = cli::program_name(args.first().and_then(|arg| arg.to_str()));

    let code = match cli::parse_args(args) {
        Ok(Command::Help) => print_help(&prog),
        Ok(Command::Run(config)) => run(&prog, config).await,
        Err(usage) => usage_error(&prog, &usage.to_string()),
    };
    std::process::exit(code);
}
