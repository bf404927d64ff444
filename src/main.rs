use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use goprofile::build::{WorkDir, build_instrumented, go_build_args, instrument_all, plan_tasks};
use goprofile::config::{LOG_VAR, Options, gopath_from_env, parse_build_flags};
use goprofile::error::Error;
use goprofile::resolve::{output_name, resolve_file_set};

#[derive(Parser)]
#[command(
    name = "goprofile",
    about = "Compile Go files or a package into a binary that writes a CPU profile",
    version,
    after_help = "Rule of thumb: 'go build' + profiling instrumentation = goprofile.\n\n\
                  Example: goprofile myprogram.go && ./myprogram.profile && \
                  go tool pprof myprogram.profile myprogram.pprof"
)]
struct Cli {
    /// Path to the instrumented output binary (default: <name>.profile).
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Path the instrumented program writes its profile to (default: <name>.pprof).
    #[arg(short, long, value_name = "PATH")]
    profile: Option<String>,

    /// Instrument the source files in place.
    /// DANGER: this overwrites them. Only use it under version control.
    #[arg(long)]
    inplace: bool,

    /// Print progress.
    #[arg(short, long)]
    verbose: bool,

    /// Print the name of the temporary work directory and keep it.
    #[arg(long)]
    work: bool,

    /// Arguments passed on to 'go build'.
    #[arg(long, value_name = "FLAGS", default_value = "", allow_hyphen_values = true)]
    buildflags: String,

    /// Source files or a package. Defaults to the current directory.
    #[arg(value_name = "FILES|PACKAGE")]
    args: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), Error> {
    let options = Options {
        output: cli.output,
        profile: cli.profile,
        in_place: cli.inplace,
        keep_work: cli.work,
        build_flags: parse_build_flags(&cli.buildflags)?,
        args: cli.args,
        gopath: gopath_from_env(),
    };
    let binary = build_project(&options)?;
    eprintln!("built: {}", binary.display());
    Ok(())
}

/// Instrument the selected sources and compile them. Returns the binary path.
fn build_project(options: &Options) -> Result<PathBuf, Error> {
    let cwd = std::env::current_dir()?;
    let files = resolve_file_set(&options.args, options.gopath.as_deref())?;

    let name = output_name(&options.args, &cwd);
    let profile_path = options
        .profile
        .clone()
        .unwrap_or_else(|| format!("{name}.pprof"));
    let output = absolute_output(
        options
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{name}.profile"))),
        &cwd,
    );
    info!("will compile to {}", output.display());
    info!("instrumented executable will save cpu profile as {profile_path}");

    let work_dir = WorkDir::create(options.in_place, options.keep_work, &files.dir())?;
    if options.keep_work {
        println!("GOPROFILEWORK='{}'", work_dir.path().display());
    }

    let tasks = plan_tasks(&files.paths, &work_dir, &profile_path)?;
    instrument_all(&tasks, work_dir.is_in_place())?;

    let listed = files.listed.then_some(tasks.as_slice());
    let args = go_build_args(&options.build_flags, &output, listed);
    build_instrumented(work_dir.path(), &args)?;

    Ok(output)
}

fn absolute_output(output: PathBuf, cwd: &Path) -> PathBuf {
    if output.is_absolute() {
        output
    } else {
        cwd.join(output)
    }
}
