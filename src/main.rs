//! CLI entry point for `pul-migrate`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use pul_migrate::config::Config;
use pul_migrate::error::PulError;
use pul_migrate::i18n;
use pul_migrate::migrate::{self, MigrationPaths, MigrationReport};
use pul_migrate::names::TrackNames;
use pul_migrate::patch;
use pul_migrate::report;
use pul_migrate::trophy::{Category, SaveFile};

#[derive(Parser)]
#[command(name = "pul-migrate", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Language (en, es). Defaults to system locale.
    #[arg(long, global = true, value_name = "LANG")]
    lang: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge old progress into the new save
    Migrate(MigrateArgs),
    /// Show the trophy data of one save
    Inspect {
        path: PathBuf,
        /// Track name list(s), later files override earlier ones
        #[arg(short, long = "names", value_name = "FILE")]
        names: Vec<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Write a default configuration file
    InitConfig,
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

#[derive(clap::Args, Default)]
struct MigrateArgs {
    /// Save holding the progress to carry over
    #[arg(long, value_name = "FILE")]
    old: Option<PathBuf>,
    /// Save receiving the progress
    #[arg(long, value_name = "FILE")]
    new: Option<PathBuf>,
    /// Track names for the old version
    #[arg(long, value_name = "FILE")]
    old_names: Option<PathBuf>,
    /// Track names for the new version
    #[arg(long, value_name = "FILE")]
    new_names: Option<PathBuf>,
    /// Track names shared by both versions
    #[arg(long, value_name = "FILE")]
    normal_names: Option<PathBuf>,
    /// Patched save to write
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Compute and report without writing the output
    #[arg(long)]
    dry_run: bool,
    #[arg(long)]
    json: bool,
}

impl MigrateArgs {
    /// Resolve every path, falling back to the configured defaults.
    fn paths(self, config: &Config) -> MigrationPaths {
        let defaults = MigrationPaths::from(&config.files);
        MigrationPaths {
            old_save: self.old.unwrap_or(defaults.old_save),
            new_save: self.new.unwrap_or(defaults.new_save),
            old_names: self.old_names.unwrap_or(defaults.old_names),
            new_names: self.new_names.unwrap_or(defaults.new_names),
            normal_names: self.normal_names.or(defaults.normal_names),
            output: self.output.unwrap_or(defaults.output),
        }
    }
}

/// Detect language early from --lang arg, config or system env, before clap processes --help.
fn detect_lang_early(config: &Config) -> i18n::Lang {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--lang" {
            if let Some(lang) = args.get(i + 1).and_then(|c| i18n::Lang::from_code(c)) {
                return lang;
            }
        }
        if let Some(lang) = args[i]
            .strip_prefix("--lang=")
            .and_then(i18n::Lang::from_code)
        {
            return lang;
        }
    }
    config
        .general
        .language
        .as_deref()
        .and_then(i18n::Lang::from_code)
        .unwrap_or_else(i18n::detect_system_lang)
}

/// Build a localized clap Command using i18n strings.
fn build_localized_command() -> clap::Command {
    let mut cmd = Cli::command()
        .about(i18n::app_about())
        .long_about(i18n::app_long_about());

    let subcommands: Vec<clap::Command> = cmd
        .get_subcommands()
        .map(|sub| {
            let s = sub.clone();
            match s.get_name() {
                "migrate" => s.about(i18n::help_cmd_migrate()),
                "inspect" => s.about(i18n::help_cmd_inspect()),
                "init-config" => s.about(i18n::help_cmd_init_config()),
                "completions" => s.about(i18n::help_cmd_completions()),
                "manpage" => s.about(i18n::help_cmd_manpage()),
                _ => s,
            }
        })
        .collect();

    for sub in subcommands {
        cmd = cmd.mut_subcommand(sub.get_name(), |_| sub.clone());
    }

    cmd
}

fn main() {
    let config = pul_migrate::config::load_config();
    i18n::set_lang(detect_lang_early(&config));

    let matches = build_localized_command().get_matches();
    let cli = match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    };

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let result = match cli.command {
        Some(Commands::Migrate(args)) => cmd_migrate(args, &config),
        None => cmd_migrate(MigrateArgs::default(), &config),
        Some(Commands::Inspect { path, names, json }) => cmd_inspect(&path, &names, json),
        Some(Commands::InitConfig) => cmd_init_config(),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
    };

    if let Err(e) = result {
        if let Some(PulError::MissingInputFile(missing)) = e.downcast_ref::<PulError>() {
            print_missing_files(missing, &config);
        } else {
            eprintln!("{e:#}");
        }
        std::process::exit(1);
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_path = pul_migrate::config::log_file_path(config);
    let log_dir = pul_migrate::config::cache_dir(config);
    let log_name = log_path.file_name().unwrap_or_default();
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, log_name);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        // Fall back to stderr only
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Run the migration and print the report.
fn cmd_migrate(args: MigrateArgs, config: &Config) -> anyhow::Result<()> {
    let json = args.json;
    let dry_run = args.dry_run;
    let paths = args.paths(config);

    let result = migrate::run(&paths, dry_run)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_migration_report(&result);
    }
    Ok(())
}

/// Decode a single save and show its header and tally.
fn cmd_inspect(path: &Path, names: &[PathBuf], json: bool) -> anyhow::Result<()> {
    if !path.exists() {
        anyhow::bail!("{}: {}", i18n::msg_not_found(), path.display());
    }

    let bytes = migrate::read_save(path)?;
    let save = SaveFile::parse(&bytes)?;
    let names = TrackNames::from_sources(names);
    let tracks = save.block.decode_tracks(&names)?;
    let summary = patch::tally(&tracks);

    let header = save.block.decode_header()?;
    let version = save.block.version()?;
    let mut stored = Vec::with_capacity(Category::ALL.len());
    for category in Category::ALL {
        stored.push((category, save.block.counter(category)?));
    }

    if json {
        let stored_json: serde_json::Map<String, serde_json::Value> = stored
            .iter()
            .map(|(c, v)| (c.label().to_string(), serde_json::json!(v)))
            .collect();
        let out = serde_json::json!({
            "file": path.to_string_lossy(),
            "magic_offset": save.prefix.len(),
            "version": version,
            "total_size": header.total_size,
            "track_count": tracks.len(),
            "stored_counters": stored_json,
            "summary": summary,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!();
    println!("  {:<20} {}", i18n::msg_version(), version);
    println!("  {:<20} {}", i18n::msg_total_size(), header.total_size);
    println!("  {:<20} {}", i18n::msg_track_count(), tracks.len());
    println!("  {}:", i18n::msg_stored_counters());
    for (category, value) in &stored {
        println!("    {:<18} {}", category.label(), value);
    }
    println!();
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    print!("{}", report::render_text(&label, &summary));
    Ok(())
}

/// Write the default configuration to the standard location.
fn cmd_init_config() -> anyhow::Result<()> {
    pul_migrate::config::save_config(&Config::default())?;
    if let Some(path) = pul_migrate::config::config_file_path() {
        println!("  {} {}", i18n::msg_config_written(), path.display());
    }
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "pul-migrate", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

/// Print both version reports followed by merge statistics.
fn print_migration_report(result: &MigrationReport) {
    use humansize::{format_size, BINARY};

    print!("{}", report::render_text("Old", &result.old));
    println!();
    print!("{}", report::render_text("New", &result.new));

    println!();
    println!("  {}", i18n::msg_merge_complete());
    println!("  {:<30} {}", i18n::msg_carried(), result.merge.carried);
    println!("  {:<30} {}", i18n::msg_dropped(), result.merge.dropped);
    println!(
        "  {:<30} {}",
        i18n::msg_output_size(),
        format_size(result.output_size, BINARY)
    );
    match &result.output {
        Some(path) => println!("  {:<30} {}", i18n::msg_output_file(), path.display()),
        None => println!("  {}", i18n::msg_dry_run()),
    }
    println!();
}

/// The fixed message shown when required inputs are absent.
fn print_missing_files(missing: &[PathBuf], config: &Config) {
    let files = &config.files;
    println!("{}", i18n::err_missing_files());
    println!(
        "({} {}, {}, {}, {})",
        i18n::msg_expected_names(),
        files.old_save.display(),
        files.new_save.display(),
        files.old_names.display(),
        files.new_names.display()
    );
    for path in missing {
        println!("  {}: {}", i18n::msg_not_found(), path.display());
    }
}
