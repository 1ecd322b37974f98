//! pkgport - cross-distro package profiles
//!
//! Detects the package managers on a host, captures what is installed into
//! a portable profile, and replays that profile on another machine.
//!
//! Features:
//! - Export native, Flatpak and AppImage inventories (plus a dotfile backup)
//! - Interactive import with browsing, ranges, batch and one-by-one installs
//! - Partial-failure recovery for batch installs
//! - One-shot install/search/remove/update/info/list against any backend
//!
//! Usage: pkgport [--dry-run] <COMMAND>

mod config;
mod error;
mod import;
mod profile;
mod system;
mod types;
mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::Config;
use import::{EngineOptions, ImportEngine, StdinReader};
use profile::ProfileDocument;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use chrono::Local;
use system::backup;
use system::snapshot::{self, SnapshotKind};
use system::{inventory, CommandBuilder, CommandRunner, DryRunRunner, SystemInfo, SystemRunner};
use types::{Action, Category, InstallMethod};
use ui::{render, Theme};

/// Capture installed packages on one machine and replay them on another
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Show what would be done without executing
    #[arg(short = 'n', long, global = true)]
    dry_run: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a profile of everything installed on this machine
    Export {
        /// Also back up dotfiles and run the desktop/theme snapshot scripts
        #[arg(long)]
        include_config: bool,
        /// Where to write the profile
        path: PathBuf,
    },

    /// Install packages from a profile
    Import {
        #[command(flatten)]
        mode: ImportMode,
        /// Install method, skipping the method prompt
        #[arg(long, value_enum)]
        method: Option<InstallMethod>,
        /// Assume yes at the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Profile to import
        path: PathBuf,
    },

    /// Show detected package managers, sources and version managers
    Detect,

    /// Install packages
    Install(PackageArgs),
    /// Search for packages
    Search(PackageArgs),
    /// Remove packages
    Remove(PackageArgs),
    /// Upgrade installed packages
    Update(PackageArgs),
    /// Show package details
    Info(PackageArgs),
    /// List installed packages
    List(PackageArgs),
}

impl Commands {
    fn action(&self) -> Option<(Action, &PackageArgs)> {
        match self {
            Commands::Install(args) => Some((Action::Install, args)),
            Commands::Search(args) => Some((Action::Search, args)),
            Commands::Remove(args) => Some((Action::Remove, args)),
            Commands::Update(args) => Some((Action::Update, args)),
            Commands::Info(args) => Some((Action::Info, args)),
            Commands::List(args) => Some((Action::List, args)),
            _ => None,
        }
    }
}

/// Which part of the profile to install; interactive when none is given
#[derive(Args, Debug)]
#[group(required = false, multiple = false)]
struct ImportMode {
    /// Browse the profile with menus (default)
    #[arg(long)]
    interactive: bool,
    /// Install every native package
    #[arg(long)]
    install_native: bool,
    /// Install every Flatpak application
    #[arg(long)]
    install_flatpak: bool,
    /// Install every AppImage
    #[arg(long)]
    install_appimage: bool,
    /// Install everything in the profile
    #[arg(long)]
    install_all: bool,
}

impl ImportMode {
    fn categories(&self) -> Option<&'static [Category]> {
        if self.install_native {
            Some(&[Category::Native])
        } else if self.install_flatpak {
            Some(&[Category::Flatpak])
        } else if self.install_appimage {
            Some(&[Category::AppImage])
        } else if self.install_all {
            Some(Category::all())
        } else {
            None
        }
    }
}

#[derive(Args, Debug)]
struct PackageArgs {
    /// Use Flatpak instead of the native package manager
    #[arg(long, conflicts_with = "appimage")]
    flatpak: bool,
    /// Use AppImage tooling instead of the native package manager
    #[arg(long)]
    appimage: bool,
    /// Package names
    names: Vec<String>,
}

impl PackageArgs {
    fn category(&self) -> Category {
        if self.flatpak {
            Category::Flatpak
        } else if self.appimage {
            Category::AppImage
        } else {
            Category::Native
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// `warn` by default, `debug` with -v; RUST_LOG wins over both
fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// Returns whether everything that was attempted succeeded
fn run(cli: Cli) -> Result<bool> {
    let config = Config::load().context("Failed to load configuration")?;

    let theme = if cli.no_color || !config.ui.color || !io::stdout().is_terminal() {
        Theme::plain()
    } else {
        Theme::from_name(config.ui.theme)
    };

    let mut runner: Box<dyn CommandRunner> = if cli.dry_run {
        Box::new(DryRunRunner::new(io::stdout()))
    } else {
        Box::new(SystemRunner)
    };

    if let Some((action, args)) = cli.command.action() {
        return run_action(&config, &theme, runner.as_mut(), action, args);
    }

    match &cli.command {
        Commands::Export {
            include_config,
            path,
        } => export(
            &config,
            &theme,
            runner.as_mut(),
            path,
            *include_config,
            cli.dry_run,
        ),
        Commands::Import {
            mode,
            method,
            yes,
            path,
        } => {
            let options = EngineOptions {
                default_method: config.install.default_method,
                confirm_default: config.install.confirm_default,
                preset_method: *method,
                assume_yes: *yes,
            };
            import(&config, theme, runner.as_mut(), path, mode, options)
        }
        Commands::Detect => show_detected(&theme),
        _ => Ok(true),
    }
}

/// Detect, falling back to a probe without a native manager
fn detect_or_probe(theme: &Theme, out: &mut impl Write) -> Result<(SystemInfo, bool)> {
    match system::detect() {
        Ok(info) => Ok((info, true)),
        Err(e) => {
            log::warn!("{}", e);
            render::warning(
                out,
                theme,
                &format!("{}, native packages will be skipped", e),
            )?;
            Ok((system::probe(), false))
        }
    }
}

fn export(
    config: &Config,
    theme: &Theme,
    runner: &mut dyn CommandRunner,
    path: &Path,
    include_config: bool,
    dry_run: bool,
) -> Result<bool> {
    let mut out = io::stdout();
    let (info, _) = detect_or_probe(theme, &mut out)?;

    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dotfiles = include_config.then(|| (home.as_path(), config.export.dotfiles.as_slice()));
    let inventory = inventory::collect(&info, &config.paths.appimage_dirs, dotfiles);
    let doc = ProfileDocument::from_host(&info, inventory);
    profile::save(path, &doc)?;

    let mut clean = true;
    let mut backups = Vec::new();
    let mut dotfile_backup = None;
    if include_config {
        let saved = backup::backup_dotfiles(
            &home,
            &config.export.dotfiles,
            &config.paths.backup_dir,
            Local::now(),
            dry_run,
        )?;
        clean &= saved.stats.errors == 0;
        dotfile_backup = Some(saved);

        let paths = &config.paths;
        for &kind in SnapshotKind::all() {
            match snapshot::run_snapshot(kind, &paths.scripts_dir, &paths.backup_dir, runner) {
                Ok(Some(backup)) => backups.push(backup),
                Ok(None) => {}
                Err(e) => {
                    clean = false;
                    log::warn!("{:#}", e);
                    render::warning(&mut out, theme, &format!("{:#}", e))?;
                }
            }
        }
    }

    render::export_report(
        &mut out,
        theme,
        path,
        &doc.counts(),
        dotfile_backup.as_ref(),
        &backups,
    )?;
    Ok(clean)
}

fn import(
    config: &Config,
    theme: Theme,
    runner: &mut dyn CommandRunner,
    path: &Path,
    mode: &ImportMode,
    options: EngineOptions,
) -> Result<bool> {
    let doc = profile::load(path)?;

    let mut out = io::stdout();
    let (info, _) = detect_or_probe(&theme, &mut out)?;
    let builder = CommandBuilder::new(&info).with_sudo(config.install.use_sudo);

    let mut reader = StdinReader;
    let engine = ImportEngine::new(&doc, builder, &mut reader, runner, &mut out)
        .with_theme(theme)
        .with_options(options);

    let summary = match mode.categories() {
        Some(categories) => engine.install_categories(categories)?,
        None => engine.run_interactive()?,
    };
    log::debug!("import finished: {}", summary.line());
    Ok(summary.is_clean())
}

fn run_action(
    config: &Config,
    theme: &Theme,
    runner: &mut dyn CommandRunner,
    action: Action,
    args: &PackageArgs,
) -> Result<bool> {
    let category = args.category();
    let info = if category == Category::Native {
        system::detect()?
    } else {
        system::probe()
    };

    let argv = CommandBuilder::new(&info)
        .with_sudo(config.install.use_sudo)
        .build(category, action, &args.names)?;

    if let Err(e) = runner.run(&argv) {
        render::warning(&mut io::stderr(), theme, &e.to_string())?;
        return Ok(false);
    }
    Ok(true)
}

fn show_detected(theme: &Theme) -> Result<bool> {
    let mut out = io::stdout();
    let (info, found_native) = detect_or_probe(theme, &mut out)?;

    let builder = CommandBuilder::new(&info);
    let backends: Vec<(Category, Option<&str>)> = Category::all()
        .iter()
        .map(|&category| (category, builder.backend_name(category)))
        .collect();
    render::system_info(&mut out, theme, &info, &backends)?;
    Ok(found_native)
}
