//! Text screens for the import session and the one-shot commands
//!
//! Every screen writes to any `io::Write`, so the session renders the same
//! way to a terminal and to a test buffer.

use crate::import::selection::EXAMPLES;
use crate::profile::ProfileDocument;
use crate::system::backup::DotfileBackup;
use crate::system::snapshot::Backup;
use crate::system::SystemInfo;
use crate::types::{Category, InstallSummary, PackageCounts};
use crate::ui::theme::Theme;
use std::io::{self, Write};

const RULE: &str = "────────────────────────────────────────";

/// Profile banner shown when the session starts
pub fn header(out: &mut impl Write, theme: &Theme, doc: &ProfileDocument) -> io::Result<()> {
    writeln!(out, "{}", theme.title("pkgport · import"))?;
    writeln!(
        out,
        "{}",
        theme.dim(format!(
            "Profile exported from {} ({}, {})",
            or_unknown(&doc.system_distro),
            or_unknown(&doc.system_package_manager),
            or_unknown(&doc.system_arch)
        ))
    )
}

pub fn main_menu(out: &mut impl Write, theme: &Theme, counts: &PackageCounts) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", theme.title("What would you like to install?"))?;
    writeln!(out, "  1) Native packages ({})", counts.native)?;
    writeln!(out, "  2) Flatpak applications ({})", counts.flatpak)?;
    writeln!(out, "  3) AppImages ({})", counts.appimage)?;
    writeln!(out, "  4) Everything ({})", counts.packages_total())?;
    writeln!(out, "  5) Browse and select packages")?;
    writeln!(out, "  6) Preview profile")?;
    writeln!(out, "  0) Exit")?;
    write!(out, "Choice: ")
}

pub fn category_menu(out: &mut impl Write, counts: &PackageCounts) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Browse which category?")?;
    for (n, category) in Category::all().iter().enumerate() {
        writeln!(out, "  {}) {} ({})", n + 1, category, counts.get(*category))?;
    }
    write!(out, "Category (empty to go back): ")
}

/// Every package with its 1-based number
pub fn package_list(
    out: &mut impl Write,
    theme: &Theme,
    category: Category,
    names: &[String],
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", theme.title(format!("{} packages", category)))?;
    let width = names.len().to_string().len();
    for (i, name) in names.iter().enumerate() {
        let number = format!("{:>width$}", i + 1, width = width);
        writeln!(out, "  {}. {}", theme.accent(number), name)?;
    }
    Ok(())
}

pub fn selection_prompt(out: &mut impl Write) -> io::Result<()> {
    write!(out, "Select packages (e.g. 1,3,5-8 | all | none): ")
}

/// Shown when a selection expression matched nothing
pub fn selection_guidance(out: &mut impl Write, theme: &Theme, len: usize) -> io::Result<()> {
    writeln!(
        out,
        "{}",
        theme.warning(format!("No valid packages selected. Use numbers between 1 and {}.", len))
    )?;
    writeln!(out, "Examples:")?;
    for (expr, meaning) in EXAMPLES {
        writeln!(out, "  {:<10} {}", expr, theme.dim(meaning))?;
    }
    Ok(())
}

/// Profile contents, category by category
pub fn preview(
    out: &mut impl Write,
    theme: &Theme,
    doc: &ProfileDocument,
    counts: &PackageCounts,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", theme.title("Profile preview"))?;
    writeln!(out, "{}", theme.dim(RULE))?;
    writeln!(out, "Distro:          {}", or_unknown(&doc.system_distro))?;
    writeln!(out, "Package manager: {}", or_unknown(&doc.system_package_manager))?;
    writeln!(out, "Architecture:    {}", or_unknown(&doc.system_arch))?;

    for category in Category::all() {
        let names = doc.packages(*category);
        writeln!(out)?;
        writeln!(out, "{} ({})", theme.accent(category), counts.get(*category))?;
        if names.is_empty() {
            writeln!(out, "  {}", theme.dim("none"))?;
        }
        for name in names {
            writeln!(out, "  {}", name)?;
        }
    }

    if counts.dotfiles > 0 {
        writeln!(out)?;
        writeln!(out, "{} ({})", theme.accent("Dotfiles"), counts.dotfiles)?;
        for path in &doc.dotfiles {
            writeln!(out, "  ~/{}", path)?;
        }
    }
    writeln!(out, "{}", theme.dim(RULE))
}

/// Packages about to be installed and the command that will do it
pub fn install_plan(
    out: &mut impl Write,
    theme: &Theme,
    category: Category,
    names: &[String],
    command: Option<&str>,
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        theme.title(format!("{} {} package(s) selected:", names.len(), category))
    )?;
    for name in names {
        writeln!(out, "  • {}", name)?;
    }
    if let Some(command) = command {
        writeln!(out, "{}", theme.dim(format!("Command: {}", command)))?;
    }
    Ok(())
}

pub fn confirm_prompt(out: &mut impl Write, default_yes: bool) -> io::Result<()> {
    let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
    write!(out, "Proceed with installation? {} ", hint)
}

pub fn method_menu(out: &mut impl Write, default_batch: bool) -> io::Result<()> {
    let (batch, individual) = if default_batch {
        (" (default)", "")
    } else {
        ("", " (default)")
    };
    writeln!(out, "Installation method:")?;
    writeln!(out, "  1) Batch, one command for every package{}", batch)?;
    writeln!(out, "  2) Individual, one command per package{}", individual)?;
    write!(out, "Method: ")
}

pub fn batch_failure_menu(out: &mut impl Write, theme: &Theme, backend: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        theme.warning(format!("{} reported an error. Some packages may not be installed.", backend))
    )?;
    writeln!(out, "  1) Continue")?;
    writeln!(out, "  2) Retry packages one at a time")?;
    writeln!(out, "  3) Show troubleshooting tips")?;
    write!(out, "Choice: ")
}

/// Generic guidance for a failing backend
pub fn troubleshooting(out: &mut impl Write, theme: &Theme, backend: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", theme.title("Troubleshooting"))?;
    let tips: &[String] = &[
        "Scroll up and read the backend output, it names the packages it rejected.".to_string(),
        "Package names differ between distributions; search for the local name.".to_string(),
        format!("Refresh the package database first (pkgport update) if {} is stale.", backend),
        "Check network access and that the repository or remote is configured.".to_string(),
        "Retrying one at a time installs everything that still resolves.".to_string(),
    ];
    for tip in tips {
        writeln!(out, "  • {}", tip)?;
    }
    Ok(())
}

pub fn installing(
    out: &mut impl Write,
    theme: &Theme,
    index: usize,
    total: usize,
    name: &str,
) -> io::Result<()> {
    writeln!(out, "{} {}", theme.dim(format!("[{}/{}]", index, total)), name)
}

pub fn package_failed(
    out: &mut impl Write,
    theme: &Theme,
    name: &str,
    reason: &str,
) -> io::Result<()> {
    writeln!(out, "{} {}: {}", theme.error("✗"), name, reason)
}

pub fn package_installed(out: &mut impl Write, theme: &Theme, name: &str) -> io::Result<()> {
    writeln!(out, "{} {}", theme.success("✓"), name)
}

pub fn warning(out: &mut impl Write, theme: &Theme, message: &str) -> io::Result<()> {
    writeln!(out, "{} {}", theme.warning("!"), message)
}

pub fn summary(out: &mut impl Write, theme: &Theme, summary: &InstallSummary) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", theme.dim(RULE))?;
    let line = summary.line();
    if summary.is_clean() {
        writeln!(out, "{}", theme.success(line))
    } else {
        writeln!(out, "{}", theme.error(line))
    }
}

/// Output of `pkgport detect`
pub fn system_info(
    out: &mut impl Write,
    theme: &Theme,
    info: &SystemInfo,
    backends: &[(Category, Option<&str>)],
) -> io::Result<()> {
    writeln!(out, "{}", theme.title("System"))?;
    writeln!(out, "  Distro:           {}", or_unknown(&info.distro))?;
    writeln!(out, "  Architecture:     {}", or_unknown(&info.architecture))?;
    writeln!(out, "  Package manager:  {}", info.native_package_manager)?;
    writeln!(out, "  Running as root:  {}", if info.is_root { "yes" } else { "no" })?;
    writeln!(out, "  Package sources:  {}", list_or_none(&info.package_sources))?;
    writeln!(out, "  Version managers: {}", list_or_none(&info.version_managers))?;
    writeln!(out, "{}", theme.title("Backends"))?;
    for (category, backend) in backends {
        match backend {
            Some(name) => writeln!(out, "  {:<9} {}", category.label(), theme.success(name))?,
            None => writeln!(out, "  {:<9} {}", category.label(), theme.dim("not available"))?,
        }
    }
    Ok(())
}

/// Result of `pkgport export`
pub fn export_report(
    out: &mut impl Write,
    theme: &Theme,
    path: &std::path::Path,
    counts: &PackageCounts,
    dotfiles: Option<&DotfileBackup>,
    backups: &[Backup],
) -> io::Result<()> {
    writeln!(out, "{} {}", theme.success("Profile written to"), path.display())?;
    writeln!(
        out,
        "  {} native · {} flatpak · {} appimage · {} dotfiles",
        counts.native, counts.flatpak, counts.appimage, counts.dotfiles
    )?;
    if let Some(saved) = dotfiles {
        let stats = &saved.stats;
        let label = if saved.dry_run {
            "Would save dotfiles:"
        } else {
            "Saved dotfiles:"
        };
        writeln!(out, "{} {}", theme.accent(label), saved.dir.display())?;
        writeln!(
            out,
            "  {} copied · {} skipped · {} errors · {}",
            stats.copied,
            stats.skipped,
            stats.errors,
            human_size(stats.bytes)
        )?;
    }
    for backup in backups {
        let label = format!("Saved {}:", backup.kind.label());
        writeln!(out, "{} {}", theme.accent(label), backup.dir.display())?;
        match &backup.restore_script {
            Some(script) => writeln!(out, "  restore with: sh {}", script.display())?,
            None => writeln!(out, "  {}", theme.dim("no restore script was generated"))?,
        }
    }
    Ok(())
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        "unknown"
    } else {
        value
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::InstallOutcome;

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut out = Vec::new();
        f(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_main_menu_shows_counts() {
        let counts = PackageCounts {
            native: 2,
            flatpak: 1,
            appimage: 0,
            dotfiles: 4,
        };
        let text = render(|out| main_menu(out, &Theme::plain(), &counts));
        assert!(text.contains("1) Native packages (2)"));
        assert!(text.contains("4) Everything (3)"));
        assert!(text.ends_with("Choice: "));
    }

    #[test]
    fn test_package_list_numbering() {
        let names = vec!["htop".to_string(), "git".to_string()];
        let text = render(|out| package_list(out, &Theme::plain(), Category::Native, &names));
        assert!(text.contains("  1. htop\n"));
        assert!(text.contains("  2. git\n"));
    }

    #[test]
    fn test_colored_numbers_stay_aligned() {
        let names: Vec<String> = (1..=10).map(|i| format!("pkg{}", i)).collect();
        let theme = Theme::gruvbox();
        let text = render(|out| package_list(out, &theme, Category::Native, &names));

        // padding sits inside the colored span, so every name starts at the same byte
        assert!(text.contains(&theme.accent(" 1")));
        assert!(text.contains(&theme.accent("10")));
        let starts: Vec<usize> = text
            .lines()
            .filter_map(|line| line.find("pkg"))
            .collect();
        assert_eq!(starts.len(), 10);
        assert!(starts.iter().all(|&start| start == starts[0]));
    }

    #[test]
    fn test_preview_handles_empty_categories() {
        let doc = ProfileDocument {
            native_packages: vec!["vim".into()],
            ..Default::default()
        };
        let text = render(|out| preview(out, &Theme::plain(), &doc, &doc.counts()));
        assert!(text.contains("Distro:          unknown"));
        assert!(text.contains("Native (1)\n  vim"));
        assert!(text.contains("Flatpak (0)\n  none"));
        assert!(!text.contains("Dotfiles"));
    }

    #[test]
    fn test_summary_line() {
        let mut result = InstallSummary::default();
        result.record(&InstallOutcome::Installed);
        result.record(&InstallOutcome::Failed("boom".into()));
        let text = render(|out| summary(out, &Theme::plain(), &result));
        assert!(text.ends_with("1 installed · 1 failed · 2 total\n"));
    }

    #[test]
    fn test_export_report_lists_dotfile_backup() {
        let saved = DotfileBackup {
            dir: "/backups/dotfiles-backup-20240115-084432".into(),
            stats: crate::system::backup::BackupStats {
                copied: 12,
                skipped: 3,
                errors: 0,
                bytes: 2048,
            },
            dry_run: false,
        };
        let counts = PackageCounts::default();
        let path = std::path::Path::new("profile.json");
        let theme = Theme::plain();
        let text = render(|out| export_report(out, &theme, path, &counts, Some(&saved), &[]));
        assert!(text.contains("Saved dotfiles: /backups/dotfiles-backup-20240115-084432\n"));
        assert!(text.contains("12 copied · 3 skipped · 0 errors · 2.0 KiB"));
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(1536), "1.5 KiB");
        assert_eq!(human_size(3 * 1024 * 1024), "3.0 MiB");
    }

    #[test]
    fn test_guidance_lists_examples() {
        let text = render(|out| selection_guidance(out, &Theme::plain(), 7));
        assert!(text.contains("between 1 and 7"));
        assert!(text.contains("1,4,7"));
        assert!(text.contains("none"));
    }
}
