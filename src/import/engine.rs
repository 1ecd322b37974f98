//! Interactive import session
//!
//! A small state machine over a parsed profile:
//!
//! ```text
//! MainMenu ─┬─ 1..4 ─────────────────────────┐
//!           ├─ 5 ── PickCategory ── Browse ──┤
//!           ├─ 6 ── preview ── MainMenu      ▼
//!           └─ 0/q/EOF ── Terminal        Confirm ── MethodChoice ── Install ── MainMenu
//! ```
//!
//! Input arrives one line at a time through a [`LineReader`]. End of input
//! is never an error; it takes the safe default of whichever prompt is open.
//! Package-level failures are counted, never propagated: the only errors
//! this module returns are failures to write to the output.

use super::input::LineReader;
use super::selection::{parse_browse_input, BrowseInput};
use crate::error::{BuildError, InstallError};
use crate::profile::ProfileDocument;
use crate::system::{preview, CommandBuilder, CommandRunner};
use crate::types::{
    Action, Category, InstallMethod, InstallOutcome, InstallSummary, PackageCounts, PackageRef,
};
use crate::ui::{render, Theme};
use anyhow::Result;
use std::io::Write;

/// Session behaviour that does not come from the profile
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Method used when the method prompt gets an empty answer
    pub default_method: InstallMethod,
    /// Answer assumed when the confirmation prompt gets an empty answer
    pub confirm_default: bool,
    /// Skip the method prompt and always use this method
    pub preset_method: Option<InstallMethod>,
    /// Skip the confirmation prompt
    pub assume_yes: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_method: InstallMethod::Batch,
            confirm_default: true,
            preset_method: None,
            assume_yes: false,
        }
    }
}

/// Names from one category headed for one backend
#[derive(Debug, Clone, PartialEq, Eq)]
struct Plan {
    category: Category,
    names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    MainMenu,
    PickCategory,
    Browse(Category),
    Confirm(Vec<Plan>),
    MethodChoice(Vec<Plan>),
    Install(Vec<Plan>, InstallMethod),
    Terminal,
}

/// Drives one import session against a detected system
pub struct ImportEngine<'a> {
    doc: &'a ProfileDocument,
    counts: PackageCounts,
    builder: CommandBuilder<'a>,
    reader: &'a mut dyn LineReader,
    runner: &'a mut dyn CommandRunner,
    out: &'a mut dyn Write,
    theme: Theme,
    options: EngineOptions,
    session: InstallSummary,
}

impl<'a> ImportEngine<'a> {
    pub fn new(
        doc: &'a ProfileDocument,
        builder: CommandBuilder<'a>,
        reader: &'a mut dyn LineReader,
        runner: &'a mut dyn CommandRunner,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            counts: doc.counts(),
            doc,
            builder,
            reader,
            runner,
            out,
            theme: Theme::plain(),
            options: EngineOptions::default(),
            session: InstallSummary::default(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    /// Run the menu loop until the user exits or input ends
    pub fn run_interactive(mut self) -> Result<InstallSummary> {
        render::header(&mut self.out, &self.theme, self.doc)?;

        let mut state = State::MainMenu;
        while state != State::Terminal {
            state = self.step(state)?;
        }

        render::summary(&mut self.out, &self.theme, &self.session)?;
        Ok(self.session)
    }

    /// Install whole categories without the menu
    ///
    /// Goes through the same confirmation, method choice and execution as
    /// the interactive menu, then returns.
    pub fn install_categories(mut self, categories: &[Category]) -> Result<InstallSummary> {
        let plans = self.plans_for(categories)?;
        if plans.is_empty() {
            render::warning(&mut self.out, &self.theme, "Nothing to install.")?;
        } else {
            let mut state = State::Confirm(plans);
            while !matches!(state, State::MainMenu | State::Terminal) {
                state = self.step(state)?;
            }
        }
        Ok(self.session)
    }

    fn step(&mut self, state: State) -> Result<State> {
        log::debug!("import state: {:?}", state);
        match state {
            State::MainMenu => self.main_menu(),
            State::PickCategory => self.pick_category(),
            State::Browse(category) => self.browse(category),
            State::Confirm(plans) => self.confirm(plans),
            State::MethodChoice(plans) => self.choose_method(plans),
            State::Install(plans, method) => self.install(plans, method),
            State::Terminal => Ok(State::Terminal),
        }
    }

    fn main_menu(&mut self) -> Result<State> {
        render::main_menu(&mut self.out, &self.theme, &self.counts)?;

        let Some(line) = self.reader.read_line() else {
            writeln!(self.out)?;
            render::preview(&mut self.out, &self.theme, self.doc, &self.counts)?;
            return Ok(State::Terminal);
        };

        let next = match line.trim() {
            "1" => self.start(&[Category::Native])?,
            "2" => self.start(&[Category::Flatpak])?,
            "3" => self.start(&[Category::AppImage])?,
            "4" => self.start(Category::all())?,
            "5" => State::PickCategory,
            "6" => {
                render::preview(&mut self.out, &self.theme, self.doc, &self.counts)?;
                State::MainMenu
            }
            "0" | "q" | "Q" => State::Terminal,
            other => {
                log::debug!("unrecognised menu choice {:?}", other);
                State::MainMenu
            }
        };
        Ok(next)
    }

    fn start(&mut self, categories: &[Category]) -> Result<State> {
        let plans = self.plans_for(categories)?;
        if plans.is_empty() {
            Ok(State::MainMenu)
        } else {
            Ok(State::Confirm(plans))
        }
    }

    /// One plan per category that has packages and a backend; warns about the rest
    ///
    /// Names in a requested category without a backend are recorded as
    /// failed in the session, so the run does not end clean.
    fn plans_for(&mut self, categories: &[Category]) -> Result<Vec<Plan>> {
        let mut plans = Vec::new();
        for &category in categories {
            let count = self.counts.get(category);
            if self.check_available(category)? {
                plans.push(Plan {
                    category,
                    names: self.doc.packages(category).to_vec(),
                });
            } else if count > 0 {
                let reason = BuildError::NoBackendAvailable(category).to_string();
                self.session.merge(all(count, InstallOutcome::Failed(reason)));
            }
        }
        Ok(plans)
    }

    fn check_available(&mut self, category: Category) -> Result<bool> {
        let message = if self.counts.get(category) == 0 {
            format!("No {} packages in this profile, skipping.", category)
        } else if self.builder.backend_name(category).is_none() {
            format!("No {} backend available on this system, skipping.", category)
        } else {
            return Ok(true);
        };

        log::warn!("{}", message);
        render::warning(&mut self.out, &self.theme, &message)?;
        Ok(false)
    }

    fn pick_category(&mut self) -> Result<State> {
        render::category_menu(&mut self.out, &self.counts)?;

        let category = match self.reader.read_line().as_deref().map(str::trim) {
            None | Some("") => return Ok(State::MainMenu),
            Some("1") => Category::Native,
            Some("2") => Category::Flatpak,
            Some("3") => Category::AppImage,
            Some(_) => return Ok(State::PickCategory),
        };

        if self.check_available(category)? {
            Ok(State::Browse(category))
        } else {
            Ok(State::MainMenu)
        }
    }

    fn browse(&mut self, category: Category) -> Result<State> {
        let doc = self.doc;
        let names = doc.packages(category);
        render::package_list(&mut self.out, &self.theme, category, names)?;
        render::selection_prompt(&mut self.out)?;

        let line = self.reader.read_line();
        match parse_browse_input(line.as_deref(), names.len()) {
            BrowseInput::Abort => Ok(State::MainMenu),
            BrowseInput::Selected(indices) if indices.is_empty() => {
                render::selection_guidance(&mut self.out, &self.theme, names.len())?;
                Ok(State::Browse(category))
            }
            BrowseInput::Selected(indices) => {
                let names = indices.iter().map(|&i| names[i].clone()).collect();
                Ok(State::Confirm(vec![Plan { category, names }]))
            }
        }
    }

    fn confirm(&mut self, plans: Vec<Plan>) -> Result<State> {
        for plan in &plans {
            let command = self
                .builder
                .build(plan.category, Action::Install, &plan.names)
                .ok()
                .filter(|_| plan.category.supports_batch())
                .map(|argv| preview(&argv));
            render::install_plan(
                &mut self.out,
                &self.theme,
                plan.category,
                &plan.names,
                command.as_deref(),
            )?;
        }

        if self.options.assume_yes {
            return Ok(State::MethodChoice(plans));
        }

        render::confirm_prompt(&mut self.out, self.options.confirm_default)?;
        let accepted = match self.reader.read_line().as_deref().map(str::trim) {
            None | Some("") => self.options.confirm_default,
            Some(answer) => !answer.starts_with(['n', 'N']),
        };

        if accepted {
            Ok(State::MethodChoice(plans))
        } else {
            writeln!(self.out, "Installation cancelled.")?;
            Ok(State::MainMenu)
        }
    }

    fn choose_method(&mut self, plans: Vec<Plan>) -> Result<State> {
        if let Some(method) = self.options.preset_method {
            return Ok(State::Install(plans, method));
        }
        if !plans.iter().any(|plan| plan.category.supports_batch()) {
            return Ok(State::Install(plans, InstallMethod::Individual));
        }

        let default = self.options.default_method;
        render::method_menu(&mut self.out, default == InstallMethod::Batch)?;
        let method = match self.reader.read_line().as_deref().map(str::trim) {
            None | Some("") => default,
            Some("1") => InstallMethod::Batch,
            Some("2") => InstallMethod::Individual,
            Some(_) => return Ok(State::MethodChoice(plans)),
        };
        Ok(State::Install(plans, method))
    }

    fn install(&mut self, plans: Vec<Plan>, method: InstallMethod) -> Result<State> {
        let mut run = InstallSummary::default();
        for plan in &plans {
            let result = match method {
                InstallMethod::Batch if plan.category.supports_batch() => {
                    self.install_batch(plan.category, &plan.names)?
                }
                _ => self.install_individually(plan.category, &plan.names)?,
            };
            run.merge(result);
        }

        render::summary(&mut self.out, &self.theme, &run)?;
        self.session.merge(run);
        Ok(State::MainMenu)
    }

    /// One backend invocation per name; failures never stop the loop
    fn install_individually(
        &mut self,
        category: Category,
        names: &[String],
    ) -> Result<InstallSummary> {
        let mut summary = InstallSummary::default();
        for (i, name) in names.iter().enumerate() {
            render::installing(&mut self.out, &self.theme, i + 1, names.len(), name)?;

            let outcome = match self.install_single(&PackageRef::new(name.as_str(), category)) {
                Ok(()) => {
                    render::package_installed(&mut self.out, &self.theme, name)?;
                    InstallOutcome::Installed
                }
                Err(e) => {
                    log::debug!("{} failed: {}", name, e);
                    let reason = e.to_string();
                    render::package_failed(&mut self.out, &self.theme, name, &reason)?;
                    InstallOutcome::Failed(reason)
                }
            };
            summary.record(&outcome);
        }
        Ok(summary)
    }

    /// One backend invocation for every name
    ///
    /// The backend's output is not parsed, so a failed batch either counts
    /// every name as failed or is retried one name at a time.
    fn install_batch(
        &mut self,
        category: Category,
        names: &[String],
    ) -> Result<InstallSummary> {
        let result = self
            .builder
            .build(category, Action::Install, names)
            .map_err(InstallError::from)
            .and_then(|argv| self.runner.run(&argv));

        let error = match result {
            Ok(()) => return Ok(all(names.len(), InstallOutcome::Installed)),
            Err(e @ InstallError::Build(_)) => {
                let reason = e.to_string();
                render::package_failed(&mut self.out, &self.theme, category.label(), &reason)?;
                return Ok(all(names.len(), InstallOutcome::Failed(reason)));
            }
            Err(e) => e,
        };

        let backend = self.builder.backend_name(category).unwrap_or(category.label());
        loop {
            render::batch_failure_menu(&mut self.out, &self.theme, backend)?;
            match self.reader.read_line().as_deref().map(str::trim) {
                None | Some("") | Some("1") => {
                    return Ok(all(names.len(), InstallOutcome::Failed(error.to_string())));
                }
                Some("2") => return self.install_individually(category, names),
                Some("3") => render::troubleshooting(&mut self.out, &self.theme, backend)?,
                Some(_) => {}
            }
        }
    }

    /// Install one package, blocking until its backend exits
    pub fn install_single(&mut self, package: &PackageRef) -> Result<(), InstallError> {
        if package.category == Category::AppImage {
            return Err(InstallError::NotImplemented(Category::AppImage));
        }
        let argv = self
            .builder
            .build(package.category, Action::Install, std::slice::from_ref(&package.name))?;
        self.runner.run(&argv)
    }
}

fn all(count: usize, outcome: InstallOutcome) -> InstallSummary {
    let mut summary = InstallSummary::default();
    for _ in 0..count {
        summary.record(&outcome);
    }
    summary
}
