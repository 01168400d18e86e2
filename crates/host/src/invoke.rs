//! Invocation-style selection from the argument vector.

/// Environment variable carrying an alternate argument vector.
///
/// Internal seam for coverage-instrumented builds, where the real argument
/// vector belongs to the test harness.  Not a stable interface.
pub const COVERAGE_ARGS_ENV: &str = "SVCLIFT_COV_ARGS";

/// Separator between injected arguments: the code points U+00E7 U+00CD,
/// chosen to never collide with real argument text.
const COVERAGE_ARGS_SEPARATOR: &str = "\u{e7}\u{cd}";

/// How the process was invoked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Invocation {
    /// A registered sub-command: run in the foreground.
    Command {
        /// The matched sub-command name.
        name: String,
        /// Arguments following the sub-command.
        args: Vec<String>,
    },
    /// No sub-command: run as a supervised service.
    Service,
}

impl Invocation {
    /// Whether this run is interactive (keeps log output on the default
    /// target).
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Command { .. })
    }
}

/// Selects the invocation style for this process run.
///
/// The first argument after the binary name selects a sub-command when it
/// matches a registered name; anything else is a service run.
pub fn choose(argv: &[String], commands: &[&str]) -> Invocation {
    let injected = std::env::var(COVERAGE_ARGS_ENV).ok();
    choose_with_override(argv, commands, injected.as_deref())
}

/// [`choose`] with the environment override passed explicitly.
pub fn choose_with_override(
    argv: &[String],
    commands: &[&str],
    injected: Option<&str>,
) -> Invocation {
    // An injected vector reroutes the run to the first registered command,
    // dropping the leading element (the harness binary name).
    if let (Some(raw), Some(first)) = (injected, commands.first()) {
        let args = raw
            .split(COVERAGE_ARGS_SEPARATOR)
            .skip(1)
            .map(str::to_owned)
            .collect();
        return Invocation::Command {
            name: (*first).to_owned(),
            args,
        };
    }
    if let Some(name) = argv.get(1) {
        if commands.iter().any(|c| *c == name.as_str()) {
            return Invocation::Command {
                name: name.clone(),
                args: argv[2..].to_vec(),
            };
        }
    }
    Invocation::Service
}
