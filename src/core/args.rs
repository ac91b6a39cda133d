//! # Startup arguments.
//!
//! `<ModuleName> [Debug!|NoDebug!] [worker tokens...]`
//!
//! The first token names the module. `Debug!`/`NoDebug!` tokens are recognized
//! (case-insensitively) anywhere after it and stripped; the last one wins. The
//! remaining tokens keep their order and are joined with single spaces into the
//! worker's parameter string.

use crate::error::ArgsError;

/// Parsed startup arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LaunchArgs {
    /// Module identifier (case-sensitive).
    pub module: String,
    /// Worker parameter string, `None` if no worker tokens were given.
    pub parameter: Option<String>,
    /// Startup debug flag, `None` if neither token was present.
    pub debug: Option<bool>,
}

impl LaunchArgs {
    /// Arguments for `module` with no parameters.
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            parameter: None,
            debug: None,
        }
    }

    /// Parses tokens (program name already removed).
    ///
    /// # Example
    /// ```
    /// use plugvisor::LaunchArgs;
    ///
    /// let args = LaunchArgs::parse(["Foo", "Debug!", "bar", "baz"]).unwrap();
    /// assert_eq!(args.module, "Foo");
    /// assert_eq!(args.debug, Some(true));
    /// assert_eq!(args.parameter.as_deref(), Some("bar baz"));
    /// ```
    pub fn parse<I, S>(tokens: I) -> Result<Self, ArgsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens = tokens.into_iter();
        let module = tokens
            .next()
            .map(|t| t.as_ref().trim().to_string())
            .filter(|m| !m.is_empty())
            .ok_or(ArgsError::MissingModule)?;

        let mut debug = None;
        let mut rest: Vec<String> = Vec::new();
        for token in tokens {
            let token = token.as_ref().trim();
            if token.eq_ignore_ascii_case("debug!") {
                debug = Some(true);
            } else if token.eq_ignore_ascii_case("nodebug!") {
                debug = Some(false);
            } else if !token.is_empty() {
                rest.push(token.to_string());
            }
        }

        Ok(Self {
            module,
            parameter: (!rest.is_empty()).then(|| rest.join(" ")),
            debug,
        })
    }

    /// Builder-style parameter override.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }

    /// Builder-style debug override.
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }
}
