//! Option-to-action resolution.
//!
//! The command line carries at most one action flag (`--add`, `--remove`,
//! `--fire`), each with a hook URL, plus positional gem names. Resolution turns
//! that loose bag of options into a single [`WebhookAction`].

use crate::{Error, Result};

/// Wildcard gem name meaning "every gem owned by the caller".
pub const ALL_GEMS: &str = "*";

/// Raw webhook options as parsed from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookOptions {
    /// Positional gem names.
    pub gem_names: Vec<String>,
    /// URL given to `--add`.
    pub add: Option<String>,
    /// URL given to `--remove`.
    pub remove: Option<String>,
    /// URL given to `--fire`.
    pub fire: Option<String>,
}

/// A resolved webhook action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAction {
    /// Register `url` for `gem_name`.
    Add {
        /// Gem name, or `*` for all gems.
        gem_name: String,
        /// Hook URL.
        url: String,
    },
    /// Unregister `url` for `gem_name`.
    Remove {
        /// Gem name, or `*` for all gems.
        gem_name: String,
        /// Hook URL.
        url: String,
    },
    /// Ask the registry to deliver a one-off test payload to `url`.
    Fire {
        /// Gem name, or `*` for all gems.
        gem_name: String,
        /// Hook URL.
        url: String,
    },
    /// List every registered webhook.
    List,
}

impl WebhookAction {
    /// Resolves parsed options into a single action.
    ///
    /// With no action flag the result is [`WebhookAction::List`] and any gem
    /// names are ignored. With one flag, exactly one gem name is required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if more than one action flag is given,
    /// if a flag is given without a gem name, or with more than one.
    pub fn resolve(options: WebhookOptions) -> Result<Self> {
        let WebhookOptions {
            gem_names,
            add,
            remove,
            fire,
        } = options;

        let mut selected = [
            (ActionFlag::Add, add),
            (ActionFlag::Remove, remove),
            (ActionFlag::Fire, fire),
        ]
        .into_iter()
        .filter_map(|(flag, url)| url.map(|url| (flag, url)));

        let Some((flag, url)) = selected.next() else {
            if !gem_names.is_empty() {
                tracing::debug!(ignored = ?gem_names, "No action flag given, listing webhooks");
            }
            return Ok(Self::List);
        };

        let conflicting: Vec<&str> = selected.map(|(other, _)| other.as_str()).collect();
        if !conflicting.is_empty() {
            return Err(Error::InvalidInput(format!(
                "only one of --add, --remove, --fire may be given (got {}, {})",
                flag.as_str(),
                conflicting.join(", ")
            )));
        }

        if url.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "{} requires a webhook URL",
                flag.as_str()
            )));
        }

        let gem_name = one_gem_name(gem_names)?;

        Ok(match flag {
            ActionFlag::Add => Self::Add { gem_name, url },
            ActionFlag::Remove => Self::Remove { gem_name, url },
            ActionFlag::Fire => Self::Fire { gem_name, url },
        })
    }

    /// Progress line shown before the request is sent.
    #[must_use]
    pub const fn notice(&self) -> Option<&'static str> {
        match self {
            Self::Add { .. } => Some("Adding webhook..."),
            Self::Remove { .. } => Some("Removing webhook..."),
            Self::Fire { .. } => Some("Test firing webhook..."),
            Self::List => None,
        }
    }

    /// Returns the gem name and URL for mutating actions.
    #[must_use]
    pub fn target(&self) -> Option<(&str, &str)> {
        match self {
            Self::Add { gem_name, url }
            | Self::Remove { gem_name, url }
            | Self::Fire { gem_name, url } => Some((gem_name, url)),
            Self::List => None,
        }
    }

    /// Short action name for logging.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Fire { .. } => "fire",
            Self::List => "list",
        }
    }

    /// Returns true if the action targets every gem.
    #[must_use]
    pub fn is_all_gems(&self) -> bool {
        self.target().is_some_and(|(gem_name, _)| gem_name == ALL_GEMS)
    }
}

/// Action-selecting command line flags.
#[derive(Debug, Clone, Copy)]
enum ActionFlag {
    Add,
    Remove,
    Fire,
}

impl ActionFlag {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Add => "--add",
            Self::Remove => "--remove",
            Self::Fire => "--fire",
        }
    }
}

/// Picks the single gem name an action flag needs.
fn one_gem_name(gem_names: Vec<String>) -> Result<String> {
    match <[String; 1]>::try_from(gem_names) {
        Ok([name]) if !name.trim().is_empty() => Ok(name),
        Ok(_) => Err(missing_gem_name()),
        Err(names) if names.is_empty() => Err(missing_gem_name()),
        Err(names) => Err(Error::InvalidInput(format!(
            "Too many gem names ({}); please specify only one",
            names.join(", ")
        ))),
    }
}

fn missing_gem_name() -> Error {
    Error::InvalidInput(
        "Please specify a gem name on the command line (e.g. gemhook webhook GEM_NAME)"
            .to_string(),
    )
}
