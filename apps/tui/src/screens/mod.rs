//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI and owns its own state and
//! rendering. Key handling returns an [`Action`] for the app to carry out.

mod configure;
mod review;

use std::fmt;

use ghdataset_shared::Decision;

pub(crate) use configure::ConfigureScreen;
pub(crate) use review::ReviewScreen;

/// Screen identifiers, in tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Configure,
    Review,
}

impl ScreenId {
    pub(crate) const ALL: [ScreenId; 2] = [ScreenId::Configure, ScreenId::Review];
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configure => write!(f, "Configure"),
            Self::Review => write!(f, "Review"),
        }
    }
}

/// Side effect requested by a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Fetch,
    Decide(Decision),
}
