//! The "are you sure?" prompt in front of a redemption.
//!
//! The core describes the prompt and waits for a decision input; it never
//! blocks on the answer. How the prompt looks depends on the target: native
//! builds get a two-button alert, browser builds a single confirm message.

use serde::{Deserialize, Serialize};

const TITLE: &str = "Redeem code?";
const CANCEL_LABEL: &str = "Cancel";
const CONFIRM_LABEL: &str = "Redeem";

/// The user's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Confirm,
    Cancel,
}

impl Decision {
    pub fn is_confirm(self) -> bool {
        self == Decision::Confirm
    }
}

/// Platform rendering of the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "lowercase")]
pub enum ConfirmDialog {
    Alert {
        title: String,
        message: String,
        cancel_label: String,
        confirm_label: String,
    },
    Inline {
        message: String,
    },
}

impl ConfirmDialog {
    /// Prompt for redeeming `item_title`, styled for the build target.
    pub fn for_redemption(item_title: &str) -> Self {
        if cfg!(target_family = "wasm") {
            Self::inline(item_title)
        } else {
            Self::alert(item_title)
        }
    }

    pub fn alert(item_title: &str) -> Self {
        ConfirmDialog::Alert {
            title: TITLE.into(),
            message: message(item_title),
            cancel_label: CANCEL_LABEL.into(),
            confirm_label: CONFIRM_LABEL.into(),
        }
    }

    pub fn inline(item_title: &str) -> Self {
        ConfirmDialog::Inline {
            message: format!("{TITLE} {}", message(item_title)),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ConfirmDialog::Alert { message, .. } | ConfirmDialog::Inline { message } => message,
        }
    }
}

fn message(item_title: &str) -> String {
    format!("Redeem a code for {item_title}? This cannot be undone.")
}

/// A prompt waiting for its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub item_index: usize,
    pub dialog: ConfirmDialog,
}
