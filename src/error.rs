use thiserror::Error;

use crate::ui::dialogs::Dialogs;

pub type Result<T> = std::result::Result<T, UiError>;

/// Errors raised inside the UI layer
///
/// None of these escape the event handler that produced them: the pane
/// boundary reports them through [`UiError::report`] and carries on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UiError {
    #[error("operation cancelled")]
    UserCancel,

    #[error("This packet may not be changed at present.")]
    NotEditable { label: String },

    #[error("This document is read-only.")]
    ReadOnly,

    #[error("{title}")]
    InvalidEdit { title: String, detail: String },

    #[error("The external program could not be run: {command}")]
    ExternalTool {
        command: String,
        exit_code: Option<i32>,
        detail: String,
    },

    #[error("The viewer for {packet} could not be created: {reason}")]
    ViewerConstruction { packet: String, reason: String },

    #[error("{0}")]
    Engine(String),
}

/// How an error should be shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Silent,
    Warning,
    Information,
    Sorry,
}

impl UiError {
    #[must_use]
    pub fn invalid(title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::InvalidEdit {
            title: title.into(),
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn not_editable(label: impl Into<String>) -> Self {
        Self::NotEditable {
            label: label.into(),
        }
    }

    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::UserCancel => Severity::Silent,
            Self::NotEditable { .. } | Self::ReadOnly => Severity::Sorry,
            Self::InvalidEdit { .. } => Severity::Information,
            Self::ExternalTool { .. } | Self::Engine(_) => Severity::Warning,
            Self::ViewerConstruction { .. } => Severity::Sorry,
        }
    }

    /// Secondary text shown beneath the headline
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        match self {
            Self::NotEditable { label } => Some(format!(
                "Packets sometimes cannot be changed because other packets depend \
                 on them. For instance, {label} may have a normal surface list or \
                 angle structure list beneath it. You can clone the packet and \
                 edit the clone instead."
            )),
            Self::InvalidEdit { detail, .. } if !detail.is_empty() => Some(detail.clone()),
            Self::ExternalTool {
                exit_code, detail, ..
            } => {
                let mut text = match exit_code {
                    Some(code) => format!("The program exited with status {code}. "),
                    None => String::new(),
                };
                if !detail.is_empty() {
                    text.push_str(detail);
                    text.push(' ');
                }
                text.push_str("You can choose a different program in the preferences.");
                Some(text)
            }
            _ => None,
        }
    }

    /// Show this error through the given dialogs, according to its severity
    pub fn report(&self, dialogs: &dyn Dialogs) {
        let text = self.to_string();
        let detail = self.detail();
        match self.severity() {
            Severity::Silent => tracing::debug!("Suppressed error: {}", text),
            Severity::Warning => {
                tracing::warn!("{}", text);
                dialogs.warn(&text, detail.as_deref());
            }
            Severity::Information => dialogs.info(&text, detail.as_deref()),
            Severity::Sorry => dialogs.sorry(&text, detail.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(UiError::UserCancel.severity(), Severity::Silent);
        assert_eq!(UiError::ReadOnly.severity(), Severity::Sorry);
        assert_eq!(
            UiError::invalid("bad", "worse").severity(),
            Severity::Information
        );
        assert_eq!(UiError::Engine("x".into()).severity(), Severity::Warning);
    }

    #[test]
    fn test_not_editable_suggests_clone() {
        let err = UiError::not_editable("tri");
        assert!(err.detail().unwrap_or_default().contains("clone"));
    }

    #[test]
    fn test_external_tool_detail_mentions_exit_code() {
        let err = UiError::ExternalTool {
            command: "dot -Tplain".into(),
            exit_code: Some(2),
            detail: String::new(),
        };
        assert!(err.to_string().contains("dot -Tplain"));
        assert!(err.detail().unwrap_or_default().contains("status 2"));
    }
}
