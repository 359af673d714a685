// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::GatewayError;

/// Outcome a modal reports to whoever opened it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissRole {
    Save,
    Delete,
    Cancel,
    Refresh,
}

impl DismissRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Delete => "delete",
            Self::Cancel => "cancel",
            Self::Refresh => "refresh",
        }
    }

    /// Whether the opener's data may have changed.
    pub const fn changes_data(self) -> bool {
        matches!(self, Self::Save | Self::Delete | Self::Refresh)
    }
}

/// A modal's dismissal. `role` is `None` when the modal was closed without
/// choosing an outcome (backdrop tap, host teardown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dismissal<T = ()> {
    pub role: Option<DismissRole>,
    pub data: Option<T>,
}

impl<T> Dismissal<T> {
    pub fn new(role: DismissRole) -> Self {
        Self {
            role: Some(role),
            data: None,
        }
    }

    pub fn with_data(role: DismissRole, data: T) -> Self {
        Self {
            role: Some(role),
            data: Some(data),
        }
    }

    pub fn closed() -> Self {
        Self {
            role: None,
            data: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Delete,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(context: &str, error: &GatewayError) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: format!("{context}: {error}"),
        }
    }
}
