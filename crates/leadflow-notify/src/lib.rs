// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification channels for informing agents about assignments.
//!
//! [`SmtpNotifier`] delivers over SMTP via lettre; [`LogNotifier`] is the
//! fallback channel used when no relay is configured, emitting the rendered
//! message into the log stream instead. Both render through [`templates`].

pub mod log;
pub mod smtp;
pub mod templates;

pub use log::LogNotifier;
pub use smtp::SmtpNotifier;
