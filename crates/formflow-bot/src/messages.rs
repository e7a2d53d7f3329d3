// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fixed user-facing strings.
//!
//! Anything with structure or placeholders lives in the JSON templates;
//! these are the one-off texts.

/// Thank-you sent once a submission is confirmed.
pub const THANK_YOU: &str = "Cảm ơn bạn! Chúng tôi đã nhận được thông tin.";

/// Prompt asking the user for their email address.
pub const EMAIL_PROMPT: &str =
    "Vui lòng cho chúng tôi biết email của bạn để tiếp tục nhé.";

/// Re-prompt when a message contained no recognizable email.
pub const EMAIL_STILL_MISSING: &str =
    "Chúng tôi chưa nhận được email hợp lệ. Bạn vui lòng gửi lại địa chỉ email nhé.";

/// Reply to the /support command.
pub const SUPPORT: &str =
    "Đội ngũ hỗ trợ sẽ liên hệ với bạn sớm nhất. Cảm ơn bạn đã nhắn tin!";

/// Fallback for a callback code the bot does not recognize.
pub const UNKNOWN_ACTION: &str = "Unknown action";

/// Label on the welcome CTA button.
pub const BUTTON_START: &str = "Bắt đầu";

/// Label on the form-completion callback button.
pub const BUTTON_FILLED: &str = "Tôi đã điền form";

/// Callback code attached to the welcome CTA button.
pub const CALLBACK_WELCOME_START: &str = "welcome_start";

/// Callback code attached to the form-completion button.
pub const CALLBACK_FORM_FILLED: &str = "form_filled";

/// Case-insensitive substring that turns a plain text message into a
/// `form_filled` callback, whatever the user's stage.
pub const COMPLETION_PHRASE: &str = "tôi đã điền form";

/// Slash commands the bot answers for users past the collection stages.
pub const RECOGNIZED_COMMANDS: &[&str] = &["/start", "/support"];
