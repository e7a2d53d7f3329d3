// SPDX-FileCopyrightText: 2026 Formflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON message templates and their renderer.
//!
//! Templates are JSON documents embedded at compile time. A document has a
//! `template_name`, a `body` of text fragments with `<user_name>` and
//! `<survey_link>` placeholders, and a `ctas` list of link buttons.
//! Rendering is pure: name + optional link in, text + buttons out.

use serde::Deserialize;

use formflow_core::error::FormflowError;
use formflow_core::types::Button;

use crate::messages;

const WELCOME_JSON: &str = include_str!("../templates/template_welcome_1.json");
const FORM_JSON: &str = include_str!("../templates/template_customercare_form_2.json");
const REMINDER_JSON: &str = include_str!("../templates/template_reminder_form_3.json");

/// Template names whose rendered message carries the "I filled the form"
/// callback button.
const FORM_KEYWORDS: &[&str] = &["form", "survey", "khảo sát"];

#[derive(Debug, Deserialize)]
struct BodyItem {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct Cta {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
}

/// One parsed template document.
#[derive(Debug, Deserialize)]
pub struct Template {
    template_name: String,
    #[serde(default)]
    body: Vec<BodyItem>,
    #[serde(default)]
    ctas: Vec<Cta>,
}

impl Template {
    fn parse(raw: &str) -> Result<Self, FormflowError> {
        serde_json::from_str(raw)
            .map_err(|e| FormflowError::Internal(format!("invalid template JSON: {e}")))
    }

    /// Concatenated body text with placeholders substituted.
    fn render_text(&self, user_name: &str, survey_link: Option<&str>) -> String {
        let mut text = String::new();
        for item in &self.body {
            if item.kind != "text" {
                continue;
            }
            let mut fragment = item.text.replace("<user_name>", user_name);
            if let Some(link) = survey_link {
                fragment = fragment.replace("<survey_link>", link);
            }
            text.push_str(&fragment);
        }
        text
    }

    fn is_form_template(&self) -> bool {
        let name = self.template_name.to_lowercase();
        FORM_KEYWORDS.iter().any(|keyword| name.contains(keyword))
    }

    /// Buttons from the CTA list, plus the form-completion callback button
    /// on form-family templates.
    fn render_buttons(&self, survey_link: Option<&str>) -> Vec<Button> {
        let mut buttons = Vec::new();
        for cta in &self.ctas {
            if cta.kind != "url" {
                continue;
            }
            let url = match survey_link {
                Some(link) => cta.url.replace("<survey_link>", link),
                None => cta.url.clone(),
            };
            buttons.push(Button::url(&cta.name, url));
        }
        if self.is_form_template() {
            buttons.push(Button::callback(
                messages::BUTTON_FILLED,
                messages::CALLBACK_FORM_FILLED,
            ));
        }
        buttons
    }

    pub fn render(&self, user_name: &str, survey_link: Option<&str>) -> (String, Vec<Button>) {
        (
            self.render_text(user_name, survey_link),
            self.render_buttons(survey_link),
        )
    }
}

/// The three built-in funnel templates.
pub struct TemplateSet {
    welcome: Template,
    form: Template,
    reminder: Template,
}

impl TemplateSet {
    /// Parse the embedded template documents.
    pub fn builtin() -> Result<Self, FormflowError> {
        Ok(Self {
            welcome: Template::parse(WELCOME_JSON)?,
            form: Template::parse(FORM_JSON)?,
            reminder: Template::parse(REMINDER_JSON)?,
        })
    }

    /// Welcome message with its "Bắt đầu" callback button.
    pub fn welcome(&self, user_name: &str) -> (String, Vec<Button>) {
        let text = self.welcome.render_text(user_name, None);
        let buttons = vec![Button::callback(
            messages::BUTTON_START,
            messages::CALLBACK_WELCOME_START,
        )];
        (text, buttons)
    }

    /// Main form/CTA message.
    pub fn form(&self, user_name: &str, survey_link: Option<&str>) -> (String, Vec<Button>) {
        self.form.render(user_name, survey_link)
    }

    /// Follow-up reminder message.
    pub fn reminder(&self, user_name: &str, survey_link: Option<&str>) -> (String, Vec<Button>) {
        self.reminder.render(user_name, survey_link)
    }
}
