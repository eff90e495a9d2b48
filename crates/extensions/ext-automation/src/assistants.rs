//! What each assistant draws.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Automation {
    FormFiller,
    LoginAssistant,
    NavigationHelper,
}

impl Automation {
    pub const ALL: [Automation; 3] = [
        Automation::FormFiller,
        Automation::LoginAssistant,
        Automation::NavigationHelper,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FormFiller => "form_filler",
            Self::LoginAssistant => "login_assistant",
            Self::NavigationHelper => "navigation_helper",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == name)
    }
}

const REQUIRED_FIELDS: &str =
    "form input[required], form select[required], form textarea[required]";
const CREDENTIAL_FIELDS: &str =
    r#"input[type="email"], input[type="password"], input[name*="user"], input[name*="login"]"#;

pub fn is_login_url(url: &str) -> bool {
    let url = url.to_ascii_lowercase();
    url.contains("login") || url.contains("signin")
}

/// Badge and required-field outline for a page with forms.
pub fn form_commands() -> Vec<Value> {
    vec![
        json!({
            "action": "text",
            "text": "Forms detected",
            "position": [10, 100],
            "color": "#2196f3",
            "backgroundColor": "rgba(33, 150, 243, 0.9)",
        }),
        json!({
            "action": "highlight",
            "selector": REQUIRED_FIELDS,
            "style": {
                "outline": "2px solid #2196f3",
                "boxShadow": "0 0 8px rgba(33, 150, 243, 0.3)",
            },
        }),
    ]
}

/// Badge and credential-field outline for a login page.
pub fn login_commands() -> Vec<Value> {
    vec![
        json!({
            "action": "text",
            "text": "Login page detected",
            "position": [10, 150],
            "color": "#4caf50",
            "backgroundColor": "rgba(76, 175, 80, 0.9)",
        }),
        json!({
            "action": "highlight",
            "selector": CREDENTIAL_FIELDS,
            "style": {
                "outline": "3px solid #4caf50",
                "boxShadow": "0 0 12px rgba(76, 175, 80, 0.5)",
            },
        }),
    ]
}
