use crate::utils::escape_attr;

/// Represents an action link in the page header
pub struct Action {
    pub href: String,
    pub label: String,
    pub class: String,
}

/// Component for the header action bar: navigation links plus the login state.
pub struct ActionBarComponent;

impl ActionBarComponent {
    pub fn new() -> Self {
        Self
    }

    /// Actions for a page, or for a non-page view when `title` is `None`.
    pub fn generate_actions(&self, title: Option<&str>) -> Vec<Action> {
        let mut actions = vec![
            Action { href: "/".to_string(), label: "Home".to_string(), class: "action-home".to_string() },
            Action { href: "/new".to_string(), label: "New page".to_string(), class: "action-new".to_string() },
            Action { href: "/random".to_string(), label: "Random".to_string(), class: "action-random".to_string() },
        ];

        if let Some(title) = title {
            actions.push(Action {
                href: format!("/view/{}", title),
                label: "View".to_string(),
                class: "action-view".to_string(),
            });
            actions.push(Action {
                href: format!("/edit/{}", title),
                label: "Edit".to_string(),
                class: "action-edit".to_string(),
            });
        }
        actions
    }

    /// Render the action bar, with a logout button for `user` or a login link.
    pub fn generate_html(&self, actions: &[Action], user: Option<&str>) -> String {
        let mut html = String::from("<nav class=\"actions\">");
        for action in actions {
            html.push_str(&format!(
                "<a href=\"{}\" class=\"{}\">{}</a>",
                escape_attr(&action.href),
                action.class,
                action.label
            ));
        }
        match user {
            Some(name) => html.push_str(&format!(
                "<form action=\"/logout\" method=\"POST\" class=\"action-logout\"><span class=\"user\">{}</span><input type=\"submit\" value=\"Log out\"></form>",
                crate::utils::escape_html(name)
            )),
            None => html.push_str("<a href=\"/login\" class=\"action-login\">Log in</a>"),
        }
        html.push_str("</nav>");
        html
    }
}

impl Default for ActionBarComponent {
    fn default() -> Self {
        Self::new()
    }
}
