use log::{debug, info};
use crate::errors::WikiError;
use crate::services::PageFinder;
use crate::utils::{escape_attr, escape_html};

/// Component for handling navigation and sidebar generation
#[derive(Clone)]
pub struct NavigationComponent {
    finder: PageFinder,
}

impl NavigationComponent {
    /// Create a new navigation component
    pub fn new(finder: PageFinder) -> Self {
        Self { finder }
    }

    /// Build sidebar HTML listing every page, marking `current_title`.
    pub fn build_sidebar_html(&self, current_title: Option<&str>) -> Result<String, WikiError> {
        let start_time = std::time::Instant::now();
        let titles = self.finder.list()?;
        debug!("Building sidebar with {} pages", titles.len());

        let mut html = String::new();
        html.push_str("<div class=\"sidebar-nav\">");
        html.push_str("<h3>Pages</h3>");

        if titles.is_empty() {
            html.push_str("<p class=\"nav-empty\">No pages yet.</p>");
        } else {
            html.push_str("<ul class=\"nav-list\">");
            for title in &titles {
                let current_class = if current_title == Some(title.as_str()) {
                    " class=\"current\""
                } else {
                    ""
                };
                html.push_str(&format!(
                    "<li{}><a href=\"/view/{}\">{}</a></li>",
                    current_class,
                    escape_attr(title),
                    escape_html(&title.replace('_', " "))
                ));
            }
            html.push_str("</ul>");
        }
        html.push_str("</div>");

        info!("Sidebar built in {}ms", start_time.elapsed().as_millis());
        Ok(html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::PageStore;
    use crate::types::Page;

    #[test]
    fn sidebar_lists_pages_and_marks_the_current_one() {
        let dir = tempfile::tempdir().unwrap();
        let store = PageStore::new(dir.path().to_path_buf());
        store.save(&Page::new("Front_Page", "x")).unwrap();
        store.save(&Page::new("Other", "y")).unwrap();
        let nav = NavigationComponent::new(PageFinder::new(store));

        let html = nav.build_sidebar_html(Some("Other")).unwrap();
        assert!(html.contains("<a href=\"/view/Front_Page\">Front Page</a>"));
        assert!(html.contains("<li class=\"current\"><a href=\"/view/Other\">Other</a></li>"));
        assert!(html.find("Front_Page").unwrap() < html.find("/view/Other").unwrap());
    }

    #[test]
    fn empty_store_gets_a_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let nav = NavigationComponent::new(PageFinder::new(PageStore::new(dir.path().to_path_buf())));
        assert!(nav.build_sidebar_html(None).unwrap().contains("No pages yet."));
    }
}
