pub mod actions;
pub mod navigation;
pub mod templates;

pub use actions::ActionBarComponent;
pub use navigation::NavigationComponent;
pub use templates::TemplateComponent;
