pub mod about;
pub mod editor;
pub mod home;

pub use about::AboutPage;
pub use editor::EditorPage;
pub use home::HomePage;
