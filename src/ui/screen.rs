use ratatui::Frame;
use wordmix::config::ConfigStore;

use crate::{ui::render_settings, App, AppState};

/// Renders one `AppState`.
pub trait Screen<S: ConfigStore> {
    fn render(&self, app: &App<S>, f: &mut Frame);
}

/// Round screen - scrambled words, timer, scoreboard and final standings
pub struct PlayingScreen;

impl<S: ConfigStore> Screen<S> for PlayingScreen {
    fn render(&self, app: &App<S>, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Settings editor
pub struct SettingsScreen;

impl<S: ConfigStore> Screen<S> for SettingsScreen {
    fn render(&self, app: &App<S>, f: &mut Frame) {
        render_settings(app, f);
    }
}

/// The screen for `state`.
pub fn current_screen<S: ConfigStore>(state: &AppState) -> Box<dyn Screen<S>> {
    match state {
        AppState::Playing => Box::new(PlayingScreen),
        AppState::Settings => Box::new(SettingsScreen),
    }
}
