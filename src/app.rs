//! Application state and event handling for mindscape

use crate::config::Config;
use crate::map::graph::MindMap;
use crate::map::MapWorkspace;
use crate::types::{Canvas, FlashMessage};
use crate::ui::Theme;
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use std::path::PathBuf;

/// Main application state
pub struct App {
    pub should_quit: bool,
    pub show_help: bool,
    pub config: Config,
    pub theme: Theme,
    pub workspace: MapWorkspace,
}

impl App {
    /// Opens the document at `file_path` when given, otherwise starts
    /// with the seed map. A path that does not exist yet becomes the
    /// save target for a fresh map.
    pub fn new(config: Config, file_path: Option<PathBuf>) -> Result<Self> {
        let theme = Theme::from_name(config.theme);

        let map = match &file_path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read map from {:?}", path))?;
                MindMap::from_json(&text)
                    .with_context(|| format!("Failed to parse map from {:?}", path))?
            }
            _ => MindMap::seed(Canvas::default()),
        };

        Ok(Self {
            should_quit: false,
            show_help: false,
            config,
            theme,
            workspace: MapWorkspace::new(map, file_path),
        })
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        expire_flash(&mut self.workspace.flash_message);

        // Help overlay absorbs everything
        if self.show_help {
            self.show_help = false;
            return Ok(());
        }

        // Text input captures ALL keys
        if self.workspace.captures_input() {
            return self.workspace.handle_key(key, &self.config);
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Char('t') => {
                self.config.theme = self.config.theme.next();
                self.theme = Theme::from_name(self.config.theme);
                if let Err(e) = self.config.save() {
                    self.workspace
                        .show_flash(&format!("Could not save config: {:#}", e), true);
                } else {
                    self.workspace.flash_message = Some(FlashMessage::new(
                        format!("Theme: {}", self.config.theme.as_str()),
                        false,
                    ));
                }
            }
            _ => self.workspace.handle_key(key, &self.config)?,
        }

        Ok(())
    }

    pub fn handle_mouse(&mut self, event: MouseEvent) {
        if self.show_help {
            return;
        }
        self.workspace.handle_mouse(event, &self.config);
    }

    pub fn update_timers(&mut self) {
        self.workspace.poll_pending();
        expire_flash(&mut self.workspace.flash_message);
    }
}

/// Expire a flash message after 3 seconds
fn expire_flash(msg: &mut Option<FlashMessage>) {
    if let Some(m) = msg {
        if m.is_expired(3) {
            *msg = None;
        }
    }
}
