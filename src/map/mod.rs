//! Mind map workspace
//!
//! The interactive module that owns the document: selection, dragging,
//! text input, and the AI operations (whole-map generation, node
//! expansion, node chat). AI calls run on background threads and send
//! their result over a channel; `poll_pending` drains those channels
//! from the main loop, so the graph itself only ever mutates on the UI
//! thread and an expansion lands as one atomic batch or not at all.

pub mod ai;
pub mod export;
pub mod graph;
pub mod layout;
pub mod render;

use crate::config::Config;
use crate::types::{Canvas, FlashMessage, Point};
use ai::{AiError, GeminiClient, MapOutline, TextGenerator};
use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use graph::MindMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::layout::Rect;
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::path::PathBuf;
use std::sync::mpsc;

/// Canvas units covered by one terminal cell. Cells are about twice as
/// tall as they are wide, so the vertical step is doubled to keep the
/// layout's circles round on screen.
pub const CELL_UNITS_X: f64 = 10.0;
pub const CELL_UNITS_Y: f64 = 20.0;

type ExpansionRx = mpsc::Receiver<Result<Vec<String>, AiError>>;
type OutlineRx = mpsc::Receiver<Result<MapOutline, AiError>>;
type ChatRx = mpsc::Receiver<Result<String, AiError>>;

/// Which text field currently captures keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputFocus {
    #[default]
    None,
    Topic,
    Chat,
}

/// One line of the per-node assistant transcript
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub from_user: bool,
    pub text: String,
}

struct DragState {
    key: String,
    offset: Point,
    moved: bool,
}

pub struct MapWorkspace {
    pub map: MindMap,
    pub selected: Option<String>,
    pub input: InputFocus,
    pub topic_input: String,
    pub chat_input: String,
    pub chat_log: Vec<ChatMessage>,
    pub file_path: Option<PathBuf>,
    pub flash_message: Option<FlashMessage>,

    /// Inner rect of the map widget, refreshed by the renderer each
    /// frame; pointer events outside it are ignored
    pub map_area: Option<Rect>,

    drag: Option<DragState>,
    pending_expansions: HashMap<String, ExpansionRx>,
    pending_generation: Option<(String, OutlineRx)>,
    pending_chat: Option<(String, ChatRx)>,
    rng: StdRng,
}

impl MapWorkspace {
    pub fn new(map: MindMap, file_path: Option<PathBuf>) -> Self {
        Self {
            map,
            selected: None,
            input: InputFocus::None,
            topic_input: String::new(),
            chat_input: String::new(),
            chat_log: Vec::new(),
            file_path,
            flash_message: None,
            map_area: None,
            drag: None,
            pending_expansions: HashMap::new(),
            pending_generation: None,
            pending_chat: None,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn show_flash(&mut self, msg: &str, is_error: bool) {
        self.flash_message = Some(FlashMessage::new(msg.to_string(), is_error));
    }

    /// True while a text field owns the keyboard
    pub fn captures_input(&self) -> bool {
        self.input != InputFocus::None
    }

    pub fn is_expanding(&self, key: &str) -> bool {
        self.pending_expansions.contains_key(&graph::canonical_key(key))
    }

    pub fn generation_topic(&self) -> Option<&str> {
        self.pending_generation.as_ref().map(|(topic, _)| topic.as_str())
    }

    pub fn chat_waiting(&self) -> bool {
        self.pending_chat.is_some()
    }

    /// The canvas a fresh document would get, from the last rendered
    /// viewport; falls back to the current document's canvas
    pub fn viewport_canvas(&self) -> Canvas {
        match self.map_area {
            Some(area) if area.width > 0 && area.height > 0 => Canvas::new(
                area.width as f64 * CELL_UNITS_X,
                area.height as f64 * CELL_UNITS_Y,
            ),
            _ => self.map.canvas(),
        }
    }

    // ── Selection ──

    /// Selects a node and resets the assistant context for it. A reply
    /// still in flight for the previous selection is dropped.
    pub fn select(&mut self, key: &str) {
        let key = graph::canonical_key(key);
        if !self.map.contains(&key) {
            return;
        }
        self.selected = Some(key);
        self.chat_log.clear();
        self.chat_input.clear();
        self.pending_chat = None;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.chat_log.clear();
        self.chat_input.clear();
        self.pending_chat = None;
    }

    fn cycle_selection(&mut self, step: isize) {
        let keys: Vec<&str> = self.map.nodes().map(|n| n.key.as_str()).collect();
        if keys.is_empty() {
            return;
        }
        let current = self
            .selected
            .as_deref()
            .and_then(|sel| keys.iter().position(|k| *k == sel));
        let next = match current {
            Some(i) => (i as isize + step).rem_euclid(keys.len() as isize) as usize,
            None => 0,
        };
        let key = keys[next].to_string();
        self.select(&key);
    }

    // ── Pointer state machine ──

    /// Pointer-down over a node arms a drag and captures the offset
    /// between pointer and node origin
    pub fn pointer_down(&mut self, p: Point) {
        if let Some(key) = render::hit_test(&self.map, p) {
            let node_pos = match self.map.get(&key) {
                Some(node) => node.position,
                None => return,
            };
            self.drag = Some(DragState {
                key,
                offset: Point::new(p.x - node_pos.x, p.y - node_pos.y),
                moved: false,
            });
        }
    }

    /// Pointer movement while armed drags the node, clamped live
    pub fn pointer_drag(&mut self, p: Point) {
        if let Some(drag) = &mut self.drag {
            drag.moved = true;
            let to = Point::new(p.x - drag.offset.x, p.y - drag.offset.y);
            let key = drag.key.clone();
            self.map.move_node(&key, to);
        }
    }

    /// Pointer-up ends a drag; a press-release without movement is a
    /// click: plain click selects, delete-modifier click removes the
    /// subtree
    pub fn pointer_up(&mut self, shift: bool) {
        if let Some(drag) = self.drag.take() {
            if drag.moved {
                return;
            }
            if shift {
                self.delete_node(&drag.key);
            } else {
                self.select(&drag.key);
            }
        }
    }

    /// Secondary activation (right-click): expand the node under the
    /// pointer without touching selection
    pub fn pointer_secondary(&mut self, p: Point, client: impl TextGenerator + 'static) {
        if let Some(key) = render::hit_test(&self.map, p) {
            self.start_expansion(&key, client);
        }
    }

    // ── Mutations ──

    /// Deletes a subtree. The root is guarded; selection and pending
    /// work pointing into the removed subtree are cleaned up.
    pub fn delete_node(&mut self, key: &str) {
        let key = graph::canonical_key(key);
        if key == self.map.root_key() {
            self.show_flash("The root concept stays", true);
            return;
        }
        let removed = self.map.delete_subtree(&key);
        if removed == 0 {
            return;
        }
        // receivers aimed at vanished nodes are dropped, so a late
        // reply has nowhere to land
        let stale: Vec<String> = self
            .pending_expansions
            .keys()
            .filter(|k| !self.map.contains(k))
            .cloned()
            .collect();
        for k in stale {
            self.pending_expansions.remove(&k);
        }
        if let Some((chat_key, _)) = &self.pending_chat {
            if !self.map.contains(chat_key) {
                self.pending_chat = None;
            }
        }
        if self.selected.as_deref().map(|s| !self.map.contains(s)).unwrap_or(false) {
            self.clear_selection();
        }
        tracing::info!(key = %key, removed, "subtree deleted");
        self.show_flash(&format!("Removed {} node(s)", removed), false);
    }

    // ── Whole-map generation ──

    /// Requests a complete outline for `topic` in the background.
    /// Returns false when rejected (empty topic or one already running).
    pub fn start_generation(&mut self, topic: &str, client: impl TextGenerator + 'static) -> bool {
        let topic = topic.trim().to_string();
        if topic.is_empty() {
            self.show_flash("Type a topic first", true);
            return false;
        }
        if self.pending_generation.is_some() {
            self.show_flash("A map is already being generated", true);
            return false;
        }
        let (tx, rx) = mpsc::channel();
        let prompt = ai::outline_prompt(&topic);
        self.pending_generation = Some((topic, rx));
        std::thread::spawn(move || {
            let result = client.complete(&prompt).and_then(|reply| ai::parse_outline(&reply));
            let _ = tx.send(result);
        });
        true
    }

    fn poll_generation(&mut self) {
        let outcome = match &self.pending_generation {
            Some((_, rx)) => match rx.try_recv() {
                Ok(result) => Some(Ok(result)),
                Err(mpsc::TryRecvError::Empty) => None,
                Err(mpsc::TryRecvError::Disconnected) => Some(Err(())),
            },
            None => None,
        };
        let outcome = match outcome {
            Some(o) => o,
            None => return,
        };
        let topic = match self.pending_generation.take() {
            Some((topic, _)) => topic,
            None => return,
        };
        match outcome {
            Ok(Ok(outline)) => self.apply_generation(&topic, outline),
            Ok(Err(e)) => self.show_flash(&format!("Generation failed: {}", e), true),
            Err(()) => self.show_flash("Generation worker vanished", true),
        }
    }

    fn apply_generation(&mut self, topic: &str, outline: MapOutline) {
        let canvas = self.viewport_canvas();
        let replacement = MindMap::from_outline(topic, &outline, canvas);
        let count = replacement.len();
        match self.map.replace_all(replacement) {
            Ok(()) => {
                // the old graph is gone; so is everything aimed at it
                self.pending_expansions.clear();
                self.clear_selection();
                tracing::info!(topic = %topic, count, "map generated");
                self.show_flash(&format!("Mapped \"{}\" with {} concepts", topic, count), false);
            }
            Err(e) => self.show_flash(&format!("Generated map was invalid: {}", e), true),
        }
    }

    // ── Node expansion ──

    /// Requests 3-6 child concepts for `key` in the background. At most
    /// one expansion may be in flight per node; duplicates are rejected,
    /// not queued.
    pub fn start_expansion(&mut self, key: &str, client: impl TextGenerator + 'static) -> bool {
        let key = graph::canonical_key(key);
        if !self.map.contains(&key) {
            return false;
        }
        if self.pending_expansions.contains_key(&key) {
            self.show_flash(&format!("\"{}\" is already expanding", key), true);
            return false;
        }
        let (tx, rx) = mpsc::channel();
        let prompt = ai::expand_prompt(&key);
        self.pending_expansions.insert(key.clone(), rx);
        tracing::info!(key = %key, "expansion requested");
        std::thread::spawn(move || {
            let result = client.complete(&prompt).and_then(|reply| ai::parse_concepts(&reply));
            let _ = tx.send(result);
        });
        true
    }

    fn poll_expansions(&mut self) {
        let keys: Vec<String> = self.pending_expansions.keys().cloned().collect();
        for key in keys {
            let outcome = match self.pending_expansions.get(&key) {
                Some(rx) => rx.try_recv(),
                None => continue,
            };
            match outcome {
                Ok(result) => {
                    self.pending_expansions.remove(&key);
                    self.apply_expansion(&key, result);
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.pending_expansions.remove(&key);
                    self.show_flash("Expansion worker vanished", true);
                }
            }
        }
    }

    fn apply_expansion(&mut self, key: &str, result: Result<Vec<String>, AiError>) {
        let concepts = match result {
            Ok(concepts) => concepts,
            Err(e) => {
                self.show_flash(&format!("Expansion failed: {}", e), true);
                return;
            }
        };
        if !self.map.contains(key) {
            // the node died while the reply was in flight
            tracing::debug!(key = %key, "discarding expansion for deleted node");
            return;
        }
        let base_angle = self.rng.gen_range(0.0..TAU);
        let added = self.map.merge_expansion(key, &concepts, base_angle);
        if added == 0 {
            self.show_flash("Nothing new, all suggestions already mapped", false);
        } else {
            tracing::info!(key = %key, added, "expansion applied");
            self.show_flash(&format!("Added {} concept(s) under \"{}\"", added, key), false);
        }
    }

    // ── Node chat ──

    /// Sends the typed question about the selected node. One exchange
    /// at a time; the transcript belongs to the current selection.
    pub fn start_chat(&mut self, client: impl TextGenerator + 'static) -> bool {
        let key = match &self.selected {
            Some(key) => key.clone(),
            None => {
                self.show_flash("Select a node to chat about", true);
                return false;
            }
        };
        let question = self.chat_input.trim().to_string();
        if question.is_empty() {
            return false;
        }
        if self.pending_chat.is_some() {
            self.show_flash("Still waiting for the last answer", true);
            return false;
        }
        self.chat_log.push(ChatMessage {
            from_user: true,
            text: question.clone(),
        });
        self.chat_input.clear();
        let prompt = ai::chat_prompt(self.map.name(), &key, &question);
        let (tx, rx) = mpsc::channel();
        self.pending_chat = Some((key, rx));
        std::thread::spawn(move || {
            let _ = tx.send(client.complete(&prompt));
        });
        true
    }

    fn poll_chat(&mut self) {
        let outcome = match &self.pending_chat {
            Some((_, rx)) => match rx.try_recv() {
                Ok(result) => Some(Ok(result)),
                Err(mpsc::TryRecvError::Empty) => None,
                Err(mpsc::TryRecvError::Disconnected) => Some(Err(())),
            },
            None => None,
        };
        let outcome = match outcome {
            Some(o) => o,
            None => return,
        };
        let key = match self.pending_chat.take() {
            Some((key, _)) => key,
            None => return,
        };
        match outcome {
            Ok(Ok(answer)) => {
                // selection moved on or the node is gone: stale, drop it
                if self.selected.as_deref() == Some(key.as_str()) && self.map.contains(&key) {
                    self.chat_log.push(ChatMessage {
                        from_user: false,
                        text: answer,
                    });
                } else {
                    tracing::debug!(key = %key, "discarding stale chat reply");
                }
            }
            Ok(Err(e)) => self.show_flash(&format!("Chat failed: {}", e), true),
            Err(()) => self.show_flash("Chat worker vanished", true),
        }
    }

    /// Drains every pending background channel. Called on each tick.
    pub fn poll_pending(&mut self) {
        self.poll_generation();
        self.poll_expansions();
        self.poll_chat();
    }

    // ── Persistence boundary ──

    /// Writes the live document as JSON; keeps writing to the same file
    /// once a path is known
    pub fn save_document(&mut self) -> Result<PathBuf> {
        let path = match &self.file_path {
            Some(path) => path.clone(),
            None => {
                let dir = dirs::download_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
                std::fs::create_dir_all(&dir)?;
                dir.join(format!("{}.json", export::file_stem(self.map.name())))
            }
        };
        let text = self.map.to_json().context("could not serialize the map")?;
        std::fs::write(&path, text).with_context(|| format!("could not write {}", path.display()))?;
        self.file_path = Some(path.clone());
        tracing::info!(path = %path.display(), "document saved");
        Ok(path)
    }

    // ── Event handling ──

    fn gemini_from(config: &Config) -> GeminiClient {
        GeminiClient::new(&config.ai_api_key, &config.ai_model)
    }

    fn expand_via_config(&mut self, key: &str, config: &Config) {
        if !config.ai_available() {
            self.show_flash(&AiError::Configuration.to_string(), true);
            return;
        }
        let key = key.to_string();
        self.start_expansion(&key, Self::gemini_from(config));
    }

    pub fn handle_key(&mut self, key: KeyEvent, config: &Config) -> Result<()> {
        match self.input {
            InputFocus::Topic => self.handle_topic_key(key, config),
            InputFocus::Chat => self.handle_chat_key(key, config),
            InputFocus::None => self.handle_normal_key(key, config),
        }
        Ok(())
    }

    fn handle_topic_key(&mut self, key: KeyEvent, config: &Config) {
        match key.code {
            KeyCode::Esc => {
                // leaving the mode abandons a wait started from it
                self.input = InputFocus::None;
                self.pending_generation = None;
            }
            KeyCode::Enter => {
                self.input = InputFocus::None;
                let topic = std::mem::take(&mut self.topic_input);
                if !config.ai_available() {
                    self.show_flash(&AiError::Configuration.to_string(), true);
                    return;
                }
                self.start_generation(&topic, Self::gemini_from(config));
            }
            KeyCode::Backspace => {
                self.topic_input.pop();
            }
            KeyCode::Char(c) => self.topic_input.push(c),
            _ => {}
        }
    }

    fn handle_chat_key(&mut self, key: KeyEvent, config: &Config) {
        match key.code {
            KeyCode::Esc => {
                self.input = InputFocus::None;
                self.pending_chat = None;
            }
            KeyCode::Enter => {
                if !config.ai_available() {
                    self.show_flash(&AiError::Configuration.to_string(), true);
                    return;
                }
                self.start_chat(Self::gemini_from(config));
            }
            KeyCode::Backspace => {
                self.chat_input.pop();
            }
            KeyCode::Char(c) => self.chat_input.push(c),
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent, config: &Config) {
        match key.code {
            KeyCode::Char('g') => {
                self.topic_input.clear();
                self.input = InputFocus::Topic;
            }
            KeyCode::Char('c') => {
                if self.selected.is_some() {
                    self.input = InputFocus::Chat;
                } else {
                    self.show_flash("Select a node to chat about", true);
                }
            }
            KeyCode::Char('e') => {
                if let Some(selected) = self.selected.clone() {
                    self.expand_via_config(&selected, config);
                } else {
                    self.show_flash("Select a node to expand", true);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(selected) = self.selected.clone() {
                    self.delete_node(&selected);
                } else {
                    self.show_flash("Select a node to delete", true);
                }
            }
            KeyCode::Char('x') => match export::save_png(&self.map) {
                Ok(path) => self.show_flash(&format!("Exported {}", path.display()), false),
                Err(e) => self.show_flash(&format!("Export failed: {}", e), true),
            },
            KeyCode::Char('s') => match self.save_document() {
                Ok(path) => self.show_flash(&format!("Saved {}", path.display()), false),
                Err(e) => self.show_flash(&format!("Save failed: {:#}", e), true),
            },
            KeyCode::Tab | KeyCode::Right | KeyCode::Down => self.cycle_selection(1),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Up => self.cycle_selection(-1),
            KeyCode::Esc => self.clear_selection(),
            _ => {}
        }
    }

    /// Mouse dispatch: left button drives the drag/select/delete state
    /// machine, right button expands the node under the pointer
    pub fn handle_mouse(&mut self, event: MouseEvent, config: &Config) {
        let p = match self.cell_to_canvas(event.column, event.row) {
            Some(p) => p,
            None => {
                // releasing outside the map still ends an armed drag
                if matches!(event.kind, MouseEventKind::Up(MouseButton::Left)) {
                    self.drag = None;
                }
                return;
            }
        };
        match event.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer_down(p),
            MouseEventKind::Drag(MouseButton::Left) => self.pointer_drag(p),
            MouseEventKind::Up(MouseButton::Left) => {
                self.pointer_up(event.modifiers.contains(KeyModifiers::SHIFT));
            }
            MouseEventKind::Down(MouseButton::Right) => {
                if let Some(key) = render::hit_test(&self.map, p) {
                    self.expand_via_config(&key, config);
                }
            }
            _ => {}
        }
    }

    /// Projects a terminal cell onto the document canvas
    fn cell_to_canvas(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.map_area?;
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
            || area.width == 0
            || area.height == 0
        {
            return None;
        }
        let canvas = self.map.canvas();
        let x = (column - area.x) as f64 + 0.5;
        let y = (row - area.y) as f64 + 0.5;
        Some(Point::new(
            x * canvas.width / area.width as f64,
            y * canvas.height / area.height as f64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    struct FakeGenerator {
        reply: String,
    }

    impl FakeGenerator {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
            }
        }
    }

    impl TextGenerator for FakeGenerator {
        fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            Ok(self.reply.clone())
        }
    }

    /// Blocks inside `complete` until the test releases the gate
    struct GatedGenerator {
        gate: Mutex<mpsc::Receiver<()>>,
        reply: String,
    }

    impl GatedGenerator {
        fn new(reply: &str) -> (Self, mpsc::Sender<()>) {
            let (tx, rx) = mpsc::channel();
            (
                Self {
                    gate: Mutex::new(rx),
                    reply: reply.to_string(),
                },
                tx,
            )
        }
    }

    impl TextGenerator for GatedGenerator {
        fn complete(&self, _prompt: &str) -> Result<String, AiError> {
            let _ = self.gate.lock().unwrap().recv();
            Ok(self.reply.clone())
        }
    }

    fn workspace() -> MapWorkspace {
        let mut ws = MapWorkspace::new(MindMap::seed(Canvas::default()), None);
        ws.rng = StdRng::seed_from_u64(7);
        ws
    }

    fn pump(ws: &mut MapWorkspace, done: impl Fn(&MapWorkspace) -> bool) {
        for _ in 0..400 {
            ws.poll_pending();
            if done(ws) {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("background work never finished");
    }

    #[test]
    fn test_expansion_applies_mocked_concepts() {
        let mut ws = workspace();
        let started = ws.start_expansion("TO START", FakeGenerator::new(r#"["ALPHA","BETA","GAMMA"]"#));
        assert!(started);
        assert!(ws.is_expanding("to start"));
        pump(&mut ws, |ws| !ws.is_expanding("TO START"));
        assert_eq!(ws.map.len(), 7);
        let parent = ws.map.get("TO START").unwrap();
        for key in ["ALPHA", "BETA", "GAMMA"] {
            assert!(parent.child_keys.contains(&key.to_string()));
            assert_eq!(ws.map.get(key).unwrap().parent_key.as_deref(), Some("TO START"));
        }
        ws.map.validate().unwrap();
    }

    #[test]
    fn test_duplicate_expansion_is_rejected_not_queued() {
        let mut ws = workspace();
        let (_tx, rx) = mpsc::channel();
        ws.pending_expansions.insert("TO START".to_string(), rx);
        assert!(!ws.start_expansion("to start", FakeGenerator::new("[]")));
        assert!(ws.flash_message.as_ref().map(|f| f.is_error).unwrap_or(false));
        // a different node is free to expand concurrently
        assert!(ws.start_expansion("GENERATING", FakeGenerator::new(r#"["X"]"#)));
    }

    #[test]
    fn test_format_error_leaves_graph_untouched() {
        let mut ws = workspace();
        let before = ws.map.len();
        ws.start_expansion("TO START", FakeGenerator::new("no brackets here, sorry"));
        pump(&mut ws, |ws| !ws.is_expanding("TO START"));
        assert_eq!(ws.map.len(), before);
        let flash = ws.flash_message.as_ref().unwrap();
        assert!(flash.is_error);
        assert!(flash.text.contains("format"));
    }

    #[test]
    fn test_expansion_for_deleted_node_is_discarded() {
        let mut ws = workspace();
        let (client, gate) = GatedGenerator::new(r#"["ALPHA","BETA"]"#);
        ws.start_expansion("GENERATING", client);
        // the node dies while the request is in flight
        ws.delete_node("GENERATING");
        assert_eq!(ws.map.len(), 3);
        assert!(!ws.is_expanding("GENERATING"));
        let _ = gate.send(());
        // nothing to wait for: the receiver is gone, the reply evaporates
        std::thread::sleep(Duration::from_millis(30));
        ws.poll_pending();
        assert_eq!(ws.map.len(), 3);
        assert!(ws.map.get("ALPHA").is_none());
    }

    #[test]
    fn test_generation_end_to_end_and_subtree_delete() {
        let mut ws = workspace();
        let reply = r#"Here you go:
{"mainConcepts": ["SENSORS", "ACTUATORS", "CONTROL", "KINEMATICS"],
 "subConcepts": {
   "SENSORS": ["LIDAR", "CAMERA", "IMU"],
   "ACTUATORS": ["SERVO", "STEPPER", "HYDRAULIC"],
   "CONTROL": ["PID", "MPC", "FUZZY"],
   "KINEMATICS": ["FORWARD", "INVERSE", "JACOBIAN"]
 }}"#;
        assert!(ws.start_generation("Robotics", FakeGenerator::new(reply)));
        assert_eq!(ws.generation_topic(), Some("Robotics"));
        pump(&mut ws, |ws| ws.generation_topic().is_none());
        assert_eq!(ws.map.root_key(), "ROBOTICS");
        assert_eq!(ws.map.len(), 17);
        ws.map.validate().unwrap();

        ws.delete_node("CONTROL");
        assert_eq!(ws.map.len(), 13);
        assert!(ws.map.get("PID").is_none());
    }

    #[test]
    fn test_generation_rejected_while_one_is_pending() {
        let mut ws = workspace();
        let (_tx, rx) = mpsc::channel();
        ws.pending_generation = Some(("OCEANS".to_string(), rx));
        assert!(!ws.start_generation("Rivers", FakeGenerator::new("{}")));
        assert!(!ws.start_generation("   ", FakeGenerator::new("{}")));
    }

    #[test]
    fn test_click_selects_and_resets_chat() {
        let mut ws = workspace();
        ws.select("TO START");
        ws.chat_log.push(ChatMessage {
            from_user: true,
            text: "old".to_string(),
        });
        let pos = ws.map.get("GENERATING").unwrap().position;
        let p = Point::new(pos.x + 10.0, pos.y + 10.0);
        ws.pointer_down(p);
        ws.pointer_up(false);
        assert_eq!(ws.selected.as_deref(), Some("GENERATING"));
        assert!(ws.chat_log.is_empty());
    }

    #[test]
    fn test_drag_moves_without_selecting() {
        let mut ws = workspace();
        let start = ws.map.get("TO START").unwrap().position;
        let grab = Point::new(start.x + 12.0, start.y + 8.0);
        ws.pointer_down(grab);
        ws.pointer_drag(Point::new(grab.x + 300.0, grab.y + 90.0));
        ws.pointer_up(false);
        let moved = ws.map.get("TO START").unwrap().position;
        assert_eq!(moved.x, start.x + 300.0);
        assert_eq!(moved.y, start.y + 90.0);
        assert_eq!(ws.selected, None);

        // dragging far out of bounds pins to the margin
        ws.pointer_down(Point::new(moved.x + 12.0, moved.y + 8.0));
        ws.pointer_drag(Point::new(-5000.0, -5000.0));
        ws.pointer_up(false);
        let pinned = ws.map.get("TO START").unwrap().position;
        assert_eq!(pinned.x, layout::MIN_MARGIN);
        assert_eq!(pinned.y, layout::MIN_MARGIN);
    }

    #[test]
    fn test_shift_click_deletes_but_root_survives() {
        let mut ws = workspace();
        let pos = ws.map.get("TO START").unwrap().position;
        ws.pointer_down(Point::new(pos.x + 5.0, pos.y + 5.0));
        ws.pointer_up(true);
        assert!(ws.map.get("TO START").is_none());
        assert_eq!(ws.map.len(), 3);

        let root_pos = ws.map.get("MINDSCAPE").unwrap().position;
        ws.pointer_down(Point::new(root_pos.x + 5.0, root_pos.y + 5.0));
        ws.pointer_up(true);
        assert!(ws.map.get("MINDSCAPE").is_some());
        assert_eq!(ws.map.len(), 3);
    }

    #[test]
    fn test_click_on_empty_canvas_does_nothing() {
        let mut ws = workspace();
        ws.select("TO START");
        ws.pointer_down(Point::new(1.0, 1.0));
        ws.pointer_up(false);
        assert_eq!(ws.selected.as_deref(), Some("TO START"));
    }

    #[test]
    fn test_chat_round_trip() {
        let mut ws = workspace();
        ws.select("TO START");
        ws.chat_input = "what is this?".to_string();
        assert!(ws.start_chat(FakeGenerator::new("A starter node.")));
        assert_eq!(ws.chat_log.len(), 1);
        pump(&mut ws, |ws| ws.chat_log.len() == 2);
        assert!(!ws.chat_log[1].from_user);
        assert_eq!(ws.chat_log[1].text, "A starter node.");
        assert!(!ws.chat_waiting());
    }

    #[test]
    fn test_chat_reply_after_reselect_is_discarded() {
        let mut ws = workspace();
        ws.select("TO START");
        ws.chat_input = "hello?".to_string();
        let (client, gate) = GatedGenerator::new("Too late.");
        assert!(ws.start_chat(client));
        // moving the selection resets the transcript and drops the wait
        ws.select("GENERATING");
        assert!(!ws.chat_waiting());
        let _ = gate.send(());
        std::thread::sleep(Duration::from_millis(30));
        ws.poll_pending();
        assert!(ws.chat_log.is_empty());
    }

    #[test]
    fn test_escape_cancels_a_pending_chat_wait() {
        let mut ws = workspace();
        let config = Config::default();
        ws.select("TO START");
        ws.chat_input = "hello?".to_string();
        let (client, gate) = GatedGenerator::new("Too late.");
        assert!(ws.start_chat(client));
        assert!(ws.chat_waiting());
        ws.input = InputFocus::Chat;
        ws.handle_key(KeyEvent::from(KeyCode::Esc), &config).unwrap();
        assert!(!ws.chat_waiting());
        let _ = gate.send(());
        std::thread::sleep(Duration::from_millis(30));
        ws.poll_pending();
        // the question stays, no answer ever lands
        assert_eq!(ws.chat_log.len(), 1);
    }

    #[test]
    fn test_missing_api_key_is_a_configuration_error() {
        let mut ws = workspace();
        let config = Config::default();
        assert!(!config.ai_available());
        ws.select("TO START");
        ws.expand_via_config("TO START", &config);
        let flash = ws.flash_message.as_ref().unwrap();
        assert!(flash.is_error);
        assert!(flash.text.contains("ai_api_key"));
        assert!(!ws.is_expanding("TO START"));
    }

    #[test]
    fn test_topic_input_mode_captures_keys() {
        let mut ws = workspace();
        let config = Config::default();
        ws.handle_key(KeyEvent::from(KeyCode::Char('g')), &config).unwrap();
        assert!(ws.captures_input());
        for c in "Oceans".chars() {
            ws.handle_key(KeyEvent::from(KeyCode::Char(c)), &config).unwrap();
        }
        ws.handle_key(KeyEvent::from(KeyCode::Backspace), &config).unwrap();
        assert_eq!(ws.topic_input, "Ocean");
        ws.handle_key(KeyEvent::from(KeyCode::Esc), &config).unwrap();
        assert!(!ws.captures_input());
    }

    #[test]
    fn test_cycle_selection_wraps() {
        let mut ws = workspace();
        ws.cycle_selection(1);
        assert_eq!(ws.selected.as_deref(), Some("MINDSCAPE"));
        ws.cycle_selection(-1);
        assert_eq!(ws.selected.as_deref(), Some("GENERATING"));
        ws.cycle_selection(1);
        assert_eq!(ws.selected.as_deref(), Some("MINDSCAPE"));
    }
}
