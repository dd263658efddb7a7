mod peers;
mod renderer;

use anyhow::Result;
use collab_cursors_config::Config;
use collab_cursors_engine::{
    CollaborativeEditor, CollaboratorId, MonospaceSurface, ScrollOffset, SelectionRange,
    SurfaceBounds, TextSurface,
};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use peers::Peers;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use renderer::TerminalRenderer;
use std::{
    env,
    fs::File,
    io::stdout,
    path::PathBuf,
    process,
    time::{Duration, Instant},
};

const SAMPLE_TEXT: &str = "Two people are editing this text with you.\n\
\n\
Their carets and selections are drawn over the text in their own colors, \
and a name tag pops up whenever one of them moves. When they type, your own \
caret stays where you left it.\n\
\n\
Type, select with the mouse or with shift and the arrow keys, and watch the \
overlay follow along.";

const PEER_INTERVAL: Duration = Duration::from_millis(700);

type Editor = CollaborativeEditor<MonospaceSurface, TerminalRenderer>;

struct App {
    editor: Editor,
    peers: Peers,
    peer_ids: Vec<CollaboratorId>,
    peers_hidden: bool,
    /// Inner area of the text block as of the last draw
    text_area: Rect,
    scroll_line: usize,
    drag_anchor: Option<usize>,
}

impl App {
    fn new(text: &str, config: &Config) -> Result<Self> {
        let mut editor = Editor::builder()
            .surface(MonospaceSurface::new(text, config.wrap_columns as usize))
            .renderer(TerminalRenderer::new())
            .options(config.overlay_options())
            .on_insert(|index, text| log::debug!("local insert of {text:?} at {index}"))
            .on_delete(|index, length| log::debug!("local delete of {length} at {index}"))
            .on_selection_changed(|selection| {
                log::debug!("local selection {}..{}", selection.anchor, selection.target)
            })
            .build()?;

        let len = text.chars().count();
        let count = config.collaborators.len().max(1);
        let mut peer_ids = Vec::with_capacity(config.collaborators.len());
        for (i, preset) in config.collaborators.iter().enumerate() {
            let start = len * (i + 1) / (count + 1);
            editor.add_collaborator(
                preset.id.clone(),
                preset.label.clone(),
                preset.color.clone(),
                Some(SelectionRange::collapsed(start)),
            )?;
            peer_ids.push(preset.id.clone());
        }

        Ok(Self {
            editor,
            peers: Peers::new(peer_ids.clone(), PEER_INTERVAL, config.tooltip_seconds),
            peer_ids,
            peers_hidden: false,
            text_area: Rect::default(),
            scroll_line: 0,
            drag_anchor: None,
        })
    }

    fn surface_mut(&mut self) -> &mut MonospaceSurface {
        self.editor.manager_mut().surface_mut()
    }

    fn type_text(&mut self, text: &str) {
        let edits = self.surface_mut().type_text(text);
        for edit in &edits {
            self.editor.apply_host_edit(edit);
        }
    }

    fn backspace(&mut self) {
        if let Some(edit) = self.surface_mut().backspace() {
            self.editor.apply_host_edit(&edit);
        }
    }

    fn delete_forward(&mut self) {
        let (start, end) = self.editor.surface().selection();
        if start == end {
            if end >= self.editor.surface().char_len() {
                return;
            }
            self.surface_mut().set_selection(start, start + 1);
        }
        self.backspace();
    }

    /// Move the caret, or the selection's moving end when `extend` is set
    fn move_caret(&mut self, target: usize, extend: bool) {
        let target = target.min(self.editor.surface().char_len());
        let anchor = if extend {
            self.editor.get_selection().anchor
        } else {
            target
        };
        self.surface_mut()
            .set_selection(anchor.min(target), anchor.max(target));
    }

    fn caret(&self) -> usize {
        self.editor.get_selection().target
    }

    fn vertical_target(&self, down: bool) -> usize {
        let surface = self.editor.surface();
        let (line, column) = surface.cell_of(self.caret());
        match (down, line) {
            (false, 0) => 0,
            (false, line) => surface.index_at(line - 1, column),
            (true, line) => surface.index_at(line + 1, column),
        }
    }

    fn line_bounds(&self) -> (usize, usize) {
        let surface = self.editor.surface();
        let (line, _) = surface.cell_of(self.caret());
        (surface.index_at(line, 0), surface.index_at(line, usize::MAX))
    }

    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let extend = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
            KeyCode::Char(c) => self.type_text(&c.to_string()),
            KeyCode::Enter => self.type_text("\n"),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => self.move_caret(self.caret().saturating_sub(1), extend),
            KeyCode::Right => self.move_caret(self.caret() + 1, extend),
            KeyCode::Up => self.move_caret(self.vertical_target(false), extend),
            KeyCode::Down => self.move_caret(self.vertical_target(true), extend),
            KeyCode::Home => self.move_caret(self.line_bounds().0, extend),
            KeyCode::End => self.move_caret(self.line_bounds().1, extend),
            KeyCode::F(2) => self.toggle_overlay(),
            KeyCode::F(3) => self.peers.toggle_paused(),
            KeyCode::F(4) => self.toggle_peers_hidden(),
            _ => {}
        }
        self.editor.manager_mut().schedule_selection_check();
        true
    }

    /// Text index under a terminal cell, if the cell is inside the text area
    fn index_under(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.text_area;
        if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
            return None;
        }
        let line = self.scroll_line + (row - area.y) as usize;
        Some(
            self.editor
                .surface()
                .index_at(line, (column - area.x) as usize),
        )
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = self.index_under(mouse.column, mouse.row) {
                    self.drag_anchor = Some(index);
                    self.surface_mut().set_selection(index, index);
                    self.editor.manager_mut().pointer_down();
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let (Some(anchor), Some(index)) =
                    (self.drag_anchor, self.index_under(mouse.column, mouse.row))
                {
                    self.surface_mut()
                        .set_selection(anchor.min(index), anchor.max(index));
                }
                self.editor.manager_mut().pointer_move();
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.drag_anchor = None;
                self.editor.manager_mut().pointer_up();
            }
            MouseEventKind::ScrollDown => self.scroll_to(self.scroll_line + 1),
            MouseEventKind::ScrollUp => self.scroll_to(self.scroll_line.saturating_sub(1)),
            _ => {}
        }
    }

    fn toggle_overlay(&mut self) {
        let manager = self.editor.manager_mut();
        if manager.is_visible() {
            manager.hide();
        } else {
            manager.show();
        }
    }

    fn toggle_peers_hidden(&mut self) {
        self.peers_hidden = !self.peers_hidden;
        for id in &self.peer_ids {
            match self.editor.collaborator(id) {
                Ok(mut handle) if self.peers_hidden => handle.hide(),
                Ok(mut handle) => handle.show(),
                Err(e) => log::warn!("{e}"),
            }
        }
    }

    fn scroll_to(&mut self, line: usize) {
        if line == self.scroll_line {
            return;
        }
        self.scroll_line = line;
        let line_height = self.editor.surface().line_height().unwrap_or(1.0);
        self.surface_mut().set_scroll_offset(ScrollOffset {
            top: line as f32 * line_height,
            left: 0.0,
        });
        self.editor.manager_mut().on_scroll();
    }

    /// Scroll just enough to keep the local caret on screen
    fn follow_caret(&mut self) {
        let height = self.text_area.height as usize;
        if height == 0 {
            return;
        }
        let (line, _) = self.editor.surface().cell_of(self.caret());
        if line < self.scroll_line {
            self.scroll_to(line);
        } else if line >= self.scroll_line + height {
            self.scroll_to(line + 1 - height);
        }
    }

    /// Track the text area the last draw laid out
    fn set_text_area(&mut self, area: Rect) {
        if area == self.text_area {
            return;
        }
        self.text_area = area;
        self.surface_mut().set_bounds(SurfaceBounds {
            top: area.y as f32,
            left: area.x as f32,
            width: area.width as f32,
            height: area.height as f32,
        });
        self.editor.manager_mut().check_resize();
    }
}

fn init_logging(config: &Config) -> Result<()> {
    // The terminal belongs to the UI, so logs only go to a file
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("logging to {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", Config::config_path().display());
            process::exit(1);
        }
    };

    let text = match args.len() {
        1 => SAMPLE_TEXT.to_string(),
        2 => {
            let path = PathBuf::from(&args[1]);
            match std::fs::read_to_string(&path) {
                Ok(text) => text,
                Err(e) => {
                    eprintln!("Error: Cannot read '{}': {e}", path.display());
                    process::exit(1);
                }
            }
        }
        _ => {
            eprintln!("Usage: {} [text-file]", args[0]);
            process::exit(1);
        }
    };

    init_logging(&config)?;

    let mut app = App::new(&text, &config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    app.editor.dispose();

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if !app.handle_key(key) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }

        // Input events land first, then the selection is sampled
        app.editor.run_deferred();
        app.peers.tick(&mut app.editor, Instant::now())?;
        app.editor.tick();
        app.follow_caret();
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(2)].as_ref())
        .split(f.area());
    let width = app.editor.surface().columns() as u16 + 2;
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(width), Constraint::Min(0)].as_ref())
        .split(rows[0]);

    let block = Block::default().borders(Borders::ALL).title("Shared text");
    let inner = block.inner(columns[0]);
    f.render_widget(block, columns[0]);
    app.set_text_area(inner);

    let selection = app.editor.get_selection().normalize();
    let surface = app.editor.surface();
    let buf = f.buffer_mut();
    for glyph in surface.glyphs() {
        let Some(y) = glyph
            .line
            .checked_sub(app.scroll_line)
            .filter(|&y| y < inner.height as usize)
        else {
            continue;
        };
        let position = (inner.x + glyph.column as u16, inner.y + y as u16);
        if let Some(cell) = buf.cell_mut(position) {
            cell.set_char(glyph.ch);
            if glyph.index >= selection.start && glyph.index < selection.end {
                cell.set_style(Style::default().add_modifier(Modifier::REVERSED));
            }
        }
    }
    app.editor.renderer().draw(buf, inner);

    let (line, column) = surface.cell_of(app.caret());
    if let Some(y) = line
        .checked_sub(app.scroll_line)
        .filter(|&y| y < inner.height as usize)
    {
        f.set_cursor_position((inner.x + column as u16, inner.y + y as u16));
    }

    let status = Line::from(vec![
        Span::raw(format!(
            "selection {}..{} | ",
            app.editor.get_selection().anchor,
            app.editor.get_selection().target
        )),
        Span::raw(if app.peers.is_paused() {
            "peers paused | "
        } else {
            "peers editing | "
        }),
        Span::raw(if app.editor.manager().is_visible() {
            "overlay on"
        } else {
            "overlay off"
        }),
    ]);
    let help = Line::from(vec![
        Span::raw("Esc: Quit | "),
        Span::raw("Shift+arrows/mouse: Select | "),
        Span::raw("F2: Overlay | F3: Pause peers | F4: Hide peers"),
    ]);
    f.render_widget(Paragraph::new(vec![status, help]), rows[1]);
}
