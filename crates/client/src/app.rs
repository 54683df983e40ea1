use std::io;
use std::time::Instant;

use coil::{Connector, SessionController};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::input::{KeyAction, map_key};
use crate::net::ClientConfig;
use crate::render;

pub struct App<C: Connector> {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    controller: SessionController<C>,
    config: ClientConfig,
    should_quit: bool,
}

impl<C: Connector> App<C> {
    pub fn new(controller: SessionController<C>, config: ClientConfig) -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            controller,
            config,
            should_quit: false,
        })
    }

    pub fn run(&mut self) -> io::Result<()> {
        let mut next_step = Instant::now() + self.config.tick_interval;

        while !self.should_quit {
            let now = Instant::now();
            self.controller.update(now);
            if now >= next_step {
                self.controller.step();
                next_step = now + self.config.tick_interval;
            }

            self.draw()?;

            let timeout = next_step
                .saturating_duration_since(Instant::now())
                .min(self.config.input_poll);
            if event::poll(timeout)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(map_key(key.code, key.modifiers));
                    }
                }
            }
        }

        self.controller.shutdown();
        Ok(())
    }

    fn draw(&mut self) -> io::Result<()> {
        let view = self.controller.view();
        self.terminal.draw(|frame| render::draw(frame, &view))?;
        Ok(())
    }

    fn handle_key(&mut self, action: KeyAction) {
        match action {
            KeyAction::None => {}
            KeyAction::Quit => self.should_quit = true,
            KeyAction::Control(input) => self.controller.handle_input(input, Instant::now()),
        }
    }

    pub fn restore_terminal(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }
}

impl<C: Connector> Drop for App<C> {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

pub fn run<C: Connector>(controller: SessionController<C>, config: ClientConfig) -> io::Result<()> {
    let mut app = App::new(controller, config)?;
    let result = app.run();
    app.restore_terminal()?;
    result
}
