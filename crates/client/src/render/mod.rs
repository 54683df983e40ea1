mod palette;

use coil::net::{RemoteSession, SnakeColor};
use coil::{
    Board, GridSize, LocalState, LocalStatus, Position, SessionMode, SessionView, Severity, Toast,
};
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

/// Terminal columns per grid cell, so cells come out roughly square.
const CELL_WIDTH: u16 = 2;
/// Steps per half-period of the head marker blink.
const BLINK_STEPS: u64 = 4;

pub fn draw(frame: &mut Frame, view: &SessionView) {
    let area = frame.area();

    let block = Block::default()
        .title(" Coil ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    render_indicator(frame, chunks[0], view);

    let board_area = board_rect(chunks[1], view.grid);
    frame.render_widget(
        BoardWidget {
            board: view.board,
            grid: view.grid,
            frame: view.frame,
        },
        board_area,
    );

    render_status(frame, chunks[2], view);

    if let Some(toast) = view.toast {
        render_toast(frame, chunks[1], toast);
    }
    if view.show_mode_menu {
        render_mode_menu(frame, chunks[1]);
    }
}

fn render_indicator(frame: &mut Frame, area: Rect, view: &SessionView) {
    let line = match (view.mode, view.board) {
        (SessionMode::Local, Board::Local(state)) if state.status == LocalStatus::GameOver => {
            Line::from(Span::styled(
                "GAME OVER - press R to restart",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
        }
        (SessionMode::Local, _) => Line::from(Span::styled(
            "LOCAL MODE",
            Style::default().fg(palette::LOCAL_MODE),
        )),
        (SessionMode::Connecting, _) => Line::from(vec![
            Span::styled(
                "CONNECTING TO SERVER... ",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("{} ", view.countdown),
                Style::default()
                    .fg(palette::COUNTDOWN)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "Press SPACE to connect now",
                Style::default().fg(Color::Gray),
            ),
        ]),
        (SessionMode::Online, Board::Online(session)) => Line::from(Span::styled(
            format!("ONLINE - {} Players", session.snakes.len()),
            Style::default().fg(palette::ONLINE_MODE),
        )),
        (SessionMode::Online, _) => Line::from(Span::styled(
            "ONLINE",
            Style::default().fg(palette::ONLINE_MODE),
        )),
        (SessionMode::Finished, _) => Line::from(Span::styled(
            "ROUND OVER",
            Style::default().fg(Color::Yellow),
        )),
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_status(frame: &mut Frame, area: Rect, view: &SessionView) {
    let stats = match view.board {
        Board::Local(state) => format!("Score {}  Health {}", state.score, state.health),
        Board::Online(session) => format!("Score {}", session.score),
        Board::Empty => String::new(),
    };

    let help = match view.mode {
        SessionMode::Local => "Arrows/WASD Move  O Online  Q Quit",
        SessionMode::Connecting => "Arrows/WASD Move  Space Connect  Q Quit",
        SessionMode::Online => "Arrows/WASD Move  Q Quit",
        SessionMode::Finished => "C Stay online  L Play local  Q Quit",
    };

    let line = Line::from(vec![
        Span::styled(stats, Style::default().fg(Color::White)),
        Span::raw("   "),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

fn render_toast(frame: &mut Frame, area: Rect, toast: &Toast) {
    let color = match toast.severity {
        Severity::Danger => Color::Red,
        Severity::Warning => Color::Yellow,
    };

    let lines: Vec<Line> = toast.lines().map(Line::from).collect();
    let width = lines
        .iter()
        .map(|l| l.width() as u16)
        .max()
        .unwrap_or(0)
        .saturating_add(4)
        .max(24);
    let height = lines.len() as u16 + 2;

    let toast_area = Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + 1,
        width.min(area.width),
        height.min(area.height),
    );
    frame.render_widget(Clear, toast_area);

    let paragraph = Paragraph::new(lines)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color)),
        );
    frame.render_widget(paragraph, toast_area);
}

fn render_mode_menu(frame: &mut Frame, area: Rect) {
    let dialog_area = centered_rect(36, 7, area);
    frame.render_widget(Clear, dialog_area);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("C", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("  Stay online"),
        ]),
        Line::from(vec![
            Span::styled("L", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            Span::raw("  Play local"),
        ]),
    ];

    let menu = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .title(" Next round ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(menu, dialog_area);
}

fn board_rect(area: Rect, grid: GridSize) -> Rect {
    let width = (grid.w.max(0) as u16).saturating_mul(CELL_WIDTH);
    let height = grid.h.max(0) as u16;
    centered_rect(width, height, area)
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

struct BoardWidget<'a> {
    board: Board<'a>,
    grid: GridSize,
    frame: u64,
}

impl Widget for BoardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in 0..self.grid.h {
            for x in 0..self.grid.w {
                paint(buf, area, Position::new(x, y), "· ", palette::GRID);
            }
        }

        let blink_on = (self.frame / BLINK_STEPS) % 2 == 0;
        match self.board {
            Board::Local(state) => render_local(buf, area, state, blink_on),
            Board::Online(session) => render_online(buf, area, session, blink_on),
            Board::Empty => {}
        }
    }
}

fn render_local(buf: &mut Buffer, area: Rect, state: &LocalState, blink_on: bool) {
    for &bomb in &state.bombs {
        paint(buf, area, bomb, "()", palette::BOMB);
    }
    for &star in &state.stars {
        paint(buf, area, star, "**", palette::STAR);
    }
    paint_food(buf, area, state.food);

    let color = palette::local_snake();
    paint_snake(buf, area, state.snake.iter().copied(), color, true, blink_on);
}

fn render_online(buf: &mut Buffer, area: Rect, session: &RemoteSession, blink_on: bool) {
    for &food in &session.food {
        paint_food(buf, area, food);
    }

    for (id, snake) in &session.snakes {
        if !snake.alive || snake.body.is_empty() {
            continue;
        }

        let is_me = session.is_me(id);
        paint_snake(buf, area, snake.body.iter().copied(), snake.color, is_me, blink_on);

        if let Some(head) = snake.head() {
            let name = if snake.name.is_empty() { "Unknown" } else { snake.name.as_str() };
            let label_color = if is_me { palette::color(snake.color.body) } else { Color::White };
            label(buf, area, head, &format!("{}: {}", name, snake.score), label_color);
        }
    }
}

fn paint_food(buf: &mut Buffer, area: Rect, pos: Position) {
    paint(buf, area, pos, "▓", palette::FOOD);
    if let Some((x, y)) = cell_origin(area, pos) {
        if let Some(cell) = buf.cell_mut((x + 1, y)) {
            cell.set_symbol("'").set_fg(palette::FOOD_LEAF);
        }
    }
}

fn paint_snake(
    buf: &mut Buffer,
    area: Rect,
    body: impl Iterator<Item = Position>,
    color: SnakeColor,
    marked: bool,
    blink_on: bool,
) {
    for (idx, pos) in body.enumerate() {
        if idx == 0 {
            let symbol = if marked && blink_on { "◉◉" } else { "██" };
            let head = palette::color(color.head);
            let fg = if marked && blink_on { palette::EYE_BLINK } else { head };
            paint_styled(buf, area, pos, symbol, Style::default().fg(fg).bg(head));
        } else {
            paint_styled(
                buf,
                area,
                pos,
                "▒▒",
                Style::default()
                    .fg(palette::color(color.border))
                    .bg(palette::color(color.body)),
            );
        }
    }
}

fn label(buf: &mut Buffer, area: Rect, head: Position, text: &str, color: Color) {
    let Some((x, y)) = cell_origin(area, head) else {
        return;
    };
    if y == area.y {
        return;
    }

    let width = text.chars().count() as u16;
    let start = (x + 1).saturating_sub(width / 2).max(area.x);
    let available = area.right().saturating_sub(start);
    buf.set_stringn(
        start,
        y - 1,
        text,
        available as usize,
        Style::default().fg(color).bg(Color::Black),
    );
}

fn cell_origin(area: Rect, pos: Position) -> Option<(u16, u16)> {
    let col = u16::try_from(pos.x).ok()?;
    let row = u16::try_from(pos.y).ok()?;

    let x = area.x.checked_add(col.checked_mul(CELL_WIDTH)?)?;
    let y = area.y.checked_add(row)?;
    if x.checked_add(CELL_WIDTH)? > area.right() || y >= area.bottom() {
        return None;
    }
    Some((x, y))
}

fn paint(buf: &mut Buffer, area: Rect, pos: Position, symbol: &str, color: Color) {
    paint_styled(buf, area, pos, symbol, Style::default().fg(color));
}

fn paint_styled(buf: &mut Buffer, area: Rect, pos: Position, symbol: &str, style: Style) {
    let Some((x, y)) = cell_origin(area, pos) else {
        return;
    };

    let mut chars = symbol.chars();
    for dx in 0..CELL_WIDTH {
        let ch = chars.next().unwrap_or(' ');
        if let Some(cell) = buf.cell_mut((x + dx, y)) {
            cell.set_char(ch).set_style(style);
        }
    }
}
