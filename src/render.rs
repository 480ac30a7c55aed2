//! Terminal UI drawn with ratatui through ratzilla's DOM backend.
//!
//! Rendering only reads the [`App`]; every `[X]` label is emitted through
//! [`Panel::button`] so the row it lands on is tappable.

use ratzilla::ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratzilla::ratatui::style::{Color, Modifier, Style};
use ratzilla::ratatui::text::{Line, Span};
use ratzilla::ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratzilla::ratatui::Frame;

use crate::app::App;
use crate::click::{is_narrow_layout, ClickMap};
use crate::economy::resource::ResourceId;
use crate::economy::{GameEconomy, Screen};
use crate::format::format_number;

/// Lines of one bordered panel plus the key each line triggers.
#[derive(Default)]
struct Panel<'a> {
    lines: Vec<Line<'a>>,
    keys: Vec<Option<char>>,
}

impl<'a> Panel<'a> {
    fn text(&mut self, line: Line<'a>) {
        self.lines.push(line);
        self.keys.push(None);
    }

    fn blank(&mut self) {
        self.text(Line::from(""));
    }

    /// ` [K] label` on its own row, tappable as `key`.
    fn button(&mut self, key: char, label: String, enabled: bool) {
        let (key_style, label_style) = if enabled {
            (
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                Style::default().fg(Color::White),
            )
        } else {
            (
                Style::default().fg(Color::DarkGray),
                Style::default().fg(Color::DarkGray),
            )
        };
        self.lines.push(Line::from(vec![
            Span::styled(format!(" [{}] ", key.to_ascii_uppercase()), key_style),
            Span::styled(label, label_style),
        ]));
        self.keys.push(Some(key));
    }

    fn height(&self) -> u16 {
        self.lines.len() as u16 + 2
    }

    fn render(self, f: &mut Frame, area: Rect, title: &str, color: Color, clicks: &mut ClickMap) {
        for (i, key) in self.keys.iter().enumerate() {
            let row = area.y + 1 + i as u16;
            if let Some(key) = key {
                if row + 1 < area.y + area.height {
                    clicks.bind(row, *key);
                }
            }
        }
        let widget = Paragraph::new(self.lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(format!(" {} ", title)),
        );
        f.render_widget(widget, area);
    }
}

/// `width` cells of filled/empty blocks for a fraction in `[0, 1]`.
pub fn fill_bar(fraction: f64, width: usize) -> String {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled = (fraction * width as f64).round() as usize;
    format!("{}{}", "■".repeat(filled), "□".repeat(width - filled))
}

/// Draw one frame and publish its tap targets.
pub fn draw(f: &mut Frame, app: &App, clicks: &mut ClickMap) {
    let size = f.area();
    clicks.begin_frame(size.height);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
        ])
        .split(size);

    render_title(f, app, chunks[0]);

    let (left, right) = if is_narrow_layout(size.width) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(10), Constraint::Length(6)])
            .split(chunks[1]);
        (rows[0], rows[1])
    } else {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[1]);
        (cols[0], cols[1])
    };

    match app.economy.screen() {
        Screen::Menu => render_menu(f, app, left, clicks),
        Screen::Main => render_main(f, app, left, clicks),
        Screen::Upgrades => render_upgrades(f, &app.economy, left, clicks),
    }
    render_log(f, app, right);
    render_help(f, app.economy.screen(), chunks[2], clicks);
}

fn render_title(f: &mut Frame, app: &App, area: Rect) {
    let economy = &app.economy;
    let mut spans = vec![Span::styled(
        "Wealth Inc.",
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )];
    if economy.screen().is_active() {
        for id in ResourceId::all() {
            let hidden = *id == ResourceId::Notes
                && !economy.notes_printable()
                && economy.resource(*id).get() <= 0.0;
            if hidden {
                continue;
            }
            spans.push(Span::raw("   "));
            spans.push(Span::styled(
                format!("{}: {}", id.display_name(), app.amount_label(*id)),
                Style::default().fg(currency_color(*id)),
            ));
        }
    }
    let title = Paragraph::new(Line::from(spans))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .alignment(Alignment::Center);
    f.render_widget(title, area);
}

fn currency_color(id: ResourceId) -> Color {
    match id {
        ResourceId::Coins => Color::Yellow,
        ResourceId::Notes => Color::Green,
    }
}

fn render_menu(f: &mut Frame, app: &App, area: Rect, clicks: &mut ClickMap) {
    let mut panel = Panel::default();
    panel.text(Line::from(Span::styled(
        " Mint coins. Print notes. Get rich.",
        Style::default().fg(Color::Gray),
    )));
    panel.blank();
    panel.button('n', "New game".to_string(), true);
    if app.can_resume() {
        panel.button('r', "Continue".to_string(), true);
    }
    panel.button('e', "Export save".to_string(), true);
    panel.button('i', "Import save".to_string(), true);
    panel.render(f, area, "Menu", Color::Cyan, clicks);
}

fn currency_lines(panel: &mut Panel<'_>, app: &App, id: ResourceId) {
    let c = app.economy.currency(id);
    let per_second =
        c.generator().production_per_second() + c.resource().additional_rate_per_second();
    panel.text(Line::from(vec![
        Span::styled(
            format!(" {}: ", id.display_name()),
            Style::default().fg(currency_color(id)).add_modifier(Modifier::BOLD),
        ),
        Span::raw(app.amount_label(id).to_string()),
        Span::styled(
            format!("  ({}/s)", format_number(per_second)),
            Style::default().fg(Color::Gray),
        ),
    ]));
    panel.text(Line::from(Span::styled(
        format!(
            "  {} +{}  units: {}",
            fill_bar(c.clicker().fill_fraction(), 10),
            format_number(c.increment_value()),
            c.generator().units_owned()
        ),
        Style::default().fg(Color::DarkGray),
    )));
}

/// The oldest live bonus, if any. Shown on every active screen.
fn bonus_button(panel: &mut Panel<'_>, economy: &GameEconomy) {
    if let Some(bonus) = economy.live_bonuses().first() {
        panel.button(
            'b',
            format!(
                "Grab bonus: +{} {} ({}s)",
                format_number(f64::from(bonus.payload.amount)),
                bonus.payload.currency.display_name(),
                (bonus.remaining_ttl_ms / 1_000.0).ceil()
            ),
            true,
        );
    }
}

fn render_main(f: &mut Frame, app: &App, area: Rect, clicks: &mut ClickMap) {
    let economy = &app.economy;
    let mut panel = Panel::default();
    currency_lines(&mut panel, app, ResourceId::Coins);
    panel.button('c', "Mint coin".to_string(), true);
    if economy.notes_printable() {
        panel.blank();
        currency_lines(&mut panel, app, ResourceId::Notes);
        panel.button('p', "Print note".to_string(), true);
    }
    panel.blank();
    bonus_button(&mut panel, economy);
    panel.button('u', "Upgrades".to_string(), true);
    panel.button('s', "Save".to_string(), true);
    let height = panel.height().min(area.height);
    panel.render(f, Rect { height, ..area }, "Vault", Color::Yellow, clicks);
}

fn render_upgrades(f: &mut Frame, economy: &GameEconomy, area: Rect, clicks: &mut ClickMap) {
    let mut panel = Panel::default();
    for u in economy.visible_upgrades() {
        let id = u.id;
        let label = if u.ledger.is_exhausted() {
            format!("{}  (owned)", id.name())
        } else {
            format!(
                "{}  {} {}  x{}  {}",
                id.name(),
                format_number(economy.cost_of(id)),
                id.pays_in().display_name(),
                u.ledger.purchase_count(),
                id.description()
            )
        };
        panel.button(id.key(), label, u.affordable);
    }
    panel.blank();
    bonus_button(&mut panel, economy);
    panel.button('u', "Back".to_string(), true);
    let height = panel.height().min(area.height);
    panel.render(f, Rect { height, ..area }, "Upgrades", Color::Magenta, clicks);
}

fn render_log(f: &mut Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let entries: Vec<_> = app.log().collect();
    let start = entries.len().saturating_sub(visible);
    let lines: Vec<Line> = entries[start..]
        .iter()
        .map(|e| {
            let style = if e.is_important {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            Line::from(Span::styled(e.text.clone(), style))
        })
        .collect();
    let widget = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Log "),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

fn render_help(f: &mut Frame, screen: Screen, area: Rect, clicks: &mut ClickMap) {
    let mut panel = Panel::default();
    match screen {
        Screen::Menu => panel.text(Line::from(Span::styled(
            " Press a key or tap a line",
            Style::default().fg(Color::DarkGray),
        ))),
        Screen::Main | Screen::Upgrades => panel.button('m', "Menu".to_string(), true),
    }
    panel.render(f, area, "Help", Color::DarkGray, clicks);
}
