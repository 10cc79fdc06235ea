//! Widget layout and drawing.
//!
//! The screen is a header, a status box, three panels side by side
//! (themes, playlist, sampler grid), a progress gauge and a footer that
//! doubles as the prompt line.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::collections::HashSet;
use std::time::Duration;

use crate::app::{App, Panel, PlaybackState};
use crate::audio::NowPlaying;
use crate::config::{SamplerSettings, UiSettings};

/// `MM:SS` rendering for the gauge label.
fn format_mmss(d: Duration) -> String {
    let s = d.as_secs();
    format!("{:02}:{:02}", s / 60, s % 60)
}

/// Render the controls help text for the focused panel.
fn controls_text(panel: Panel) -> String {
    let local = match panel {
        Panel::Themes => "[j/k] move | [enter] use theme | [n] new | [r] rename | [d] delete",
        Panel::Playlist => {
            "[j/k] move | [enter] play | [space] pause | [s] stop | [n] next | [r] repeat | [z] random | [a] add | [d] remove"
        }
        Panel::Sampler => "[h/j/k/l] move | [enter] fire/stop | [a] assign | [d] clear",
    };
    format!("{local} | [tab] panel | [C-s] save | [C-l] load | [q] quit")
}

fn panel_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::bordered().title(format!(" {title} "));
    if focused {
        block.border_style(Style::default().fg(Color::Yellow))
    } else {
        block
    }
}

/// Draw one full frame from the current app state.
pub fn draw(frame: &mut Frame, app: &App, ui_settings: &UiSettings, sampler: &SamplerSettings) {
    let chunks = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(4),
        Constraint::Min(1),
        Constraint::Length(3),
        Constraint::Length(4),
    ])
    .split(frame.area());

    let now = app.now_playing();

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::bordered()
                .title(" wyrmsong ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    let status = {
        let mut parts = vec![format!(
            "Library: {}{}",
            app.library.name,
            if app.unsaved { "*" } else { "" }
        )];

        let theme = app.active_theme.as_deref().unwrap_or("-");
        parts.push(format!("Theme: {theme}"));

        parts.push(match (app.playback, &now) {
            (PlaybackState::Stopped, _) => "Stopped".to_string(),
            (PlaybackState::Playing, Some(np)) => format!("Playing: {}", np.name),
            (PlaybackState::Playing, None) => "Playing".to_string(),
            (PlaybackState::Paused, Some(np)) => format!("Paused: {}", np.name),
            (PlaybackState::Paused, None) => "Paused".to_string(),
        });

        parts.push(format!("Repeat: {}", if app.repeat { "ON" } else { "OFF" }));
        parts.push(format!("Random: {}", if app.random { "ON" } else { "OFF" }));

        if !app.status.is_empty() {
            parts.push(app.status.clone());
        }

        parts.join(" • ")
    };

    let status_par = Paragraph::new(status)
        .block(Block::bordered().padding(Padding::left(1)).title(" status "))
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, chunks[1]);

    let panels = Layout::horizontal([
        Constraint::Percentage(24),
        Constraint::Percentage(44),
        Constraint::Percentage(32),
    ])
    .split(chunks[2]);

    draw_themes(frame, app, panels[0]);
    draw_playlist(frame, app, panels[1], now.as_ref());
    draw_sampler(frame, app, panels[2], sampler);

    draw_gauge(frame, app, chunks[3], now.as_ref());

    // Footer: the prompt takes over when open.
    let footer = if let Some(prompt) = &app.prompt {
        Paragraph::new(format!("{}: {}_", prompt.label(), app.input)).block(
            Block::bordered()
                .title(" input (enter confirms, esc cancels) ")
                .border_style(Style::default().fg(Color::Yellow))
                .padding(Padding::left(1)),
        )
    } else {
        Paragraph::new(controls_text(app.panel)).block(
            Block::bordered()
                .title(" controls ")
                .padding(Padding::left(1)),
        )
    };
    frame.render_widget(footer.wrap(Wrap { trim: true }), chunks[4]);
}

fn draw_themes(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .library
        .themes
        .iter()
        .map(|theme| {
            let active = app.active_theme.as_deref() == Some(theme.name.as_str());
            let marker = if active { "● " } else { "  " };
            let item = ListItem::new(format!("{marker}{}", theme.name));
            if active {
                item.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let focused = app.panel == Panel::Themes;
    let list = List::new(items)
        .block(panel_block("themes", focused))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused && !app.library.themes.is_empty() {
        state.select(Some(app.theme_cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect, now: Option<&NowPlaying>) {
    let tracks = app.active_tracks();
    let items: Vec<ListItem> = tracks
        .iter()
        .map(|track| {
            let playing = now.is_some_and(|np| np.location == track.location);
            let marker = if playing { "♪ " } else { "  " };
            let item = ListItem::new(format!("{marker}{}", track.name));
            if playing {
                item.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let title = match &app.active_theme {
        Some(name) => format!("playlist: {name}"),
        None => "playlist".to_string(),
    };
    let focused = app.panel == Panel::Playlist;
    let list = List::new(items)
        .block(panel_block(&title, focused))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");

    let mut state = ListState::default();
    if focused && !tracks.is_empty() {
        state.select(Some(app.track_cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_sampler(frame: &mut Frame, app: &App, area: Rect, sampler: &SamplerSettings) {
    let focused = app.panel == Panel::Sampler;
    let block = panel_block("sampler", focused);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sounding: HashSet<usize> = app
        .effects_handle
        .as_ref()
        .and_then(|h| h.lock().ok())
        .map(|set| set.clone())
        .unwrap_or_default();

    let rows = Layout::vertical(vec![
        Constraint::Ratio(1, sampler.rows as u32);
        sampler.rows
    ])
    .split(inner);

    for (r, row_area) in rows.iter().enumerate() {
        let cells = Layout::horizontal(vec![
            Constraint::Ratio(1, sampler.columns as u32);
            sampler.columns
        ])
        .split(*row_area);

        for (c, cell) in cells.iter().enumerate() {
            let slot = r * sampler.columns + c;
            let assigned = app.library.effect_at(slot);

            let text = match assigned {
                Some(effect) => effect.name.clone(),
                None => "·".to_string(),
            };

            let mut style = Style::default();
            if assigned.is_none() {
                style = style.add_modifier(Modifier::DIM);
            }
            if sounding.contains(&slot) {
                style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
            }
            if focused && app.slot_cursor == slot {
                style = style.add_modifier(Modifier::REVERSED);
            }

            let widget = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(style);
            frame.render_widget(widget, *cell);
        }
    }
}

fn draw_gauge(frame: &mut Frame, app: &App, area: Rect, now: Option<&NowPlaying>) {
    let elapsed = app
        .playback_handle
        .as_ref()
        .and_then(|h| h.lock().ok())
        .map(|info| info.elapsed)
        .unwrap_or(Duration::ZERO);

    let (title, label, ratio) = match now {
        Some(np) => {
            let title = format!(" {} ", np.name);
            match np.duration {
                Some(total) if !total.is_zero() => {
                    let ratio = (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0);
                    let label = format!("{} / {}", format_mmss(elapsed), format_mmss(total));
                    (title, label, ratio)
                }
                // Length unknown: show elapsed time on an idle bar.
                _ => (title, format!("{} / --:--", format_mmss(elapsed)), 0.0),
            }
        }
        None => (" now playing ".to_string(), "--:--".to_string(), 0.0),
    };

    let gauge = Gauge::default()
        .block(Block::bordered().title(title))
        .gauge_style(Style::default().fg(Color::Cyan))
        .label(label)
        .ratio(ratio);
    frame.render_widget(gauge, area);
}
