//! Patch summary line, per-voice activity lights and modulation meters

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use quadfm::{
    dsp::filter::FilterMode,
    monitor::Monitor,
    params::{ParamRange, ParamSnapshot},
};

const METER_WIDTH: usize = 8;
const BIPOLAR: ParamRange = ParamRange::new(-1.0, 1.0);

/// Block bar for a 0..1 fill.
fn meter(fill: f32) -> String {
    let lit = (fill * METER_WIDTH as f32).round() as usize;
    let lit = lit.min(METER_WIDTH);
    format!("{}{}", "█".repeat(lit), "░".repeat(METER_WIDTH - lit))
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    params: &ParamSnapshot,
    preset: Option<&str>,
    octave: i8,
    error: Option<&str>,
) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let filter = match params.filter_mode {
        FilterMode::Off => FilterMode::Off.name().to_string(),
        mode => format!("{} {:.0} Hz", mode.name(), params.cutoff),
    };

    let patch = Line::from(vec![
        Span::styled(" Preset ", label),
        Span::styled(preset.unwrap_or("-"), value),
        Span::styled("  Algo ", label),
        Span::styled(params.algorithm.name(), value),
        Span::styled("  Filter ", label),
        Span::styled(filter, value),
        Span::styled("  Octave ", label),
        Span::styled(octave.to_string(), value),
    ]);

    let operators = Line::from(vec![
        Span::styled(" Ratio ", label),
        Span::raw(format!(
            "{:.2} {:.2} {:.2} {:.2}",
            params.ratio[0], params.ratio[1], params.ratio[2], params.ratio[3]
        )),
        Span::styled("  Index ", label),
        Span::raw(format!(
            "{:.2} {:.2} {:.2} {:.2}",
            params.index[0], params.index[1], params.index[2], params.index[3]
        )),
        match error {
            Some(err) => Span::styled(format!("  {err}"), Style::default().fg(Color::Red)),
            None => Span::raw(""),
        },
    ]);

    let block = Block::default().title(" quadfm ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(vec![patch, operators]).block(block), area);
}

pub fn render_voices(frame: &mut Frame, area: Rect, monitor: &Monitor) {
    let mut spans: Vec<Span> = monitor
        .voices()
        .map(|status| {
            let text = match status.note {
                Some(note) => format!(" ● {note:>3} "),
                None if status.active => " ◐  -- ".to_string(),
                None => " ○  -- ".to_string(),
            };
            let color = if status.active { Color::Green } else { Color::DarkGray };
            Span::styled(text, Style::default().fg(color))
        })
        .collect();

    let label = Style::default().fg(Color::DarkGray);
    let bar = Style::default().fg(Color::Magenta);
    let modulation = monitor.modulation();
    for (i, value) in modulation.lfo.iter().enumerate() {
        spans.push(Span::styled(format!(" LFO{} ", i + 1), label));
        spans.push(Span::styled(meter(BIPOLAR.normalize(*value)), bar));
    }
    spans.push(Span::styled(" Env ", label));
    spans.push(Span::styled(
        meter(ParamRange::MOD_AMOUNT.normalize(modulation.mod_env)),
        bar,
    ));

    let block = Block::default().title(" Voices ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
