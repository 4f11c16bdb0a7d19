//! Terminal front end: keyboard in, scope, spectrum and voice lights out.

mod spectrum;
mod status;
mod waveform;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};

use quadfm::{patch::FACTORY_NAMES, SynthHandle};

use crate::keyboard::{KeyAction, Keyboard};
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, render_voices};
use waveform::render_waveform;

pub struct UiApp {
    handle: SynthHandle,
    keyboard: Keyboard,
    scope: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    preset: Option<&'static str>,
    /// Last control-side error, shown until the next successful action.
    error: Option<String>,
    should_quit: bool,
}

impl UiApp {
    pub fn new(handle: SynthHandle, sample_rate: f32) -> Self {
        let scope_len = handle.monitor().scope().capacity();
        Self {
            handle,
            keyboard: Keyboard::new(),
            scope: vec![0.0; scope_len],
            spectrum: SpectrumAnalyzer::new(scope_len, sample_rate),
            preset: None,
            error: None,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.handle.monitor().scope().copy_into(&mut self.scope);
            self.spectrum.update(&self.scope);

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }

            for note in self.keyboard.expire(Instant::now()) {
                let result = self.handle.note_off(note);
                self.track(result);
            }
        }

        let result = self.handle.all_notes_off();
        self.track(result);
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        let params = self.handle.params();
        match key {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('z') => self.keyboard.shift_octave(-1),
            KeyCode::Char('x') => self.keyboard.shift_octave(1),
            KeyCode::Tab => {
                params.algorithm.cycle();
            }
            KeyCode::Char('c') => {
                params.filter_mode.cycle();
            }
            KeyCode::Left => {
                params.cutoff.nudge(-100.0);
            }
            KeyCode::Right => {
                params.cutoff.nudge(100.0);
            }
            KeyCode::Up => {
                params.index[1].nudge(0.1);
            }
            KeyCode::Down => {
                params.index[1].nudge(-0.1);
            }
            KeyCode::Char(' ') => {
                self.keyboard.clear();
                let result = self.handle.all_notes_off();
                self.track(result);
            }
            KeyCode::Char(digit @ '1'..='8') => {
                let name = FACTORY_NAMES[digit as usize - '1' as usize];
                let result = self.handle.load_preset(name).map(|_| ());
                if result.is_ok() {
                    self.preset = Some(name);
                }
                self.track(result);
            }
            KeyCode::Char(key) => {
                if let Some(note) = self.keyboard.note_for(key) {
                    if let KeyAction::Press(note) = self.keyboard.press(note, Instant::now()) {
                        let result = self.handle.note_on(note);
                        self.track(result);
                    }
                }
            }
            _ => {}
        }
    }

    fn track(&mut self, result: quadfm::error::Result<()>) {
        self.error = result.err().map(|err| err.to_string());
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Status
                Constraint::Length(3), // Voices
                Constraint::Min(8),    // Waveform
                Constraint::Length(10), // Spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(frame.area());

        render_status(
            frame,
            chunks[0],
            &self.handle.params().snapshot(),
            self.preset,
            self.keyboard.octave(),
            self.error.as_deref(),
        );
        render_voices(frame, chunks[1], self.handle.monitor());
        render_waveform(frame, chunks[2], &self.scope);
        render_spectrum(frame, chunks[3], self.spectrum.data());

        let help = Paragraph::new(
            " [A-;] Play  [Z/X] Octave  [1-8] Preset  [Tab] Algo  [C] Filter  [←/→] Cutoff  [↑/↓] Idx2  [Space] Panic  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}
