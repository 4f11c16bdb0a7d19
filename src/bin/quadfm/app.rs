//! Audio output and terminal session setup.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};

use quadfm::{EngineConfig, FmEngine};

use crate::ui::UiApp;

pub fn run() -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let (mut engine, handle) = FmEngine::new(EngineConfig::default().with_sample_rate(sample_rate))
        .wrap_err("failed to build the fm engine")?;

    // The engine moves into the callback; the handle stays on this thread.
    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| engine.render_interleaved(data, channels),
        |err| eprintln!("Audio error: {}", err),
        None,
    )?;
    stream.play()?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(handle, sample_rate).run(&mut terminal);
    ratatui::restore();
    result
}
