//! Display surface for the plant.
//!
//! The surface only ever receives an [`AssetId`]; the terminal rendition
//! prints the resource name with `console` colours and keeps an `indicatif`
//! spinner running between wakes.

use std::time::Duration;

use chrono::{DateTime, Utc};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::state_machine::{AssetId, DecayState};

pub trait DisplaySurface {
    /// Put `asset` on screen. `state` is passed along for captions only.
    fn show(&mut self, asset: AssetId, state: DecayState);

    /// Called while the host sleeps until the next wake.
    fn waiting(&mut self, _until: DateTime<Utc>) {}

    /// Called once when the host loop exits.
    fn close(&mut self) {}
}

/// Prints to the terminal.
pub struct TerminalDisplay {
    // Spinner shown between wakes; replaced on every wait.
    spinner: Option<ProgressBar>,
    // Green for the healthy image.
    green: Style,
    // Red for the terminal image.
    red: Style,
    // Dim caption style.
    dim: Style,
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self {
            spinner: None,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            dim: Style::new().dim(),
        }
    }

    fn clear_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl DisplaySurface for TerminalDisplay {
    fn show(&mut self, asset: AssetId, state: DecayState) {
        self.clear_spinner();
        let (glyph, style) = match asset {
            AssetId::Healthy => ("🌿", &self.green),
            AssetId::Terminal => ("🍰", &self.red),
        };
        println!(
            "  {glyph} {} {}",
            style.apply_to(asset.resource_name()),
            self.dim.apply_to(format!("({state})"))
        );
    }

    fn waiting(&mut self, until: DateTime<Utc>) {
        self.clear_spinner();
        let pb = ProgressBar::new_spinner();
        let template = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        pb.set_style(template);
        pb.set_message(format!("next wake at {}", until.format("%H:%M:%S")));
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    fn close(&mut self) {
        self.clear_spinner();
    }
}

/// Draws nothing. Used by `run --quiet`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDisplay;

impl DisplaySurface for NullDisplay {
    fn show(&mut self, _asset: AssetId, _state: DecayState) {}
}

/// Keeps everything it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub shown: Vec<(AssetId, DecayState)>,
}

impl DisplaySurface for RecordingDisplay {
    fn show(&mut self, asset: AssetId, state: DecayState) {
        self.shown.push((asset, state));
    }
}
