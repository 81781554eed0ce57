//! Text renderer and terminal-bell audio for running on a desktop

use super::{feed_status_text, Audio, Renderer, ScreenView};
use crate::config::AudioConfig;
use crate::models::{format_elapsed_minutes, HfBand, Screen, TimeOfDay};
use std::io::{self, Write};

/// Prints each screen as plain text
pub struct ConsoleRenderer<W: Write> {
    out: W,
}

impl<W: Write> ConsoleRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_screen(&mut self, view: &ScreenView<'_>) -> io::Result<()> {
        match view.screen {
            Screen::Spots => self.write_spots(view)?,
            Screen::SpotsAndPropagation => {
                self.write_spots(view)?;
                self.write_band_conditions(view)?;
            }
            Screen::Propagation => self.write_propagation(view)?,
            Screen::Clock => {
                let secs = view.utc_seconds_of_day;
                writeln!(self.out, "{:02}:{:02} UTC", secs / 3600, secs / 60 % 60)?;
            }
            Screen::Settings => writeln!(self.out, "== Settings ==")?,
            Screen::SleepGracePeriod => {
                writeln!(self.out, "Device will sleep soon.")?;
                if let Some(left) = view.grace_remaining {
                    writeln!(self.out, "{}s to sleep", left.as_secs())?;
                }
                writeln!(self.out, "[Cancel Sleep]")?;
            }
        }

        if let Some(version) = view.new_version {
            writeln!(self.out, "Update available: {}", version)?;
        }
        self.out.flush()
    }

    fn write_spots(&mut self, view: &ScreenView<'_>) -> io::Result<()> {
        writeln!(self.out, "== Spots ==")?;
        if let Some(status) = feed_status_text(view.feed_status) {
            writeln!(self.out, "{}", status)?;
            return Ok(());
        }
        for spot in view.spots.get_spots_by_recency() {
            writeln!(self.out, "{}", spot.to_display_string(view.utc_seconds_of_day))?;
        }
        Ok(())
    }

    fn write_propagation(&mut self, view: &ScreenView<'_>) -> io::Result<()> {
        writeln!(self.out, "== Propagation ==")?;
        if !view.propagation_available {
            writeln!(self.out, "Failed to fetch data.")?;
            return Ok(());
        }

        let p = view.propagation;
        writeln!(self.out, "A/K Index:  {} / {}", p.a_index, p.k_index)?;
        writeln!(self.out, "Solar Flux: {}", p.solar_flux)?;
        writeln!(self.out, "Sunspots:   {}", p.sunspots)?;
        writeln!(self.out, "X-Ray:      {}", p.xray)?;
        writeln!(self.out, "Geo Field:  {}", p.geomagnetic_field)?;
        writeln!(self.out, "SNL:        {}", p.signal_noise)?;
        self.write_band_conditions(view)?;
        writeln!(self.out, "Aurora:     {}", p.vhf.aurora)?;
        writeln!(
            self.out,
            "E-Skip EU:  2m {} / 4m {} / 6m {}",
            p.vhf.e_skip_europe_2m, p.vhf.e_skip_europe_4m, p.vhf.e_skip_europe_6m
        )
    }

    fn write_band_conditions(&mut self, view: &ScreenView<'_>) -> io::Result<()> {
        for (label, time) in [("D:", TimeOfDay::Day), ("N:", TimeOfDay::Night)] {
            write!(self.out, "{}", label)?;
            for band in HfBand::ALL {
                let condition = view.propagation.condition(band, time);
                write!(self.out, " {} {:<4}", band.label(), condition.as_str())?;
            }
            writeln!(self.out)?;
        }
        Ok(())
    }

    fn write_elapsed_column(&mut self, view: &ScreenView<'_>) -> io::Result<()> {
        let column: Vec<String> = view
            .spots
            .get_spots_by_recency()
            .map(|spot| format_elapsed_minutes(spot.elapsed_seconds(view.utc_seconds_of_day)))
            .collect();
        writeln!(self.out, "[{}]", column.join(" "))?;
        self.out.flush()
    }
}

impl<W: Write> Renderer for ConsoleRenderer<W> {
    fn redraw_active_screen(&mut self, view: &ScreenView<'_>) {
        if let Err(e) = self.write_screen(view) {
            tracing::warn!("Console redraw failed: {}", e);
        }
    }

    fn redraw_elapsed_column(&mut self, view: &ScreenView<'_>) {
        if !view.screen.shows_spots() || feed_status_text(view.feed_status).is_some() {
            return;
        }
        if let Err(e) = self.write_elapsed_column(view) {
            tracing::warn!("Console redraw failed: {}", e);
        }
    }
}

/// Rings the terminal bell for each new spot
pub struct BellAudio<W: Write> {
    out: W,
}

impl<W: Write> BellAudio<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Audio for BellAudio<W> {
    fn play_tone(&mut self, tone: &AudioConfig) {
        if tone.is_muted() {
            return;
        }
        tracing::trace!(
            "tone {} Hz for {} ms at step {}",
            tone.tone_frequency_hz,
            tone.tone_duration_ms,
            tone.volume_step
        );
        if let Err(e) = self.out.write_all(b"\x07").and_then(|_| self.out.flush()) {
            tracing::warn!("Bell failed: {}", e);
        }
    }
}
