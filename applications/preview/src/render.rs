//! Text rendering of the player
//!
//! Spectrum bins are averaged down to a fixed number of bars drawn with the
//! eighth-block characters.

use beats_playback::PlaybackSnapshot;

const LEVELS: [char; 9] = [' ', '▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Average `bins` into `bars` groups
///
/// Every bin lands in exactly one group; groups differ in size by at most one
/// bin when the counts don't divide evenly.
pub fn downsample(bins: &[f32], bars: usize) -> Vec<f32> {
    if bins.is_empty() || bars == 0 {
        return vec![0.0; bars];
    }

    (0..bars)
        .map(|bar| {
            let start = bar * bins.len() / bars;
            let end = ((bar + 1) * bins.len() / bars).max(start + 1).min(bins.len());
            let group = &bins[start.min(end - 1)..end];
            group.iter().sum::<f32>() / group.len() as f32
        })
        .collect()
}

/// One row of bars for magnitudes in 0.0-1.0
pub fn bar_line(bins: &[f32], bars: usize) -> String {
    downsample(bins, bars)
        .into_iter()
        .map(|level| {
            let index = (level.clamp(0.0, 1.0) * (LEVELS.len() - 1) as f32).round() as usize;
            LEVELS[index]
        })
        .collect()
}

/// `▶ 0:12 / 0:30  vol 90%  loop` style status line
pub fn status_line(snapshot: &PlaybackSnapshot) -> String {
    let icon = if snapshot.is_playing { '▶' } else { '⏸' };
    let volume = if snapshot.muted {
        "muted".to_string()
    } else {
        format!("vol {:.0}%", snapshot.volume * 100.0)
    };

    let mut line = format!(
        "{icon} {} / {}  {volume}",
        snapshot.elapsed_label(),
        snapshot.duration_label()
    );
    if snapshot.loop_enabled {
        line.push_str("  loop");
    }
    if let Some(fault) = &snapshot.fault {
        line.push_str("  ");
        line.push_str(&fault.to_string());
    }
    line
}
