use egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoints};

/// Static line plot of a waveform with a fixed vertical range.
pub struct WaveformPlot {
    points: Vec<[f32; 2]>,
    height: f32,
    color: Color32,
    y_range: f32,
}

impl WaveformPlot {
    pub fn new(points: Vec<[f32; 2]>) -> Self {
        Self {
            points,
            height: 100.0,
            color: Color32::from_rgb(0, 188, 212),
            y_range: 1.0,
        }
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    /// Keep the y axis at +-`range` so loudness is comparable between notes.
    pub fn y_range(mut self, range: f32) -> Self {
        self.y_range = range;
        self
    }

    pub fn show(self, ui: &mut Ui, id_source: impl std::hash::Hash) {
        let plot = Plot::new(id_source)
            .height(self.height)
            .include_y(-self.y_range as f64)
            .include_y(self.y_range as f64)
            .show_x(false)
            .show_y(false)
            .show_axes([false, true])
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false);

        plot.show(ui, |plot_ui| {
            let plot_points = PlotPoints::from_iter(
                self.points.iter().map(|[x, y]| [*x as f64, *y as f64]),
            );
            plot_ui.line(Line::new(plot_points).color(self.color));
        });
    }
}
