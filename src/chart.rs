//! Terminal bar charts for good-scan percentages.
//!
//! Bars run horizontally on a fixed 0-100% scale. Bars below the threshold
//! are red, the rest green. The threshold is a dashed marker column drawn
//! across every bar, over the filled part too.

use crate::models::{DailyBucket, MonthlyBucket, ThresholdStatus};
use colored::Colorize;
use std::fmt::Write;

const BAR: char = '█';
const MARKER: char = '┆';

/// One labelled bar
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub percentage: f64,
}

impl From<&MonthlyBucket> for Bar {
    fn from(bucket: &MonthlyBucket) -> Self {
        Self {
            label: bucket.label(),
            percentage: bucket.good_scan_percentage,
        }
    }
}

impl From<&DailyBucket> for Bar {
    fn from(bucket: &DailyBucket) -> Self {
        Self {
            label: bucket.label(),
            percentage: bucket.good_scan_percentage,
        }
    }
}

/// Horizontal bar chart with a threshold marker
#[derive(Debug, Clone)]
pub struct BarChart {
    title: String,
    bars: Vec<Bar>,
    threshold_percent: u32,
    width: usize,
    colored: bool,
}

impl BarChart {
    pub fn new(title: impl Into<String>, bars: Vec<Bar>, threshold_percent: u32) -> Self {
        Self {
            title: title.into(),
            bars,
            threshold_percent,
            width: crate::constants::CHART_WIDTH,
            colored: true,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(1);
        self
    }

    /// Disable ANSI colors, e.g. when stdout is not a terminal
    pub fn without_color(mut self) -> Self {
        self.colored = false;
        self
    }

    fn columns_for(&self, percentage: f64) -> usize {
        let scaled = (percentage.clamp(0.0, 100.0) / 100.0 * self.width as f64).round();
        scaled as usize
    }

    /// Render the chart into a string, one line per bar
    pub fn render(&self) -> String {
        let mut out = String::new();
        let label_width = self
            .bars
            .iter()
            .map(|b| b.label.chars().count())
            .max()
            .unwrap_or(0)
            .max(5);
        let marker = self.columns_for(f64::from(self.threshold_percent)).min(self.width - 1);

        let title = if self.colored {
            self.title.bold().to_string()
        } else {
            self.title.clone()
        };
        let _ = writeln!(out, "{}", title);

        for bar in &self.bars {
            let filled = self.columns_for(bar.percentage);
            let status = ThresholdStatus::classify(bar.percentage, self.threshold_percent);

            let body: String = (0..filled)
                .map(|i| if i == marker { MARKER } else { BAR })
                .collect();
            let rest: String = (filled..self.width)
                .map(|i| if i == marker { MARKER } else { ' ' })
                .collect();

            let (body, rest) = if self.colored {
                let body = match status {
                    ThresholdStatus::Pass => body.green().to_string(),
                    ThresholdStatus::Fail => body.red().to_string(),
                };
                (body, rest.bright_black().to_string())
            } else {
                (body, rest)
            };

            let _ = writeln!(
                out,
                "{:>label_width$} |{}{}| {:>6.2}%",
                bar.label,
                body,
                rest,
                bar.percentage,
                label_width = label_width
            );
        }

        let axis = format!(
            "{:>label_width$}  0%{:>width$}",
            "",
            "100%",
            label_width = label_width,
            width = self.width.saturating_sub(1)
        );
        let _ = writeln!(out, "{}", axis);
        let legend = format!("{} threshold {}%", MARKER, self.threshold_percent);
        let _ = writeln!(out, "{:>label_width$}  {}", "", legend, label_width = label_width);

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bars() -> Vec<Bar> {
        vec![
            Bar {
                label: "2021-3".to_string(),
                percentage: 10.0,
            },
            Bar {
                label: "2021-4".to_string(),
                percentage: 100.0,
            },
        ]
    }

    #[test]
    fn test_render_plain() {
        let chart = BarChart::new("Monthly", bars(), 50)
            .with_width(10)
            .without_color();
        let rendered = chart.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Monthly");
        assert_eq!(lines[1], "2021-3 |█    ┆    |  10.00%");
        assert_eq!(lines[2], "2021-4 |█████┆████| 100.00%");
        assert!(lines[4].contains("threshold 50%"));
    }

    #[test]
    fn test_marker_visible_on_every_bar() {
        let bars = vec![
            Bar {
                label: "low".to_string(),
                percentage: 0.0,
            },
            Bar {
                label: "at".to_string(),
                percentage: 21.0,
            },
            Bar {
                label: "high".to_string(),
                percentage: 80.0,
            },
        ];
        let rendered = BarChart::new("Monthly", bars, 21)
            .with_width(20)
            .without_color()
            .render();

        let columns: Vec<Option<usize>> = rendered
            .lines()
            .skip(1)
            .take(3)
            .map(|line| line.chars().position(|c| c == MARKER))
            .collect();
        assert_eq!(columns, vec![Some(11); 3]);
    }

    #[test]
    fn test_bar_from_bucket() {
        let bucket = MonthlyBucket {
            year: 2021,
            month: 11,
            good_scan_percentage: 33.3,
            records: 3,
            good_scans: 1,
        };
        let bar = Bar::from(&bucket);
        assert_eq!(bar.label, "2021-11");
        assert_eq!(bar.percentage, 33.3);
    }

    #[test]
    fn test_empty_chart_renders_axis() {
        let rendered = BarChart::new("Daily", Vec::new(), 21).without_color().render();
        assert_eq!(rendered.lines().count(), 3);
    }
}
