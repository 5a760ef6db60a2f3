//! Conversion of store snapshots into plottable series.

use std::time::SystemTime;

use super::sample::{LatencySample, ResourceSample};

/// Resource metric selectable for charting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Cpu,
    Memory,
    NetRx,
    NetTx,
}

impl Metric {
    pub fn title(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU Usage",
            Metric::Memory => "Memory Usage",
            Metric::NetRx => "Network RX",
            Metric::NetTx => "Network TX",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU %",
            Metric::Memory => "Memory %",
            Metric::NetRx | Metric::NetTx => "KB",
        }
    }

    /// Plotted value; network counters are shown in kilobytes.
    fn value(&self, sample: &ResourceSample) -> f64 {
        match self {
            Metric::Cpu => sample.cpu_pct,
            Metric::Memory => sample.mem_pct,
            Metric::NetRx => sample.net_rx_bytes / 1024.0,
            Metric::NetTx => sample.net_tx_bytes / 1024.0,
        }
    }
}

/// Points ready for a line chart: x is seconds since the first sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    pub points: Vec<(f64, f64)>,
    pub x_max: f64,
    pub y_max: f64,
}

impl ChartSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    fn build(times: &[SystemTime], values: Vec<f64>, y_floor: f64) -> Self {
        let Some(first) = times.first().copied() else {
            return Self::default();
        };

        let points: Vec<(f64, f64)> = times
            .iter()
            .zip(values)
            .map(|(at, v)| {
                let x = at.duration_since(first).unwrap_or_default().as_secs_f64();
                (x, v)
            })
            .collect();

        let x_max = points.iter().map(|(x, _)| *x).fold(0.0, f64::max).max(1.0);
        let peak = points.iter().map(|(_, y)| *y).fold(0.0, f64::max);
        let y_max = y_floor.max(peak * 1.1).max(1.0);

        Self { points, x_max, y_max }
    }

    /// Latency in milliseconds over arrival time.
    pub fn latency(samples: &[LatencySample]) -> Self {
        let times: Vec<SystemTime> = samples.iter().map(|s| s.observed_at).collect();
        let values = samples.iter().map(|s| s.latency_ms).collect();
        Self::build(&times, values, 0.0)
    }

    /// One resource metric over poll time. The y axis spans at least 0-100.
    pub fn resource(samples: &[ResourceSample], metric: Metric) -> Self {
        let times: Vec<SystemTime> = samples.iter().map(|s| s.observed_at).collect();
        let values = samples.iter().map(|s| metric.value(s)).collect();
        Self::build(&times, values, 100.0)
    }
}
