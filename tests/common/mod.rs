//! Shared fixtures for integration tests

#![allow(dead_code)]

use agrisense::models::Reading;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

const TEMPERATURES: [f64; 8] = [5.0, 12.0, 16.0, 20.0, 24.0, 28.0, 33.0, 40.0];
const HUMIDITIES: [f64; 4] = [15.0, 35.0, 45.0, 65.0];
const PH_VALUES: [f64; 3] = [5.2, 6.2, 7.8];

/// Deterministic grid of readings spanning every tier
pub fn reading_grid() -> Vec<Reading> {
    let mut readings = Vec::new();
    for &t in &TEMPERATURES {
        for &h in &HUMIDITIES {
            for &ph in &PH_VALUES {
                readings.push(Reading::new(t, h, 2.0, ph));
            }
        }
    }
    readings
}

/// Write a history CSV with one row per reading on consecutive days from
/// 2024-01-01. Labels are written when given.
pub fn write_history_csv(dir: &Path, readings: &[Reading], labels: Option<&[String]>) -> PathBuf {
    let path = dir.join("history.csv");
    let mut out = String::from("Date,Temperature (°C),Humidity (%),Nutrients (g/L),pH");
    if labels.is_some() {
        out.push_str(",Recommendations");
    }
    out.push('\n');

    let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    for (i, r) in readings.iter().enumerate() {
        let day = start + chrono::Duration::days(i as i64);
        write!(
            out,
            "{},{},{},{},{}",
            day.format("%Y-%m-%d"),
            r.temperature,
            r.humidity,
            r.nutrients,
            r.ph
        )
        .unwrap();
        if let Some(labels) = labels {
            write!(out, ",\"{}\"", labels[i]).unwrap();
        }
        out.push('\n');
    }

    std::fs::write(&path, out).unwrap();
    path
}

/// Parse Prometheus exposition format into metric name -> lines
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            if let Some(name) = line.split_whitespace().nth(2) {
                current_metric = name.to_string();
                metrics
                    .entry(current_metric.clone())
                    .or_insert_with(Vec::new)
                    .push(line.to_string());
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
