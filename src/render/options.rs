//! Renderer options
//!
//! Everything the renderer accepts on its command line, as a plain struct
//! that both the config file and the CLI flags feed into.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use std::path::Path;

/// Which chart the renderer should export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    #[default]
    Gantt,
    GanttWithResources,
    Resources,
    ResourcesWithTasks,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Gantt => "gantt",
            ChartKind::GanttWithResources => "gantt-with-resources",
            ChartKind::Resources => "resources",
            ChartKind::ResourcesWithTasks => "resources-with-tasks",
        }
    }
}

/// Time scale of the rendered chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TimeScale {
    Day,
    Week,
    Month,
    Year,
}

impl TimeScale {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeScale::Day => "day",
            TimeScale::Week => "week",
            TimeScale::Month => "month",
            TimeScale::Year => "year",
        }
    }
}

/// Options handed to the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Chart kind to export
    pub chart: ChartKind,

    /// Draw identifiers next to task names
    pub show_ids: bool,

    /// Include tasks closed before the chart range
    pub show_closed_tasks: bool,

    /// Suppress the task rows entirely
    pub hide_tasks: bool,

    /// Draw end dates next to bars
    pub show_ends: bool,

    /// Draw planned efforts
    pub show_efforts: bool,

    /// Draw efforts spent so far
    pub show_efforts_spent: bool,

    /// Draw efforts still left
    pub show_efforts_left: bool,

    /// Draw completion percentages
    pub show_done: bool,

    /// Ignore all update records
    pub no_updates: bool,

    /// Apply every update record regardless of date
    pub all_updates: bool,

    /// Only render tasks below this identifier prefix
    pub prefix: Option<String>,

    /// Override the renderer's notion of today (a date string)
    pub today: Option<String>,

    /// Time scale of the chart
    pub scale: Option<TimeScale>,

    /// First date to render
    pub start: Option<String>,

    /// Last date to render
    pub end: Option<String>,

    /// Only render tasks carrying one of these tags (comma-separated)
    pub tags: Option<String>,

    /// Free-form extra renderer arguments
    pub extra_args: Option<String>,
}

impl RenderOptions {
    /// Builds the renderer's argument list for a root plan file. The
    /// export instruction and the file path always come last.
    pub fn to_args(&self, root: &Path) -> Vec<String> {
        let mut args = Vec::new();

        if self.show_ids {
            args.push("-show-ids".into());
        }
        if self.show_closed_tasks {
            args.push("-show-closed-tasks".into());
        }
        if self.hide_tasks {
            args.push("-no-tasks".into());
        }
        if self.show_ends {
            args.push("-show-ends".into());
        }
        if self.show_efforts {
            args.push("-show-efforts".into());
        }
        if self.show_efforts_spent {
            args.push("-show-efforts-spent".into());
        }
        if self.show_efforts_left {
            args.push("-show-efforts-left".into());
        }
        if self.show_done {
            args.push("-show-done".into());
        }
        if self.no_updates {
            args.push("-no-updates".into());
        }
        if self.all_updates {
            args.push("-all-updates".into());
        }

        for (flag, value) in [
            ("-prefix", &self.prefix),
            ("-today", &self.today),
            ("-start", &self.start),
            ("-end", &self.end),
            ("-tags", &self.tags),
        ] {
            if let Some(value) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
                args.push(flag.into());
                args.push(value.into());
            }
        }
        if let Some(scale) = self.scale {
            args.push("-scale".into());
            args.push(scale.as_str().into());
        }
        if let Some(extra) = self.extra_args.as_deref() {
            args.extend(extra.split_whitespace().map(String::from));
        }

        args.push("-export-charts".into());
        args.push(self.chart.as_str().into());
        args.push(root.display().to_string());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_only_export() {
        let args = RenderOptions::default().to_args(Path::new("plan.yaml"));
        assert_eq!(args, vec!["-export-charts", "gantt", "plan.yaml"]);
    }

    #[test]
    fn flags_and_values_are_mapped() {
        let options = RenderOptions {
            chart: ChartKind::GanttWithResources,
            show_ids: true,
            hide_tasks: true,
            prefix: Some("phase1".into()),
            scale: Some(TimeScale::Week),
            ..Default::default()
        };
        let args = options.to_args(Path::new("plan.yaml"));
        assert_eq!(
            args,
            vec![
                "-show-ids",
                "-no-tasks",
                "-prefix",
                "phase1",
                "-scale",
                "week",
                "-export-charts",
                "gantt-with-resources",
                "plan.yaml",
            ]
        );
    }

    #[test]
    fn blank_values_are_not_forwarded() {
        let options = RenderOptions {
            prefix: Some("   ".into()),
            ..Default::default()
        };
        let args = options.to_args(Path::new("plan.yaml"));
        assert!(!args.iter().any(|a| a == "-prefix"));
    }

    #[test]
    fn extra_args_are_split_on_whitespace() {
        let options = RenderOptions {
            extra_args: Some("-foo bar  -baz".into()),
            ..Default::default()
        };
        let args = options.to_args(Path::new("plan.yaml"));
        let tail: Vec<_> = args.iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec!["-foo", "bar", "-baz", "-export-charts", "gantt", "plan.yaml"]
        );
    }

    #[test]
    fn chart_kind_roundtrips_through_config() {
        let kind: ChartKind = serde_yaml::from_str("gantt-with-resources").unwrap();
        assert_eq!(kind, ChartKind::GanttWithResources);
        assert_eq!(kind.as_str(), "gantt-with-resources");
    }
}
