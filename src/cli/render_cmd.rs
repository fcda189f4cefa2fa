//! `plannav render`: run the chart renderer once

use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::Config;
use crate::render::{ChartKind, RenderOptions, Renderer, TimeScale};

use super::output::Output;

/// Render options exposed as CLI flags, layered over the configured
/// defaults: switches turn features on, value flags replace the
/// configured value.
#[derive(Debug, Clone, Default, Args)]
pub struct RenderArgs {
    /// Chart kind to export
    #[arg(long, value_enum)]
    pub chart: Option<ChartKind>,

    /// Draw identifiers next to task names
    #[arg(long)]
    pub show_ids: bool,

    /// Include tasks closed before the chart range
    #[arg(long)]
    pub show_closed_tasks: bool,

    /// Suppress the task rows entirely
    #[arg(long)]
    pub hide_tasks: bool,

    /// Draw end dates next to bars
    #[arg(long)]
    pub show_ends: bool,

    /// Draw planned efforts
    #[arg(long)]
    pub show_efforts: bool,

    /// Draw efforts spent so far
    #[arg(long)]
    pub show_efforts_spent: bool,

    /// Draw efforts still left
    #[arg(long)]
    pub show_efforts_left: bool,

    /// Draw completion percentages
    #[arg(long)]
    pub show_done: bool,

    /// Ignore all update records
    #[arg(long)]
    pub no_updates: bool,

    /// Apply every update record regardless of date
    #[arg(long)]
    pub all_updates: bool,

    /// Only render tasks below this identifier prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Override the renderer's notion of today
    #[arg(long)]
    pub today: Option<String>,

    /// Time scale of the chart
    #[arg(long, value_enum)]
    pub scale: Option<TimeScale>,

    /// First date to render
    #[arg(long)]
    pub start: Option<String>,

    /// Last date to render
    #[arg(long)]
    pub end: Option<String>,

    /// Only render tasks carrying one of these tags (comma-separated)
    #[arg(long)]
    pub tags: Option<String>,

    /// Extra renderer arguments, whitespace-separated
    #[arg(long)]
    pub extra_args: Option<String>,
}

impl RenderArgs {
    /// Applies the flags on top of configured defaults.
    pub fn apply(&self, mut base: RenderOptions) -> RenderOptions {
        if let Some(chart) = self.chart {
            base.chart = chart;
        }
        base.show_ids |= self.show_ids;
        base.show_closed_tasks |= self.show_closed_tasks;
        base.hide_tasks |= self.hide_tasks;
        base.show_ends |= self.show_ends;
        base.show_efforts |= self.show_efforts;
        base.show_efforts_spent |= self.show_efforts_spent;
        base.show_efforts_left |= self.show_efforts_left;
        base.show_done |= self.show_done;
        base.no_updates |= self.no_updates;
        base.all_updates |= self.all_updates;

        if self.prefix.is_some() {
            base.prefix = self.prefix.clone();
        }
        if self.today.is_some() {
            base.today = self.today.clone();
        }
        if self.scale.is_some() {
            base.scale = self.scale;
        }
        if self.start.is_some() {
            base.start = self.start.clone();
        }
        if self.end.is_some() {
            base.end = self.end.clone();
        }
        if self.tags.is_some() {
            base.tags = self.tags.clone();
        }
        if self.extra_args.is_some() {
            base.extra_args = self.extra_args.clone();
        }
        base
    }
}

pub fn run(output: &Output, file: &Path, args: &RenderArgs) -> Result<()> {
    let config = Config::for_plan(file)?;
    let options = args.apply(config.preview.clone());
    let renderer = Renderer::new(config.renderer_binary());

    output.verbose_ctx(
        "render",
        &format!("Invoking {} for {}", renderer.binary().display(), file.display()),
    );
    let outcome = renderer.render(file, &options)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "image": outcome.image,
            "click_map": outcome.click_map,
        }));
        return Ok(());
    }

    if !outcome.output.trim().is_empty() {
        output.line(outcome.output.trim_end());
    }
    output.success(&format!("Rendered {}", outcome.image.display()));
    Ok(())
}
