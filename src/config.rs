// src/config.rs

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::power::PowerParams;
use crate::process::check_battery_layout;
use crate::schema::ColumnLayout;

/// Run settings, read from YAML; every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub input: PathBuf,
    pub output_csv: Option<PathBuf>,
    pub output_parquet: Option<PathBuf>,
    pub audit_json: Option<PathBuf>,
    pub chart_dir: Option<PathBuf>,
    pub layout: ColumnLayout,
    pub preview_rows: usize,
    pub power: PowerParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from("responses.csv"),
            output_csv: None,
            output_parquet: None,
            audit_json: None,
            chart_dir: None,
            layout: ColumnLayout::default(),
            preview_rows: 10,
            power: PowerParams::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// YAML file (if any) overlaid with command-line values.
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply(args);
        check_battery_layout(&config.layout).context("unsupported column layout")?;
        Ok(config)
    }

    fn apply(&mut self, args: &Args) {
        if let Some(input) = &args.input {
            self.input = input.clone();
        }
        let overrides = [
            (&mut self.output_csv, &args.output_csv),
            (&mut self.output_parquet, &args.output_parquet),
            (&mut self.audit_json, &args.audit),
            (&mut self.chart_dir, &args.charts),
        ];
        for (slot, value) in overrides {
            if value.is_some() {
                slot.clone_from(value);
            }
        }
        if args.no_preview {
            self.preview_rows = 0;
        }
    }
}

/// Score a survey export and write the results.
#[derive(Debug, Clone, Default, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Survey export CSV (default: responses.csv)
    pub input: Option<PathBuf>,

    /// YAML config file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write the scored table as CSV
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Write the scored table as Parquet
    #[arg(long)]
    pub output_parquet: Option<PathBuf>,

    /// Write column and identifier mappings as JSON
    #[arg(long)]
    pub audit: Option<PathBuf>,

    /// Directory for chart datasets
    #[arg(long, value_name = "DIR")]
    pub charts: Option<PathBuf>,

    /// Skip the table preview
    #[arg(long)]
    pub no_preview: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::power::Alternative;

    #[test]
    fn empty_yaml_is_all_defaults() {
        assert_eq!(Config::from_yaml("{}").unwrap(), Config::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml(
            "input: data/export.csv\n\
             chart_dir: out/charts\n\
             layout:\n  general_questions: 20\n\
             power:\n  effect_size: 0.5\n  alternative: larger\n",
        )
        .unwrap();
        assert_eq!(config.input, PathBuf::from("data/export.csv"));
        assert_eq!(config.chart_dir, Some(PathBuf::from("out/charts")));
        assert_eq!(config.layout.general_questions, 20);
        assert_eq!(config.layout.business_questions, 5);
        assert_eq!(config.power.effect_size, 0.5);
        assert_eq!(config.power.alternative, Alternative::Larger);
        assert_eq!(config.power.alpha, 0.05);
        assert_eq!(config.preview_rows, 10);
    }

    #[test]
    fn battery_sizes_other_than_five_are_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("wide.yaml");
        fs::write(&path, "layout:\n  business_questions: 6\n")?;

        let args = Args {
            config: Some(path),
            ..Args::default()
        };
        let err = Config::resolve(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("BQ questions"));
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Config::from_yaml("inptu: x.csv\n").is_err());
    }

    #[test]
    fn command_line_overrides_yaml() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("run.yaml");
        fs::write(
            &path,
            "input: from_yaml.csv\noutput_csv: yaml.csv\naudit_json: audit.json\n",
        )?;

        let args = Args::try_parse_from([
            "surveyscore",
            "from_cli.csv",
            "--config",
            path.to_str().unwrap(),
            "--output-csv",
            "cli.csv",
            "--no-preview",
        ])?;
        let config = Config::resolve(&args)?;
        assert_eq!(config.input, PathBuf::from("from_cli.csv"));
        assert_eq!(config.output_csv, Some(PathBuf::from("cli.csv")));
        assert_eq!(config.audit_json, Some(PathBuf::from("audit.json")));
        assert_eq!(config.output_parquet, None);
        assert_eq!(config.preview_rows, 0);
        Ok(())
    }
}
