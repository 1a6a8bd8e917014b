use clap::{Args, Parser, Subcommand};
use filter_session::{FilterKind, Slot};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "instafilter", version, about = "Pick a photo, filter it, share it")]
pub struct Cli {
    /// Config file to use instead of the platform location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
pub enum Command {
    /// Interactive session (default)
    #[default]
    Session,

    /// Filter one picture and write the result
    Apply(ApplyArgs),

    /// List the filters and the parameters they take
    Filters,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Picture to filter
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the PNG result
    #[arg(short, long)]
    pub output: PathBuf,

    /// Filter name or picker index
    #[arg(short, long, default_value = "sepia-tone")]
    pub filter: FilterKind,

    #[arg(long)]
    pub intensity: Option<f32>,

    #[arg(long)]
    pub radius: Option<f32>,

    #[arg(long)]
    pub scale: Option<f32>,
}

impl ApplyArgs {
    pub fn parameters(&self) -> Vec<(Slot, f32)> {
        [
            (Slot::Intensity, self.intensity),
            (Slot::Radius, self.radius),
            (Slot::Scale, self.scale),
        ]
        .into_iter()
        .filter_map(|(slot, value)| value.map(|v| (slot, v)))
        .collect()
    }
}

pub fn filter_table() -> String {
    FilterKind::all_filters()
        .iter()
        .map(|kind| {
            let slots = kind
                .slots()
                .iter()
                .map(|slot| {
                    let (min, max) = slot.range();
                    format!("{slot} [{min}, {max}]")
                })
                .collect::<Vec<_>>();

            let slots = if slots.is_empty() {
                "-".to_string()
            } else {
                slots.join(", ")
            };

            format!("{:>2}  {:<16} {}", u8::from(*kind), kind.name(), slots)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn print_filters() {
    println!("{}", filter_table());
}
