pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::query::SortKey;

#[derive(Parser)]
#[command(name = "pulsewire")]
#[command(about = "Browse AI news pulses, articles and categories", long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show categories with their latest articles and dashboard totals
    Home {
        /// Only show categories matching this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List pulses
    Pulses {
        /// Only show pulses matching this text
        #[arg(short, long)]
        search: Option<String>,

        /// Ordering: "recent" or "popular"
        #[arg(long)]
        sort: Option<SortKey>,
    },
    /// Show a single pulse
    Pulse {
        /// Slug of the pulse
        slug: String,
    },
    /// List recently scraped articles
    Articles {
        /// Zero-based page index
        #[arg(short, long, default_value_t = 0)]
        page: u64,

        /// Articles per page (default: from config)
        #[arg(long)]
        per_page: Option<u64>,

        /// Only show articles matching this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// List bookmarked pulses of the signed-in user
    Saved,
    /// Save or unsave pulses
    Toggle {
        /// Ids of the pulses
        #[arg(required = true)]
        pulse_ids: Vec<String>,
    },
}
