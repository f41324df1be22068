use clap::{Parser, Subcommand};

/// mdpress — publishing gateway for WeChat Official Account articles
#[derive(Parser)]
#[command(name = "mdpress", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway server
    Serve {
        /// Port to bind (defaults to MDPRESS_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List drafts stored on the Official Account
    Drafts {
        #[arg(long, default_value = "0")]
        offset: u32,
        #[arg(long, default_value = "20")]
        count: u32,
    },

    /// Query the status of a submitted publish job
    Status { publish_id: String },
}
